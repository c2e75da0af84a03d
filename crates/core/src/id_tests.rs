// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn uuid_task_ids_are_unique_and_compact() {
    let ids = UuidIdGen;
    let a = ids.next_task_id();
    let b = ids.next_task_id();
    assert_ne!(a, b);
    assert_eq!(a.0.len(), 32);
}

#[test]
fn sequential_ids_share_one_counter_across_clones() {
    let ids = SequentialIdGen::default();
    let copy = ids.clone();
    assert_eq!(ids.next_task_id(), TaskId::from("task-1"));
    assert_eq!(copy.next(), "task-2");
}
