// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use mg_core::{OwnerRef, TaskId};

fn promote(id: &str) -> Operation {
    Operation::TaskPromote {
        id: TaskId::from(id),
        at: Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap(),
    }
}

#[test]
fn wal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&promote("task-1")).unwrap();
        wal.append(&Operation::OwnerCancel {
            owner: OwnerRef::order("o-1"),
            at: Utc.with_ymd_and_hms(2026, 10, 12, 10, 0, 0).unwrap(),
        })
        .unwrap();
    }

    let ops = Wal::replay(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], promote("task-1"));
    assert!(matches!(ops[1], Operation::OwnerCancel { .. }));
}

#[test]
fn wal_sequence_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 0);
        assert_eq!(wal.append(&promote("a")).unwrap(), 1);
    }

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.sequence(), 1);
    assert_eq!(wal.append(&promote("b")).unwrap(), 2);
}

#[test]
fn missing_file_replays_empty() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Wal::replay(&dir.path().join("nope.wal")).unwrap().is_empty());
}

#[test]
fn truncated_tail_is_dropped_and_cut_on_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&promote("a")).unwrap();
    }
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, r#"{{"seq":2,"op":{{"op":"task_pro"#).unwrap();
    drop(file);

    assert_eq!(Wal::replay(&path).unwrap().len(), 1);

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.sequence(), 1);
    wal.append(&promote("b")).unwrap();
    drop(wal);

    assert_eq!(Wal::replay(&path).unwrap(), vec![promote("a"), promote("b")]);
}

#[test]
fn corruption_mid_log_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.wal");
    std::fs::write(&path, "not json\n").unwrap();
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(
            file,
            "{}",
            serde_json::to_string(&WalEntry {
                seq: 2,
                op: promote("a")
            })
            .unwrap()
        )
        .unwrap();
    }

    assert!(matches!(
        Wal::replay(&path),
        Err(WalError::Corrupt { line: 1, .. })
    ));
}
