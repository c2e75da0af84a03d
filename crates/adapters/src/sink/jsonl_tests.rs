// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mg_core::OwnerRef;

#[tokio::test]
async fn appends_one_json_object_per_event() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let sink = JsonlEventSink::open(&path).unwrap();

    for id in ["o-1", "o-2"] {
        sink.emit(&Event::OwnerCancelled {
            owner: OwnerRef::order(id),
            released: vec![],
        })
        .await
        .unwrap();
    }

    let content = std::fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["type"], "owner_cancelled");
    assert_eq!(lines[1]["owner"]["id"], "o-2");
}
