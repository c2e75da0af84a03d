// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Monday, 09:00 UTC
pub const NOW: &str = "2026-10-12T09:00:00Z";

pub const CATALOG: &str = r#"
[product.pea]
name = "Pea Shoots"
tray_size = "10x20"

[[product.pea.stage]]
type = "seed"
offset_days = 0
notes = "Soak overnight"

[[product.pea.stage]]
type = "germinate"
offset_days = 1
duration_days = 3

[[product.pea.stage]]
type = "light"
offset_days = 4

[[product.pea.stage]]
type = "harvest"
offset_days = 10

[product.basil]
name = "Basil"
tray_size = "5x5"

[[product.basil.stage]]
type = "seed"
offset_days = 0

[[product.basil.stage]]
type = "harvest"
offset_days = 15
"#;

/// A state directory with the test catalog in place
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(dir.path().join("catalog.toml"), CATALOG).expect("Failed to write catalog");
        Self { dir }
    }

    pub fn state(&self) -> &Path {
        self.dir.path()
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.path().join("events.jsonl")
    }

    pub fn events(&self) -> String {
        fs::read_to_string(self.events_path()).unwrap_or_default()
    }

    /// `mg` against this state directory with the clock pinned to [`NOW`]
    pub fn mg(&self) -> Command {
        self.mg_at(NOW)
    }

    pub fn mg_at(&self, now: &str) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("mg").expect("mg binary not built");
        cmd.env_remove("MG_LOG")
            .arg("--state")
            .arg(self.state())
            .arg("--now")
            .arg(now);
        cmd
    }

    /// Run a command with `--output json` and parse stdout
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .mg()
            .args(["--output", "json"])
            .args(args)
            .output()
            .expect("Failed to run mg");
        assert!(
            output.status.success(),
            "mg {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }

    /// Id of the only task of `kind`
    pub fn task_id(&self, kind: &str) -> String {
        let tasks = self.json(&["tasks", "--type", kind]);
        let tasks = tasks.as_array().expect("tasks is an array");
        assert_eq!(tasks.len(), 1, "expected one {} task", kind);
        tasks[0]["id"].as_str().expect("id is a string").to_string()
    }
}
