// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append events to a JSON-lines file for other processes to tail

use super::{EmitError, EventSink};
use async_trait::async_trait;
use mg_core::Event;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct JsonlEventSink {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl JsonlEventSink {
    pub fn open(path: &Path) -> Result<Self, EmitError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSink for JsonlEventSink {
    async fn emit(&self, event: &Event) -> Result<(), EmitError> {
        let line = serde_json::to_string(event)?;
        let mut file = self.file.lock().unwrap_or_else(|e| e.into_inner());
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
