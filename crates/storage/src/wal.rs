// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of scheduling operations
//!
//! One JSON object per line: `{"seq": N, "op": {...}}`. A line cut short by a
//! crash mid-append is dropped on replay; corruption anywhere else is an error.

use mg_core::Operation;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt WAL entry at line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
}

pub struct Wal {
    path: PathBuf,
    file: File,
    sequence: u64,
}

impl Wal {
    /// Open or create a WAL, continuing the sequence of existing entries.
    ///
    /// A truncated trailing entry is cut off so the next append starts on a
    /// clean line.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let log = Self::read_log(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if log.truncated {
            file.set_len(log.valid_len)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
            sequence: log.entries.last().map(|e| e.seq).unwrap_or(0),
        })
    }

    /// Append and fsync; returns the entry's sequence number
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let entry = WalEntry {
            seq: self.sequence + 1,
            op: op.clone(),
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_data()?;
        self.sequence = entry.seq;
        Ok(self.sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All operations in append order; a missing file is an empty log
    pub fn replay(path: &Path) -> Result<Vec<Operation>, WalError> {
        Ok(Self::read_log(path)?
            .entries
            .into_iter()
            .map(|e| e.op)
            .collect())
    }

    fn read_log(path: &Path) -> Result<LogContents, WalError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(LogContents::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut log = LogContents::default();
        let mut offset = 0u64;
        for (i, raw) in content.split_inclusive('\n').enumerate() {
            let line = raw.trim();
            let end = offset + raw.len() as u64;
            if line.is_empty() {
                offset = end;
                log.valid_len = end;
                continue;
            }
            match serde_json::from_str::<WalEntry>(line) {
                Ok(entry) => {
                    log.entries.push(entry);
                    log.valid_len = end;
                }
                Err(e) if !raw.ends_with('\n') && e.is_eof() => {
                    tracing::warn!(
                        path = %path.display(),
                        line = i + 1,
                        "dropping truncated WAL entry"
                    );
                    log.truncated = true;
                }
                Err(source) => return Err(WalError::Corrupt { line: i + 1, source }),
            }
            offset = end;
        }
        Ok(log)
    }
}

#[derive(Debug, Default)]
struct LogContents {
    entries: Vec<WalEntry>,
    /// Byte length of the well-formed prefix
    valid_len: u64,
    truncated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WalEntry {
    seq: u64,
    op: Operation,
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
