// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Physical tray sizes

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tray size: {0} (expected 10x20 or 5x5)")]
pub struct UnknownTraySize(pub String);

/// A tray is either a full 10x20 flat or a small 5x5 premium tray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraySize {
    #[serde(rename = "10x20")]
    Large,
    #[serde(rename = "5x5")]
    Small,
}

impl TraySize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraySize::Large => "10x20",
            TraySize::Small => "5x5",
        }
    }
}

impl std::fmt::Display for TraySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraySize {
    type Err = UnknownTraySize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "10x20" => Ok(TraySize::Large),
            "5x5" => Ok(TraySize::Small),
            other => Err(UnknownTraySize(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "tray_tests.rs"]
mod tests;
