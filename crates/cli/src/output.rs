// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print rows under a header, or `empty` when there are none
pub fn print_table<T: Serialize + std::fmt::Display>(
    header: &str,
    rows: &[T],
    empty: &str,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Text if rows.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            println!("{}", header);
            for row in rows {
                println!("{}", row);
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(rows) {
                println!("{}", json);
            }
        }
    }
}

/// First `n` characters of an id for table columns
pub fn short(id: &str, n: usize) -> &str {
    match id.char_indices().nth(n) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
