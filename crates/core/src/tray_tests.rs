// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_both_sizes() {
    assert_eq!("10x20".parse::<TraySize>(), Ok(TraySize::Large));
    assert_eq!(" 5x5 ".parse::<TraySize>(), Ok(TraySize::Small));
}

#[test]
fn rejects_other_sizes() {
    assert_eq!(
        "10x10".parse::<TraySize>(),
        Err(UnknownTraySize("10x10".to_string()))
    );
}

#[test]
fn serializes_as_dimension_string() {
    assert_eq!(serde_json::to_string(&TraySize::Small).unwrap(), "\"5x5\"");
}
