// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for delivery dates, grouping and validation

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_mg_help() {
    TestEnv::new()
        .mg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("production scheduling"));
}

#[test]
fn test_dates_marks_days_inside_lead_time_unavailable() {
    let env = TestEnv::new();

    let dates = env.json(&["dates", "--lead-time", "10", "--horizon", "14"]);

    let rows: Vec<(&str, bool)> = dates
        .as_array()
        .unwrap()
        .iter()
        .map(|d| (d["date"].as_str().unwrap(), d["available"].as_bool().unwrap()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2026-10-13", false),
            ("2026-10-15", false),
            ("2026-10-17", false),
            ("2026-10-20", false),
            ("2026-10-22", true),
            ("2026-10-24", true),
        ]
    );
    assert_eq!(
        dates[0]["reason"],
        "Needs 10 days to grow (9 days too soon)"
    );
}

#[test]
fn test_dates_for_catalog_item_uses_tray_lead_time() {
    let env = TestEnv::new();

    env.mg()
        .args(["dates", "--item", "basil", "--horizon", "14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Needs 15 days to grow"))
        .stdout(predicate::str::contains("2026-10-24"));
}

#[test]
fn test_dates_reads_cart_file() {
    let env = TestEnv::new();
    let cart = env.state().join("cart.json");
    fs::write(
        &cart,
        r#"[{"name": "Sunflower", "qty": 2, "lead_time_days": 12}]"#,
    )
    .unwrap();

    let dates = env.json(&["dates", "--cart", cart.to_str().unwrap(), "--horizon", "14"]);

    let first_available = dates
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["available"] == true)
        .unwrap();
    assert_eq!(first_available["date"], "2026-10-24");
}

#[test]
fn test_dates_rejects_horizon_past_limit() {
    TestEnv::new()
        .mg()
        .args(["dates", "--lead-time", "10", "--horizon", "200000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--horizon"));
}

#[test]
fn test_cart_lead_time_past_limit_is_rejected() {
    let env = TestEnv::new();
    let cart = env.state().join("cart.json");
    fs::write(&cart, r#"[{"name": "Moss", "lead_time_days": 200000000}]"#).unwrap();

    env.mg()
        .args(["groups", "--cart", cart.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Moss asks for 200000000 days to grow; the limit is 180",
        ));
}

#[test]
fn test_dates_without_cart_fails() {
    TestEnv::new()
        .mg()
        .arg("dates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--lead-time"));
}

#[test]
fn test_groups_suggests_split_for_mixed_cart() {
    let env = TestEnv::new();

    env.mg()
        .args(["groups", "--item", "pea:2", "--item", "basil"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Split delivery suggested (5 days between fastest and slowest)",
        ))
        .stdout(predicate::str::contains("earliest 2026-10-22"))
        .stdout(predicate::str::contains("earliest 2026-10-27"));
}

#[test]
fn test_groups_ships_single_lead_time_together() {
    TestEnv::new()
        .mg()
        .args(["groups", "--item", "pea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ship together"));
}

#[test]
fn test_validate_accepts_saturday_delivery() {
    TestEnv::new()
        .mg()
        .args(["validate", "--item", "pea", "--date", "2026-10-24"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "2026-10-24 (Saturday, 10 AM - 2 PM) works for this cart",
        ));
}

#[test]
fn test_validate_rejects_non_delivery_day() {
    TestEnv::new()
        .mg()
        .args(["validate", "--item", "pea", "--date", "2026-10-26"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a delivery day"));
}

#[test]
fn test_validate_rejects_date_inside_lead_time() {
    TestEnv::new()
        .mg()
        .args(["validate", "--item", "basil", "--date", "2026-10-24"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Basil needs 15 days to grow"));
}

#[test]
fn test_unknown_catalog_item_fails() {
    TestEnv::new()
        .mg()
        .args(["groups", "--item", "kale"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown product: kale"));
}

#[test]
fn test_missing_explicit_catalog_fails() {
    TestEnv::new()
        .mg()
        .args(["--catalog", "/nonexistent/catalog.toml", "groups", "--item", "pea"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog not found"));
}
