// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap()
}

#[test]
fn fake_clock_starts_at_given_instant() {
    let clock = FakeClock::at(monday_morning());
    assert_eq!(clock.now(), monday_morning());
}

#[test]
fn fake_clock_advances() {
    let clock = FakeClock::at(monday_morning());
    clock.advance(Duration::days(2));
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
}

#[test]
fn fake_clock_clones_share_time() {
    let clock = FakeClock::at(monday_morning());
    let other = clock.clone();
    clock.advance(Duration::hours(1));
    assert_eq!(other.now(), monday_morning() + Duration::hours(1));
}

#[test]
fn fake_clock_set_overrides_time() {
    let clock = FakeClock::new();
    clock.set(monday_morning());
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 12).unwrap());
}
