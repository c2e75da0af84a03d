// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reservation(status: ReservationStatus) -> Reservation {
    let at = Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap();
    Reservation {
        id: ReservationId::for_line(&OwnerRef::order("o-1"), "pea"),
        owner: OwnerRef::order("o-1"),
        product_id: "pea".to_string(),
        tray_size: TraySize::Large,
        quantity: 2,
        rack: RackId::new("main"),
        slots: 2,
        window: GrowWindow::ending(date(2026, 10, 24), 10),
        status,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn line_id_joins_owner_and_product() {
    let id = ReservationId::for_line(&OwnerRef::subscription("s-4"), "sunflower");
    assert_eq!(id.to_string(), "subscription:s-4/sunflower");
}

#[test]
fn window_runs_from_sow_date_through_delivery() {
    let window = GrowWindow::ending(date(2026, 10, 24), 10);
    assert_eq!(window.start, date(2026, 10, 14));
    let days: Vec<NaiveDate> = window.days().collect();
    assert_eq!(days.len(), 11);
    assert_eq!(days.first(), Some(&date(2026, 10, 14)));
    assert_eq!(days.last(), Some(&date(2026, 10, 24)));
}

#[parameterized(
    reserved_to_in_progress = { ReservationStatus::Reserved, ReservationStatus::InProgress, true },
    in_progress_to_fulfilled = { ReservationStatus::InProgress, ReservationStatus::Fulfilled, true },
    in_progress_to_cancelled = { ReservationStatus::InProgress, ReservationStatus::Cancelled, true },
    in_progress_back = { ReservationStatus::InProgress, ReservationStatus::Reserved, false },
    fulfilled_is_final = { ReservationStatus::Fulfilled, ReservationStatus::Cancelled, false },
    cancelled_is_final = { ReservationStatus::Cancelled, ReservationStatus::InProgress, false },
)]
fn status_moves(from: ReservationStatus, to: ReservationStatus, legal: bool) {
    assert_eq!(reservation(from).with_status(to, Utc::now()).is_some(), legal);
}

#[test]
fn only_live_statuses_hold_capacity() {
    assert!(reservation(ReservationStatus::Reserved).is_active());
    assert!(reservation(ReservationStatus::InProgress).is_active());
    assert!(!reservation(ReservationStatus::Fulfilled).is_active());
    assert!(!reservation(ReservationStatus::Cancelled).is_active());
}
