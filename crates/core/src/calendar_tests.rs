// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Duration;
use proptest::prelude::*;
use yare::parameterized;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A Monday
fn monday() -> NaiveDate {
    date(2026, 10, 12)
}

fn item(name: &str, lead: u32) -> CartItem {
    CartItem::new(name).with_lead_time(lead)
}

#[parameterized(
    explicit = { CartItem::new("pea").with_lead_time(12), 12 },
    explicit_beats_size = { CartItem::new("pea").with_lead_time(8).with_size_oz(2.0), 8 },
    zero_falls_back = { CartItem::new("pea").with_lead_time(0), 10 },
    small_package = { CartItem::new("basil").with_size_oz(2.0), 15 },
    threshold_is_standard = { CartItem::new("pea").with_size_oz(50.0), 10 },
    small_tray = { CartItem::new("shiso").with_tray(TraySize::Small), 15 },
    large_tray = { CartItem::new("sunflower").with_tray(TraySize::Large), 10 },
    nothing_known = { CartItem::new("mystery"), 10 },
)]
fn lead_time_resolution(item: CartItem, expected: u32) {
    assert_eq!(LeadTimePolicy::default().resolve(&item), expected);
}

#[test]
fn required_lead_time_is_the_maximum() {
    let cal = DeliveryCalendar::reference();
    let items = vec![item("pea", 10), item("shiso", 16), item("radish", 8)];
    assert_eq!(cal.required_lead_time(&items), Ok(16));
}

#[test]
fn empty_cart_has_no_lead_time() {
    let cal = DeliveryCalendar::reference();
    assert_eq!(cal.required_lead_time(&[]), Err(CalendarError::EmptyCart));
    assert_eq!(cal.dates_for_cart(monday(), &[]), Err(CalendarError::EmptyCart));
    assert!(cal.group_by_lead_time(monday(), &[]).is_err());
}

#[test]
fn monday_cart_of_ten_days_first_offers_thursday_week_after_next() {
    let cal = DeliveryCalendar::reference();
    let dates = cal.dates_for_cart(monday(), &[item("pea", 10)]).unwrap();

    let first = dates.iter().position(|d| d.available).unwrap();
    assert_eq!(dates[first].date, date(2026, 10, 22));
    assert_eq!(dates[first].day_of_week, "Thursday");
    assert_eq!(dates[first].days_until_delivery, 10);

    let earlier: Vec<_> = dates[..first].iter().map(|d| d.date).collect();
    assert_eq!(
        earlier,
        vec![
            date(2026, 10, 13),
            date(2026, 10, 15),
            date(2026, 10, 17),
            date(2026, 10, 20)
        ]
    );
    assert_eq!(
        dates[0].reason.as_deref(),
        Some("Needs 10 days to grow (9 days too soon)")
    );
    assert!(dates[..first].iter().all(|d| !d.available));
    assert!(dates[first..].iter().all(|d| d.available));
}

#[test]
fn horizon_end_is_included_and_today_is_not() {
    let cal = DeliveryCalendar::reference();
    // Tuesday; horizon lands on the Thursday 30 days later
    let today = date(2026, 10, 13);
    let dates = cal.available_delivery_dates(today, 1, 30);
    assert_eq!(dates.first().map(|d| d.date), Some(date(2026, 10, 15)));
    assert_eq!(dates.last().map(|d| d.date), Some(date(2026, 11, 12)));
}

#[test]
fn options_carry_delivery_windows() {
    let cal = DeliveryCalendar::reference();
    let dates = cal.available_delivery_dates(monday(), 1, 7);
    let windows: Vec<_> = dates.iter().map(|d| d.window.as_str()).collect();
    assert_eq!(windows, vec!["2 PM - 6 PM", "2 PM - 6 PM", "10 AM - 2 PM"]);
}

#[test]
fn next_available_searches_past_short_horizon() {
    let cal = DeliveryCalendar::new(vec![Weekday::Tue], 7, 5, LeadTimePolicy::default()).unwrap();
    assert_eq!(
        cal.next_available_delivery_date(monday(), 15),
        Some(date(2026, 10, 27))
    );
}

#[test]
fn oversized_horizon_is_clamped_and_stops_at_the_last_date() {
    let cal = DeliveryCalendar::reference();

    let dates = cal.available_delivery_dates(monday(), 10, u32::MAX);
    let last = dates.last().unwrap();
    assert!(last.days_until_delivery <= i64::from(MAX_HORIZON_DAYS));
    assert_eq!(dates.len(), 157);

    let near_end = NaiveDate::MAX - Duration::days(3);
    let tail = cal.available_delivery_dates(near_end, 0, 30);
    assert!(tail.len() <= 3);
}

#[test]
fn lead_time_past_limit_is_invalid_input() {
    let cal = DeliveryCalendar::reference();
    let huge = [item("pea", 10), item("moon", 200_000_000)];
    let expected = CalendarError::LeadTimeTooLong {
        item: "moon".to_string(),
        lead_time_days: 200_000_000,
        max: MAX_LEAD_TIME_DAYS,
    };

    assert_eq!(cal.required_lead_time(&huge), Err(expected.clone()));
    assert_eq!(cal.group_by_lead_time(monday(), &huge), Err(expected.clone()));
    assert_eq!(cal.lead_time_spread(&huge), Err(expected));
    assert!(cal
        .validate_delivery_date(monday(), date(2026, 10, 24), &huge)
        .is_err());
    assert!(cal
        .required_lead_time(&[item("slow", MAX_LEAD_TIME_DAYS)])
        .is_ok());
}

#[test]
fn next_available_for_huge_lead_time_is_none() {
    let cal = DeliveryCalendar::reference();
    assert_eq!(cal.next_available_delivery_date(monday(), u32::MAX), None);
}

#[test]
fn calendar_rejects_horizon_past_limit() {
    assert_eq!(
        DeliveryCalendar::new(
            vec![Weekday::Tue],
            MAX_HORIZON_DAYS + 1,
            5,
            LeadTimePolicy::default()
        ),
        Err(CalendarError::HorizonTooLong {
            days: MAX_HORIZON_DAYS + 1,
            max: MAX_HORIZON_DAYS
        })
    );
}

#[test]
fn calendar_needs_delivery_days() {
    assert_eq!(
        DeliveryCalendar::new(vec![], 30, 5, LeadTimePolicy::default()),
        Err(CalendarError::NoDeliveryDays)
    );
}

#[test]
fn wide_gap_groups_and_suggests_split() {
    let cal = DeliveryCalendar::reference();
    let items = vec![item("pea", 10), item("radish", 10), item("shiso", 16)];

    let groups = cal.group_by_lead_time(monday(), &items).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].lead_time_days, 10);
    assert_eq!(groups[0].items.len(), 2);
    assert_eq!(groups[0].earliest_delivery_date, Some(date(2026, 10, 22)));
    assert_eq!(groups[1].lead_time_days, 16);
    assert_eq!(groups[1].earliest_delivery_date, Some(date(2026, 10, 29)));
    assert!(cal.suggests_split(&groups));
    assert!(cal.lead_time_spread(&items).unwrap().suggest_split);
}

#[test]
fn narrow_gap_does_not_suggest_split() {
    let cal = DeliveryCalendar::reference();
    let items = vec![item("pea", 10), item("radish", 12)];

    let groups = cal.group_by_lead_time(monday(), &items).unwrap();
    assert_eq!(groups.len(), 2);
    assert!(!cal.suggests_split(&groups));

    let spread = cal.lead_time_spread(&items).unwrap();
    assert!(spread.has_mixed);
    assert_eq!(spread.days_difference, 2);
    assert!(!spread.suggest_split);
}

#[test]
fn single_group_never_splits() {
    let cal = DeliveryCalendar::reference();
    let groups = cal.group_by_lead_time(monday(), &[item("pea", 10)]).unwrap();
    assert!(!cal.suggests_split(&groups));
}

#[test]
fn validation_checks_weekday_first() {
    let cal = DeliveryCalendar::reference();
    // Wednesday, and also too soon
    let err = cal
        .validate_delivery_date(monday(), date(2026, 10, 14), &[item("pea", 10)])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "2026-10-14 is not a delivery day; we only deliver on Tuesdays, Thursdays, and Saturdays"
    );
}

#[test]
fn validation_reports_first_slow_item() {
    let cal = DeliveryCalendar::reference();
    let items = vec![item("pea", 10), item("shiso", 16), item("basil", 20)];
    let err = cal
        .validate_delivery_date(monday(), date(2026, 10, 24), &items)
        .unwrap_err();
    assert_eq!(
        err,
        CalendarError::TooSoon {
            item: "shiso".to_string(),
            lead_time_days: 16,
            days_until: 12,
        }
    );
    assert_eq!(
        err.to_string(),
        "shiso needs 16 days to grow (delivery in 12 days is too soon)"
    );
}

#[test]
fn validation_accepts_exact_lead_time() {
    let cal = DeliveryCalendar::reference();
    assert_eq!(
        cal.validate_delivery_date(monday(), date(2026, 10, 22), &[item("pea", 10)]),
        Ok(())
    );
}

#[parameterized(
    sunday = { 0, Weekday::Sun },
    tuesday = { 2, Weekday::Tue },
    saturday = { 6, Weekday::Sat },
)]
fn weekday_indices_start_on_sunday(index: u8, expected: Weekday) {
    assert_eq!(weekday_from_index(index), Some(expected));
}

#[test]
fn weekday_index_out_of_range() {
    assert_eq!(weekday_from_index(7), None);
}

fn cart_strategy() -> impl Strategy<Value = Vec<CartItem>> {
    prop::collection::vec(
        (0u32..25, prop::option::of(1.0f64..100.0)).prop_map(|(lead, oz)| {
            let mut item = CartItem::new("item").with_lead_time(lead);
            item.size_oz = oz;
            item
        }),
        1..8,
    )
}

proptest! {
    #[test]
    fn adding_an_item_never_lowers_lead_time(items in cart_strategy(), extra in 0u32..25) {
        let cal = DeliveryCalendar::reference();
        let before = cal.required_lead_time(&items).unwrap();
        let mut more = items.clone();
        more.push(item("extra", extra));
        let after = cal.required_lead_time(&more).unwrap();
        prop_assert!(after >= before);
        let max = items.iter().map(|i| cal.lead_times().resolve(i)).max().unwrap();
        prop_assert_eq!(before, max);
    }

    #[test]
    fn options_are_delivery_days_marked_by_lead_time(
        offset in 0i64..400,
        required in 0u32..40,
        horizon in 0u32..60,
    ) {
        let cal = DeliveryCalendar::reference();
        let today = monday() + Duration::days(offset);
        let dates = cal.available_delivery_dates(today, required, horizon);
        for window in dates.windows(2) {
            prop_assert!(window[0].date < window[1].date);
        }
        for option in &dates {
            prop_assert!(cal.is_delivery_day(option.date));
            prop_assert_eq!(option.available, option.days_until_delivery >= i64::from(required));
            prop_assert!(option.days_until_delivery >= 1);
            prop_assert!(option.days_until_delivery <= i64::from(horizon));
        }
    }

    #[test]
    fn exact_lead_time_boundary(offset in 0i64..400, required in 1u32..25) {
        let cal = DeliveryCalendar::reference();
        let today = monday() + Duration::days(offset);
        let exact = today + Duration::days(i64::from(required));
        let short = exact - Duration::days(1);
        let dates = cal.available_delivery_dates(today, required, required + 1);
        for option in dates {
            if option.date == exact {
                prop_assert!(option.available);
            }
            if option.date == short {
                prop_assert!(!option.available);
            }
        }
    }
}
