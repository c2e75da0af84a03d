// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery calendar
//!
//! Resolves cart lead times into offerable delivery dates. Everything here
//! is a pure function of "today", the cart, and static configuration.

use crate::tray::TraySize;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_WINDOW: &str = "2 PM - 6 PM";

/// Longest grow any cart item may ask for
pub const MAX_LEAD_TIME_DAYS: u32 = 180;
/// Furthest ahead delivery dates are listed
pub const MAX_HORIZON_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("{date} is not a delivery day; we only deliver on {allowed}")]
    NotADeliveryDay { date: NaiveDate, allowed: String },
    #[error("{item} needs {lead_time_days} days to grow (delivery in {days_until} days is too soon)")]
    TooSoon {
        item: String,
        lead_time_days: u32,
        days_until: i64,
    },
    #[error("no delivery days configured")]
    NoDeliveryDays,
    #[error("{item} asks for {lead_time_days} days to grow; the limit is {max}")]
    LeadTimeTooLong {
        item: String,
        lead_time_days: u32,
        max: u32,
    },
    #[error("horizon of {days} days is over the {max} day limit")]
    HorizonTooLong { days: u32, max: u32 },
}

/// A line in a customer's cart, as seen by the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub size_oz: Option<f64>,
    #[serde(default)]
    pub tray_size: Option<TraySize>,
}

fn default_qty() -> u32 {
    1
}

impl CartItem {
    pub fn new(name: impl Into<String>) -> Self {
        CartItem {
            name: name.into(),
            qty: 1,
            lead_time_days: None,
            size_oz: None,
            tray_size: None,
        }
    }

    pub fn with_lead_time(mut self, days: u32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    pub fn with_size_oz(mut self, oz: f64) -> Self {
        self.size_oz = Some(oz);
        self
    }

    pub fn with_tray(mut self, tray: TraySize) -> Self {
        self.tray_size = Some(tray);
        self
    }
}

/// Default grow times for items without an explicit lead time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadTimePolicy {
    pub standard_days: u32,
    pub premium_days: u32,
    /// Packages smaller than this are grown in premium trays
    pub premium_size_threshold_oz: f64,
}

impl Default for LeadTimePolicy {
    fn default() -> Self {
        LeadTimePolicy {
            standard_days: 10,
            premium_days: 15,
            premium_size_threshold_oz: 50.0,
        }
    }
}

impl LeadTimePolicy {
    /// Lead time for one item: explicit value, then package size, then tray size
    pub fn resolve(&self, item: &CartItem) -> u32 {
        if let Some(days) = item.lead_time_days.filter(|d| *d > 0) {
            return days;
        }
        if let Some(oz) = item.size_oz {
            return if oz < self.premium_size_threshold_oz {
                self.premium_days
            } else {
                self.standard_days
            };
        }
        match item.tray_size {
            Some(tray) => self.for_tray(tray),
            None => self.standard_days,
        }
    }

    pub fn for_tray(&self, tray: TraySize) -> u32 {
        match tray {
            TraySize::Small => self.premium_days,
            TraySize::Large => self.standard_days,
        }
    }
}

/// One candidate delivery date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDateOption {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub days_until_delivery: i64,
    pub window: String,
}

/// Cart items sharing a lead time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryGroup {
    pub lead_time_days: u32,
    pub items: Vec<CartItem>,
    pub earliest_delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeSpread {
    pub has_mixed: bool,
    pub days_difference: u32,
    pub suggest_split: bool,
}

/// Weekday for an index where 0 is Sunday
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Configured delivery weekdays, horizon and split threshold
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryCalendar {
    delivery_days: Vec<Weekday>,
    horizon_days: u32,
    split_threshold_days: u32,
    windows: HashMap<Weekday, String>,
    lead_times: LeadTimePolicy,
}

impl DeliveryCalendar {
    pub fn new(
        delivery_days: Vec<Weekday>,
        horizon_days: u32,
        split_threshold_days: u32,
        lead_times: LeadTimePolicy,
    ) -> Result<Self, CalendarError> {
        if delivery_days.is_empty() {
            return Err(CalendarError::NoDeliveryDays);
        }
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(CalendarError::HorizonTooLong {
                days: horizon_days,
                max: MAX_HORIZON_DAYS,
            });
        }
        for (name, days) in [
            ("standard trays", lead_times.standard_days),
            ("premium trays", lead_times.premium_days),
        ] {
            if days > MAX_LEAD_TIME_DAYS {
                return Err(CalendarError::LeadTimeTooLong {
                    item: name.to_string(),
                    lead_time_days: days,
                    max: MAX_LEAD_TIME_DAYS,
                });
            }
        }
        let mut delivery_days = delivery_days;
        delivery_days.sort_by_key(|d| d.num_days_from_sunday());
        delivery_days.dedup();
        Ok(DeliveryCalendar {
            delivery_days,
            horizon_days,
            split_threshold_days,
            windows: HashMap::new(),
            lead_times,
        })
    }

    /// Tue/Thu/Sat, 30 day horizon, split at a 5 day gap
    pub fn reference() -> Self {
        DeliveryCalendar {
            delivery_days: vec![Weekday::Tue, Weekday::Thu, Weekday::Sat],
            horizon_days: 30,
            split_threshold_days: 5,
            windows: HashMap::from([
                (Weekday::Tue, DEFAULT_WINDOW.to_string()),
                (Weekday::Thu, DEFAULT_WINDOW.to_string()),
                (Weekday::Sat, "10 AM - 2 PM".to_string()),
            ]),
            lead_times: LeadTimePolicy::default(),
        }
    }

    pub fn with_windows(mut self, windows: HashMap<Weekday, String>) -> Self {
        self.windows = windows;
        self
    }

    pub fn lead_times(&self) -> &LeadTimePolicy {
        &self.lead_times
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn is_delivery_day(&self, date: NaiveDate) -> bool {
        self.delivery_days.contains(&date.weekday())
    }

    /// Delivery window label for a date's weekday
    pub fn window_for(&self, date: NaiveDate) -> &str {
        self.windows
            .get(&date.weekday())
            .map(String::as_str)
            .unwrap_or(DEFAULT_WINDOW)
    }

    /// Lead time for one item, rejecting grows past [`MAX_LEAD_TIME_DAYS`]
    pub fn lead_time_of(&self, item: &CartItem) -> Result<u32, CalendarError> {
        let days = self.lead_times.resolve(item);
        if days > MAX_LEAD_TIME_DAYS {
            return Err(CalendarError::LeadTimeTooLong {
                item: item.name.clone(),
                lead_time_days: days,
                max: MAX_LEAD_TIME_DAYS,
            });
        }
        Ok(days)
    }

    /// The slowest item's lead time
    pub fn required_lead_time(&self, items: &[CartItem]) -> Result<u32, CalendarError> {
        let mut required = None;
        for item in items {
            let days = self.lead_time_of(item)?;
            required = Some(required.map_or(days, |r: u32| r.max(days)));
        }
        required.ok_or(CalendarError::EmptyCart)
    }

    /// Every delivery weekday from tomorrow through `today + horizon_days`.
    ///
    /// The horizon is clamped to [`MAX_HORIZON_DAYS`] and the listing stops
    /// at the last representable date.
    pub fn available_delivery_dates(
        &self,
        today: NaiveDate,
        required_lead_time_days: u32,
        horizon_days: u32,
    ) -> Vec<DeliveryDateOption> {
        let required = i64::from(required_lead_time_days);
        (1..=u64::from(horizon_days.min(MAX_HORIZON_DAYS)))
            .map_while(|offset| today.checked_add_days(Days::new(offset)))
            .filter(|date| self.is_delivery_day(*date))
            .map(|date| {
                let days_until = (date - today).num_days();
                let available = days_until >= required;
                DeliveryDateOption {
                    date,
                    day_of_week: date.format("%A").to_string(),
                    available,
                    reason: (!available).then(|| {
                        format!(
                            "Needs {} days to grow ({} days too soon)",
                            required,
                            required - days_until
                        )
                    }),
                    days_until_delivery: days_until,
                    window: self.window_for(date).to_string(),
                }
            })
            .collect()
    }

    /// Delivery dates for a cart over the configured horizon
    pub fn dates_for_cart(
        &self,
        today: NaiveDate,
        items: &[CartItem],
    ) -> Result<Vec<DeliveryDateOption>, CalendarError> {
        let required = self.required_lead_time(items)?;
        Ok(self.available_delivery_dates(today, required, self.horizon_days))
    }

    /// Earliest offerable date for a lead time.
    ///
    /// Searches at least a week past the lead time so long grows still find a date.
    pub fn next_available_delivery_date(
        &self,
        today: NaiveDate,
        required_lead_time_days: u32,
    ) -> Option<NaiveDate> {
        let horizon = self
            .horizon_days
            .max(required_lead_time_days.saturating_add(7));
        self.available_delivery_dates(today, required_lead_time_days, horizon)
            .into_iter()
            .find(|option| option.available)
            .map(|option| option.date)
    }

    /// Partition a cart by resolved lead time, fastest group first
    pub fn group_by_lead_time(
        &self,
        today: NaiveDate,
        items: &[CartItem],
    ) -> Result<Vec<DeliveryGroup>, CalendarError> {
        if items.is_empty() {
            return Err(CalendarError::EmptyCart);
        }
        let mut groups: Vec<DeliveryGroup> = Vec::new();
        for item in items {
            let lead = self.lead_time_of(item)?;
            match groups.iter_mut().find(|g| g.lead_time_days == lead) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(DeliveryGroup {
                    lead_time_days: lead,
                    items: vec![item.clone()],
                    earliest_delivery_date: None,
                }),
            }
        }
        groups.sort_by_key(|g| g.lead_time_days);
        for group in &mut groups {
            group.earliest_delivery_date =
                self.next_available_delivery_date(today, group.lead_time_days);
        }
        Ok(groups)
    }

    /// Whether grouped items are far enough apart to offer split delivery
    pub fn suggests_split(&self, groups: &[DeliveryGroup]) -> bool {
        match (groups.first(), groups.last()) {
            (Some(fastest), Some(slowest)) if groups.len() >= 2 => {
                slowest.lead_time_days - fastest.lead_time_days >= self.split_threshold_days
            }
            _ => false,
        }
    }

    pub fn lead_time_spread(&self, items: &[CartItem]) -> Result<LeadTimeSpread, CalendarError> {
        let leads = items
            .iter()
            .map(|i| self.lead_time_of(i))
            .collect::<Result<Vec<u32>, _>>()?;
        let (Some(min), Some(max)) = (leads.iter().min(), leads.iter().max()) else {
            return Err(CalendarError::EmptyCart);
        };
        let difference = max - min;
        Ok(LeadTimeSpread {
            has_mixed: difference > 0,
            days_difference: difference,
            suggest_split: difference >= self.split_threshold_days,
        })
    }

    /// Check a proposed date; the weekday is checked before any item
    pub fn validate_delivery_date(
        &self,
        today: NaiveDate,
        date: NaiveDate,
        items: &[CartItem],
    ) -> Result<(), CalendarError> {
        if items.is_empty() {
            return Err(CalendarError::EmptyCart);
        }
        if !self.is_delivery_day(date) {
            return Err(CalendarError::NotADeliveryDay {
                date,
                allowed: self.allowed_days(),
            });
        }
        let days_until = (date - today).num_days();
        for item in items {
            let lead = self.lead_time_of(item)?;
            if days_until < i64::from(lead) {
                return Err(CalendarError::TooSoon {
                    item: item.name.clone(),
                    lead_time_days: lead,
                    days_until,
                });
            }
        }
        Ok(())
    }

    /// "Tuesdays, Thursdays, and Saturdays"
    fn allowed_days(&self) -> String {
        let names: Vec<String> = self
            .delivery_days
            .iter()
            .map(|d| format!("{}s", weekday_name(*d)))
            .collect();
        match names.as_slice() {
            [] => String::new(),
            [one] => one.clone(),
            [a, b] => format!("{} and {}", a, b),
            [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
        }
    }
}

impl Default for DeliveryCalendar {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
