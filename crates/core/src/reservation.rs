// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity reservations
//!
//! A reservation holds rack slots in one pool for the grow window of one
//! order line. The lifecycle is `Reserved -> InProgress -> Fulfilled`, with
//! `Cancelled` reachable from either live state.

use crate::rack::RackId;
use crate::task::OwnerRef;
use crate::tray::TraySize;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a reservation, one per order line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(pub String);

impl ReservationId {
    pub fn new(id: impl Into<String>) -> Self {
        ReservationId(id.into())
    }

    /// Deterministic id for an owner's product line
    pub fn for_line(owner: &OwnerRef, product_id: &str) -> Self {
        ReservationId(format!("{}/{}", owner, product_id))
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Slots held, nothing sown yet
    Reserved,
    /// Trays are growing
    InProgress,
    Fulfilled,
    Cancelled,
}

impl ReservationStatus {
    /// Whether the reservation still counts against pool capacity
    pub fn is_active(self) -> bool {
        matches!(
            self,
            ReservationStatus::Reserved | ReservationStatus::InProgress
        )
    }

    /// Whether `self -> next` is a legal move
    pub fn can_become(self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Reserved, ReservationStatus::InProgress)
                | (ReservationStatus::Reserved, ReservationStatus::Fulfilled)
                | (ReservationStatus::Reserved, ReservationStatus::Cancelled)
                | (ReservationStatus::InProgress, ReservationStatus::Fulfilled)
                | (ReservationStatus::InProgress, ReservationStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReservationStatus::Reserved => "RESERVED",
            ReservationStatus::InProgress => "IN_PROGRESS",
            ReservationStatus::Fulfilled => "FULFILLED",
            ReservationStatus::Cancelled => "CANCELLED",
        })
    }
}

/// Inclusive range of calendar days trays occupy a rack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrowWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GrowWindow {
    /// Window from sowing (`lead_days` before delivery) through delivery day
    pub fn ending(delivery: NaiveDate, lead_days: u32) -> Self {
        GrowWindow {
            start: delivery - Duration::days(i64::from(lead_days)),
            end: delivery,
        }
    }

    /// Each day in the window, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Slots held in one pool for one order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub owner: OwnerRef,
    pub product_id: String,
    pub tray_size: TraySize,
    /// Trays requested
    pub quantity: u32,
    pub rack: RackId,
    /// Slots charged against the pool
    pub slots: u32,
    pub window: GrowWindow,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Move to `next` if legal; `None` leaves the reservation as it was
    pub fn with_status(&self, next: ReservationStatus, at: DateTime<Utc>) -> Option<Reservation> {
        if !self.status.can_become(next) {
            return None;
        }
        Some(Reservation {
            status: next,
            updated_at: at,
            ..self.clone()
        })
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
