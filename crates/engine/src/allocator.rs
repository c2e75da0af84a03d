// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity allocation over the rack layout
//!
//! The allocator turns a tray request into candidate pool requirements
//! (primary, then 10x20 overflow for 5x5) and claims slots through the
//! ledger's atomic increment-with-ceiling. It never holds slot counts itself.

use crate::EngineError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mg_core::{
    DeliveryCalendar, GrowWindow, LeadTimePolicy, OwnerRef, RackId, RackLayout, Reservation,
    ReservationId, ReservationStatus, SlotRequirement, TraySize,
};
use mg_storage::{CapacityLedger, ReserveOutcome};
use std::sync::Arc;

/// Forecast entries kept per request
const FORECAST_LIMIT: usize = 10;

/// Free slots at or below this count read as low stock
const LOW_STOCK_SLOTS: u32 = 3;

/// Result of a read-only capacity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub reason: Option<String>,
    /// Pool the request would land in (the last pool tried when unavailable)
    pub rack: RackId,
    pub available_slots: u32,
    pub requested_slots: u32,
}

/// A reservation claimed by [`CapacityAllocator::reserve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    New(Reservation),
    /// The order line already held a reservation
    Existing(Reservation),
}

impl Allocation {
    pub fn reservation(&self) -> &Reservation {
        match self {
            Allocation::New(r) | Allocation::Existing(r) => r,
        }
    }

    pub fn into_reservation(self) -> Reservation {
        match self {
            Allocation::New(r) | Allocation::Existing(r) => r,
        }
    }
}

/// Peak usage of one pool over a date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackUtilization {
    pub rack: RackId,
    pub name: String,
    pub used: u32,
    pub available: u32,
    pub total: u32,
    pub utilization_percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    SoldOut,
    LowStock,
    InStock,
}

impl StockStatus {
    fn for_free_slots(slots: u32) -> Self {
        match slots {
            0 => StockStatus::SoldOut,
            s if s <= LOW_STOCK_SLOTS => StockStatus::LowStock,
            _ => StockStatus::InStock,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StockStatus::SoldOut => "sold_out",
            StockStatus::LowStock => "low_stock",
            StockStatus::InStock => "in_stock",
        })
    }
}

/// Free capacity for one tray on an upcoming delivery date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub available_slots: u32,
    pub status: StockStatus,
}

/// Reserves and releases rack slots through a [`CapacityLedger`]
#[derive(Clone)]
pub struct CapacityAllocator<L> {
    ledger: L,
    layout: Arc<RackLayout>,
    lead_times: LeadTimePolicy,
}

impl<L: CapacityLedger> CapacityAllocator<L> {
    pub fn new(ledger: L, layout: RackLayout, lead_times: LeadTimePolicy) -> Self {
        Self {
            ledger,
            layout: Arc::new(layout),
            lead_times,
        }
    }

    pub fn layout(&self) -> &RackLayout {
        &self.layout
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Whether `quantity` trays could be grown for `delivery`, without writing.
    ///
    /// The grow window uses the tray-size default lead time.
    pub async fn check_availability(
        &self,
        tray: TraySize,
        quantity: u32,
        delivery: NaiveDate,
    ) -> Result<Availability, EngineError> {
        let window = GrowWindow::ending(delivery, self.lead_times.for_tray(tray));
        let candidates = self.layout.candidates(tray, quantity)?;

        let mut last = None;
        for (index, requirement) in candidates.iter().enumerate() {
            let free = self.free_slots(&requirement.rack, window).await?;
            if free >= requirement.slots_needed {
                return Ok(Availability {
                    available: true,
                    reason: None,
                    rack: requirement.rack.clone(),
                    available_slots: free,
                    requested_slots: requirement.slots_needed,
                });
            }
            last = Some((index, requirement, free));
        }

        let Some((index, requirement, free)) = last else {
            return Err(EngineError::CapacityExhausted {
                tray,
                quantity,
                reason: "no candidate pool".to_string(),
            });
        };
        Ok(Availability {
            available: false,
            reason: Some(self.shortfall_reason(&candidates, index, free)),
            rack: requirement.rack.clone(),
            available_slots: free,
            requested_slots: requirement.slots_needed,
        })
    }

    /// Claim slots for one order line, primary pool first and overflow second.
    ///
    /// Each attempt is a single atomic check-and-increment in the ledger, so
    /// concurrent callers never push a pool past its total.
    #[allow(clippy::too_many_arguments)]
    pub async fn reserve(
        &self,
        owner: &OwnerRef,
        product_id: &str,
        tray: TraySize,
        quantity: u32,
        window: GrowWindow,
        now: DateTime<Utc>,
    ) -> Result<Allocation, EngineError> {
        let candidates = self.layout.candidates(tray, quantity)?;
        let id = ReservationId::for_line(owner, product_id);

        let mut reason = String::new();
        for (index, requirement) in candidates.iter().enumerate() {
            let total = self.total_slots(&requirement.rack);
            let reservation = Reservation {
                id: id.clone(),
                owner: owner.clone(),
                product_id: product_id.to_string(),
                tray_size: tray,
                quantity,
                rack: requirement.rack.clone(),
                slots: requirement.slots_needed,
                window,
                status: ReservationStatus::Reserved,
                created_at: now,
                updated_at: now,
            };
            match self.ledger.reserve_within(reservation, total).await? {
                ReserveOutcome::Reserved(r) => {
                    tracing::info!(
                        reservation = %r.id,
                        rack = %r.rack,
                        slots = r.slots,
                        overflow = index > 0,
                        "capacity reserved"
                    );
                    return Ok(Allocation::New(r));
                }
                ReserveOutcome::Existing(r) => {
                    tracing::debug!(reservation = %r.id, "reservation already held");
                    return Ok(Allocation::Existing(r));
                }
                ReserveOutcome::OwnerCancelled => {
                    return Err(EngineError::OwnerCancelled(owner.clone()));
                }
                ReserveOutcome::Denied { available } => {
                    tracing::debug!(
                        rack = %requirement.rack,
                        needed = requirement.slots_needed,
                        available,
                        "pool cannot hold request"
                    );
                    reason = self.shortfall_reason(&candidates, index, available);
                }
            }
        }

        tracing::warn!(%owner, product_id, %tray, quantity, %reason, "capacity denied");
        Err(EngineError::CapacityExhausted {
            tray,
            quantity,
            reason,
        })
    }

    /// Move a reservation to a released status. Releasing twice is a no-op.
    pub async fn release(
        &self,
        id: &ReservationId,
        status: ReservationStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Reservation>, EngineError> {
        Ok(self.ledger.set_status(id, status, now).await?)
    }

    pub async fn reservation(&self, id: &ReservationId) -> Result<Option<Reservation>, EngineError> {
        Ok(self.ledger.reservation(id).await?)
    }

    /// Peak daily usage of every pool across `window`
    pub async fn utilization(
        &self,
        window: GrowWindow,
    ) -> Result<Vec<RackUtilization>, EngineError> {
        let mut out = Vec::with_capacity(self.layout.pools().len());
        for pool in self.layout.pools() {
            let used = self.ledger.peak_usage(&pool.id, window).await?;
            let utilization_percent = if pool.total_slots == 0 {
                0
            } else {
                ((f64::from(used) / f64::from(pool.total_slots)) * 100.0).round() as u32
            };
            out.push(RackUtilization {
                rack: pool.id.clone(),
                name: pool.name.clone(),
                used,
                available: pool.total_slots.saturating_sub(used),
                total: pool.total_slots,
                utilization_percent,
            });
        }
        Ok(out)
    }

    /// Free space for a single tray on each delivery date in the next `days`
    pub async fn forecast(
        &self,
        calendar: &DeliveryCalendar,
        today: NaiveDate,
        days: u32,
        tray: TraySize,
    ) -> Result<Vec<ForecastEntry>, EngineError> {
        let mut out = Vec::new();
        for offset in 0..=i64::from(days) {
            let date = today + Duration::days(offset);
            if !calendar.is_delivery_day(date) {
                continue;
            }
            let check = self.check_availability(tray, 1, date).await?;
            let free = if check.available {
                check.available_slots
            } else {
                0
            };
            out.push(ForecastEntry {
                date,
                available_slots: free,
                status: StockStatus::for_free_slots(free),
            });
            if out.len() == FORECAST_LIMIT {
                break;
            }
        }
        Ok(out)
    }

    async fn free_slots(&self, rack: &RackId, window: GrowWindow) -> Result<u32, EngineError> {
        let used = self.ledger.peak_usage(rack, window).await?;
        Ok(self.total_slots(rack).saturating_sub(used))
    }

    fn total_slots(&self, rack: &RackId) -> u32 {
        self.layout.pool(rack).map(|p| p.total_slots).unwrap_or(0)
    }

    fn pool_name(&self, rack: &RackId) -> String {
        self.layout
            .pool(rack)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| rack.to_string())
    }

    fn shortfall_reason(
        &self,
        candidates: &[SlotRequirement],
        index: usize,
        available: u32,
    ) -> String {
        let requirement = &candidates[index];
        if index == 0 {
            format!(
                "Insufficient capacity on {}. Need {} slots, only {} available.",
                self.pool_name(&requirement.rack),
                requirement.slots_needed,
                available
            )
        } else {
            format!(
                "{} full, {} overflow also full. Need {} slots, only {} available.",
                self.pool_name(&candidates[0].rack),
                self.pool_name(&requirement.rack),
                requirement.slots_needed,
                available
            )
        }
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod tests;
