// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduling engine

use chrono::NaiveDate;
use mg_adapters::ResolveError;
use mg_core::{CapacityError, OwnerRef, TaskId, TraySize};
use mg_storage::StoreError;
use thiserror::Error;

/// Errors surfaced by the allocator and scheduler
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid capacity request: {0}")]
    Capacity(#[from] CapacityError),
    #[error("stage template lookup failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error(
        "{product_id} needs {lead_time_days} days to grow but {delivery} is only {days_until} days away"
    )]
    DeliveryTooSoon {
        product_id: String,
        delivery: NaiveDate,
        lead_time_days: u32,
        days_until: i64,
    },
    #[error("owner {0} is cancelled")]
    OwnerCancelled(OwnerRef),
    #[error("no rack can hold {quantity} {tray} trays: {reason}")]
    CapacityExhausted {
        tray: TraySize,
        quantity: u32,
        reason: String,
    },
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("seed task {task} completed but its stages could not be expanded: {source}")]
    DataIntegrity {
        task: TaskId,
        #[source]
        source: ResolveError,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// The customer can fix this by picking a later date or fewer trays
    pub fn is_customer_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::CapacityExhausted { .. } | EngineError::DeliveryTooSoon { .. }
        )
    }

    /// Rejected before any write
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EngineError::Capacity(_) | EngineError::Resolve(_) | EngineError::OwnerCancelled(_)
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
