// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log

use crate::reservation::{Reservation, ReservationId, ReservationStatus};
use crate::task::{OwnerRef, ProductionTask, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutations persisted to the WAL, replayed in order to rebuild state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Insert a new task
    TaskCreate { task: ProductionTask },

    /// Pending task became actionable
    TaskPromote { id: TaskId, at: DateTime<Utc> },

    /// Operator completed a task
    TaskComplete {
        id: TaskId,
        #[serde(default)]
        notes: String,
        at: DateTime<Utc>,
    },

    /// Slots held for an order line
    ReservationCreate { reservation: Reservation },

    /// Reservation lifecycle change (in progress, fulfilled, cancelled)
    ReservationStatus {
        id: ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    },

    /// Owner cancelled; no further lines may be scheduled for it
    OwnerCancel { owner: OwnerRef, at: DateTime<Utc> },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::TaskCreate { .. } => "task_create",
            Operation::TaskPromote { .. } => "task_promote",
            Operation::TaskComplete { .. } => "task_complete",
            Operation::ReservationCreate { .. } => "reservation_create",
            Operation::ReservationStatus { .. } => "reservation_status",
            Operation::OwnerCancel { .. } => "owner_cancel",
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
