// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain events published to the event sink

use crate::rack::RackId;
use crate::reservation::{ReservationId, ReservationStatus};
use crate::stage::TaskType;
use crate::task::{OwnerRef, TaskId, TaskStatus};
use crate::tray::TraySize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Something that happened in the scheduling engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Task events
    TaskCreated {
        task_id: TaskId,
        owner: OwnerRef,
        product_id: String,
        kind: TaskType,
        run_at: DateTime<Utc>,
        status: TaskStatus,
    },
    TaskReady {
        task_id: TaskId,
        kind: TaskType,
        run_at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: TaskId,
        owner: OwnerRef,
        product_id: String,
        kind: TaskType,
    },
    TaskOverdue {
        task_id: TaskId,
        kind: TaskType,
        run_at: DateTime<Utc>,
    },
    StagesExpanded {
        seed_id: TaskId,
        created: Vec<TaskId>,
    },
    StageExpansionFailed {
        seed_id: TaskId,
        product_id: String,
        reason: String,
    },

    // Capacity events
    CapacityReserved {
        reservation_id: ReservationId,
        rack: RackId,
        slots: u32,
    },
    CapacityDenied {
        owner: OwnerRef,
        product_id: String,
        tray: TraySize,
        quantity: u32,
        reason: String,
    },
    CapacityReleased {
        reservation_id: ReservationId,
        rack: RackId,
        slots: u32,
        status: ReservationStatus,
    },

    OwnerCancelled {
        owner: OwnerRef,
        released: Vec<ReservationId>,
    },
}

impl Event {
    /// Event name for filtering and log fields
    /// Format: "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            Event::TaskCreated { .. } => "task:created",
            Event::TaskReady { .. } => "task:ready",
            Event::TaskCompleted { .. } => "task:completed",
            Event::TaskOverdue { .. } => "task:overdue",
            Event::StagesExpanded { .. } => "stages:expanded",
            Event::StageExpansionFailed { .. } => "stages:failed",
            Event::CapacityReserved { .. } => "capacity:reserved",
            Event::CapacityDenied { .. } => "capacity:denied",
            Event::CapacityReleased { .. } => "capacity:released",
            Event::OwnerCancelled { .. } => "owner:cancelled",
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
