// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects requested by the task state machine

use crate::event::Event;
use crate::reservation::{ReservationId, ReservationStatus};
use crate::task::ProductionTask;

/// Side effects that a task transition asks the executor to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish an event to the sink
    Emit(Event),
    /// Materialize the remaining template stages after SEED completes
    ExpandStages { seed: ProductionTask },
    /// Create the PACK task after HARVEST completes
    CreatePack { harvest: ProductionTask },
    /// Trays are in the ground; the reservation can no longer move
    MarkInProgress { reservation: ReservationId },
    /// Return a reservation's slots to its pool
    ReleaseCapacity {
        reservation: ReservationId,
        status: ReservationStatus,
    },
}

/// Operations that should be traced
///
/// Provides consistent naming and structured fields for logging.
pub trait TracedEffect {
    /// Effect name for log spans (e.g., "expand_stages")
    fn name(&self) -> &'static str;

    /// Key-value pairs for structured logging
    fn fields(&self) -> Vec<(&'static str, String)>;
}

impl TracedEffect for Effect {
    fn name(&self) -> &'static str {
        match self {
            Effect::Emit(_) => "emit",
            Effect::ExpandStages { .. } => "expand_stages",
            Effect::CreatePack { .. } => "create_pack",
            Effect::MarkInProgress { .. } => "mark_in_progress",
            Effect::ReleaseCapacity { .. } => "release_capacity",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Emit(event) => vec![("event", event.name().to_string())],
            Effect::ExpandStages { seed } => vec![
                ("seed_id", seed.id.to_string()),
                ("product_id", seed.product_id.clone()),
            ],
            Effect::CreatePack { harvest } => vec![
                ("harvest_id", harvest.id.to_string()),
                ("owner", harvest.owner.to_string()),
            ],
            Effect::MarkInProgress { reservation } => {
                vec![("reservation", reservation.to_string())]
            }
            Effect::ReleaseCapacity {
                reservation,
                status,
            } => vec![
                ("reservation", reservation.to_string()),
                ("status", status.to_string()),
            ],
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
