// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mg-core: pure domain for the microgreens production engine
//!
//! This crate provides:
//! - The production task state machine and its effects
//! - Stage templates, the rack capacity model and reservations
//! - The delivery calendar (lead times, delivery dates, split suggestions)
//! - Operations persisted to the write-ahead log and emitted events
//! - Engine configuration

pub mod clock;
pub mod id;

pub mod calendar;
pub mod config;
pub mod effect;
pub mod event;
pub mod operation;
pub mod rack;
pub mod reservation;
pub mod stage;
pub mod task;
pub mod tray;

pub use calendar::{
    CalendarError, CartItem, DeliveryCalendar, DeliveryDateOption, DeliveryGroup, LeadTimePolicy,
    LeadTimeSpread, MAX_HORIZON_DAYS, MAX_LEAD_TIME_DAYS,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{CalendarConfig, ConfigError, EngineConfig, PoolConfig, RacksConfig, SweepConfig};
pub use effect::{Effect, TracedEffect};
pub use event::Event;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use operation::Operation;
pub use rack::{CapacityError, RackId, RackLayout, RackPool, SlotRequirement};
pub use reservation::{GrowWindow, Reservation, ReservationId, ReservationStatus};
pub use stage::{Stage, StageTemplate, TaskType, TemplateError};
pub use task::{OwnerRef, Priority, ProductionTask, TaskEvent, TaskId, TaskKey, TaskStatus};
pub use tray::TraySize;
