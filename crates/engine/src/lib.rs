// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Production scheduling engine: capacity allocation, task scheduling and
//! the executor that carries out task-transition effects

mod allocator;
mod error;
mod executor;
mod scheduler;

pub use allocator::{
    Allocation, Availability, CapacityAllocator, ForecastEntry, RackUtilization, StockStatus,
};
pub use error::EngineError;
pub use executor::Executor;
pub use scheduler::{
    CompleteOutcome, EngineDeps, LineItem, SchedulerConfig, SweepReport, TaskScheduler,
};
