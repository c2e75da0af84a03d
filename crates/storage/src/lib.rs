// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable storage: write-ahead log, materialized state, and the task and
//! capacity stores built on them

mod state;
mod store;
mod wal;

pub use state::MaterializedState;
pub use store::{
    CapacityLedger, Completion, Promoted, ReserveOutcome, Store, StoreError, TaskFilter,
    TaskInsert, TaskStore, LOCK_FILE, WAL_FILE,
};
pub use wal::{Wal, WalError};
