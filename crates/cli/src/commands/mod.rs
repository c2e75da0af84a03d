// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations

pub mod calendar;
pub mod capacity;
pub mod schedule;
pub mod tasks;
