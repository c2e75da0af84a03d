// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event emission hook
//!
//! Downstream notifiers (email, SMS, dashboards) subscribe through an
//! `EventSink`. Delivery failures never fail the engine operation.

mod jsonl;

pub use jsonl::JsonlEventSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEventSink;

use async_trait::async_trait;
use mg_core::Event;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EventSink: Clone + Send + Sync + 'static {
    async fn emit(&self, event: &Event) -> Result<(), EmitError>;
}
