// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::resolve::{ProductSpec, ResolveError, StageResolver};
use crate::sink::{EmitError, EventSink};
use async_trait::async_trait;
use mg_core::Event;
use tracing::Instrument;

/// Wrapper that adds tracing to any StageResolver
#[derive(Clone)]
pub struct TracedResolver<R> {
    inner: R,
}

impl<R> TracedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: StageResolver> StageResolver for TracedResolver<R> {
    async fn resolve(&self, product_id: &str) -> Result<ProductSpec, ResolveError> {
        let span = tracing::debug_span!("resolver.resolve", product_id);

        let start = std::time::Instant::now();
        let result = self.inner.resolve(product_id).instrument(span.clone()).await;
        let elapsed = start.elapsed();

        let _guard = span.enter();
        match &result {
            Ok(spec) => tracing::debug!(
                stages = spec.stages.stages().len(),
                tray = %spec.tray_size,
                elapsed_ms = elapsed.as_millis() as u64,
                "resolved"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "resolve failed"
            ),
        }

        result
    }
}

/// Wrapper that adds tracing to any EventSink
#[derive(Clone)]
pub struct TracedEventSink<S> {
    inner: S,
}

impl<S> TracedEventSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: EventSink> EventSink for TracedEventSink<S> {
    async fn emit(&self, event: &Event) -> Result<(), EmitError> {
        let span = tracing::debug_span!("sink.emit", event = event.name());

        let result = self.inner.emit(event).instrument(span.clone()).await;
        let _guard = span.enter();
        match &result {
            Ok(()) => tracing::trace!("emitted"),
            Err(e) => tracing::warn!(error = %e, "emit failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
