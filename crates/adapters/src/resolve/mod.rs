// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Product and stage template lookup

mod catalog;

pub use catalog::CatalogResolver;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeResolver;

use async_trait::async_trait;
use mg_core::{LeadTimePolicy, StageTemplate, TraySize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("product {0} has no stages")]
    MissingStages(String),
    #[error("{product} reaches its last stage on day {span_days} but grows for only {lead_time_days} days")]
    StagesOverrunLeadTime {
        product: String,
        span_days: u32,
        lead_time_days: u32,
    },
}

/// What the scheduler needs to know about a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpec {
    pub id: String,
    pub name: String,
    pub tray_size: TraySize,
    pub lead_time_days: Option<u32>,
    pub stages: StageTemplate,
}

impl ProductSpec {
    /// Days from sowing to delivery: explicit, else the tray-size default.
    ///
    /// The last stage must land on or before the delivery day.
    pub fn lead_time(&self, policy: &LeadTimePolicy) -> Result<u32, ResolveError> {
        let lead_time_days = match self.lead_time_days.filter(|d| *d > 0) {
            Some(days) => days,
            None => policy.for_tray(self.tray_size),
        };
        let span_days = self.stages.span_days();
        if span_days > lead_time_days {
            return Err(ResolveError::StagesOverrunLeadTime {
                product: self.id.clone(),
                span_days,
                lead_time_days,
            });
        }
        Ok(lead_time_days)
    }
}

/// Read-only source of product stage templates
#[async_trait]
pub trait StageResolver: Clone + Send + Sync + 'static {
    async fn resolve(&self, product_id: &str) -> Result<ProductSpec, ResolveError>;
}
