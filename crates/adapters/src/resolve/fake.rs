// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake stage resolver for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProductSpec, ResolveError, StageResolver};
use async_trait::async_trait;
use mg_core::{Stage, StageTemplate, TaskType, TraySize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    products: HashMap<String, ProductSpec>,
    calls: Vec<String>,
}

/// In-memory resolver whose products can change mid-test
#[derive(Clone, Default)]
pub struct FakeResolver {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// SEED 0, GERMINATE 1, LIGHT 4, HARVEST 10 on 10x20 trays
    pub fn standard_template() -> StageTemplate {
        StageTemplate::new(vec![
            Stage::new(TaskType::Seed, 0).with_notes("Sow evenly"),
            Stage::new(TaskType::Germinate, 1),
            Stage::new(TaskType::Light, 4),
            Stage::new(TaskType::Harvest, 10),
        ])
        .unwrap_or_else(|_| unreachable!("static template is valid"))
    }

    pub fn with_product(self, id: &str, tray_size: TraySize, stages: StageTemplate) -> Self {
        self.insert(ProductSpec {
            id: id.to_string(),
            name: id.to_string(),
            tray_size,
            lead_time_days: None,
            stages,
        });
        self
    }

    pub fn insert(&self, spec: ProductSpec) {
        self.lock().products.insert(spec.id.clone(), spec);
    }

    /// Drop a product so later lookups fail
    pub fn remove(&self, id: &str) {
        self.lock().products.remove(id);
    }

    /// Product ids looked up, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StageResolver for FakeResolver {
    async fn resolve(&self, product_id: &str) -> Result<ProductSpec, ResolveError> {
        let mut state = self.lock();
        state.calls.push(product_id.to_string());
        state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownProduct(product_id.to_string()))
    }
}
