// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolver backed by a parsed product catalog

use super::{ProductSpec, ResolveError, StageResolver};
use async_trait::async_trait;
use mg_catalog::Catalog;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct CatalogResolver {
    catalog: Arc<Catalog>,
}

impl CatalogResolver {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl StageResolver for CatalogResolver {
    async fn resolve(&self, product_id: &str) -> Result<ProductSpec, ResolveError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| ResolveError::UnknownProduct(product_id.to_string()))?;
        let stages = product
            .stages
            .clone()
            .ok_or_else(|| ResolveError::MissingStages(product_id.to_string()))?;
        Ok(ProductSpec {
            id: product.id.clone(),
            name: product.name.clone(),
            tray_size: product.tray_size,
            lead_time_days: product.lead_time_days,
            stages,
        })
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
