// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Product definitions

use mg_core::{CartItem, StageTemplate, TraySize};
use std::collections::BTreeMap;

/// A sellable microgreen and how it is grown
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDef {
    pub id: String,
    pub name: String,
    pub tray_size: TraySize,
    /// Overrides the tray-size default
    pub lead_time_days: Option<u32>,
    pub size_oz: Option<f64>,
    /// `None` when the catalog entry has no stage list
    pub stages: Option<StageTemplate>,
}

impl ProductDef {
    /// This product as a cart line for the delivery calendar
    pub fn cart_item(&self, qty: u32) -> CartItem {
        CartItem {
            name: self.name.clone(),
            qty,
            lead_time_days: self.lead_time_days,
            size_oz: self.size_oz,
            tray_size: Some(self.tray_size),
        }
    }
}

/// Products by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub products: BTreeMap<String, ProductDef>,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&ProductDef> {
        self.products.get(id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn insert(&mut self, product: ProductDef) {
        self.products.insert(product.id.clone(), product);
    }
}
