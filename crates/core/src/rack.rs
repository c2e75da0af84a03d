// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rack capacity model
//!
//! Static description of grow-rack pools plus the pure slot arithmetic used
//! by the allocator. Nothing here holds usage state.

use crate::tray::TraySize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a rack pool (e.g. "main", "premium")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RackId(pub String);

impl RackId {
    pub fn new(id: impl Into<String>) -> Self {
        RackId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named pool of slots that natively holds one tray size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackPool {
    pub id: RackId,
    pub name: String,
    pub total_slots: u32,
    pub tray_size: TraySize,
}

/// Errors from slot-requirement computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: u32 },
    #[error("no rack pool holds {tray} trays")]
    NoPoolForTray { tray: TraySize },
}

/// Where a request should go and how many slots it costs there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequirement {
    pub rack: RackId,
    pub slots_needed: u32,
    /// Whether the caller may retry against another pool
    pub can_overflow: bool,
}

/// The farm's rack pools and the 5x5-per-10x20 conversion ratio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackLayout {
    pools: Vec<RackPool>,
    trays_per_slot: u32,
}

impl RackLayout {
    /// Build a layout; needs one native pool per tray size and a non-zero ratio
    pub fn new(pools: Vec<RackPool>, trays_per_slot: u32) -> Result<Self, String> {
        if trays_per_slot == 0 {
            return Err("trays_per_slot must be at least 1".to_string());
        }
        for (i, pool) in pools.iter().enumerate() {
            if pools[..i].iter().any(|p| p.id == pool.id) {
                return Err(format!("duplicate rack pool id: {}", pool.id));
            }
        }
        for tray in [TraySize::Large, TraySize::Small] {
            if !pools.iter().any(|p| p.tray_size == tray) {
                return Err(format!("no rack pool for {} trays", tray));
            }
        }
        Ok(RackLayout {
            pools,
            trays_per_slot,
        })
    }

    /// Main (20 x 10x20) and premium (9 x 5x5) pools, 8 small trays per slot
    pub fn reference() -> Self {
        RackLayout {
            pools: vec![
                RackPool {
                    id: RackId::new("main"),
                    name: "Main Production Rack".to_string(),
                    total_slots: 20,
                    tray_size: TraySize::Large,
                },
                RackPool {
                    id: RackId::new("premium"),
                    name: "Premium Small Tray Area".to_string(),
                    total_slots: 9,
                    tray_size: TraySize::Small,
                },
            ],
            trays_per_slot: 8,
        }
    }

    pub fn pools(&self) -> &[RackPool] {
        &self.pools
    }

    pub fn trays_per_slot(&self) -> u32 {
        self.trays_per_slot
    }

    pub fn pool(&self, id: &RackId) -> Option<&RackPool> {
        self.pools.iter().find(|p| &p.id == id)
    }

    /// First pool declared for a tray size
    pub fn native_pool(&self, tray: TraySize) -> Option<&RackPool> {
        self.pools.iter().find(|p| p.tray_size == tray)
    }

    /// Primary target for `quantity` trays of `tray`, 1:1 in the native pool
    pub fn calculate_slot_requirement(
        &self,
        tray: TraySize,
        quantity: u32,
    ) -> Result<SlotRequirement, CapacityError> {
        if quantity == 0 {
            return Err(CapacityError::InvalidQuantity { quantity });
        }
        let pool = self
            .native_pool(tray)
            .ok_or(CapacityError::NoPoolForTray { tray })?;
        Ok(SlotRequirement {
            rack: pool.id.clone(),
            slots_needed: quantity,
            can_overflow: tray == TraySize::Small,
        })
    }

    /// Overflow target for 5x5 demand: the 10x20 pool at `ceil(qty / ratio)`
    pub fn overflow_requirement(
        &self,
        tray: TraySize,
        quantity: u32,
    ) -> Result<Option<SlotRequirement>, CapacityError> {
        if quantity == 0 {
            return Err(CapacityError::InvalidQuantity { quantity });
        }
        if tray != TraySize::Small {
            return Ok(None);
        }
        let pool = self
            .native_pool(TraySize::Large)
            .ok_or(CapacityError::NoPoolForTray {
                tray: TraySize::Large,
            })?;
        Ok(Some(SlotRequirement {
            rack: pool.id.clone(),
            slots_needed: quantity.div_ceil(self.trays_per_slot),
            can_overflow: false,
        }))
    }

    /// Requirements to try in order: primary, then overflow if permitted
    pub fn candidates(
        &self,
        tray: TraySize,
        quantity: u32,
    ) -> Result<Vec<SlotRequirement>, CapacityError> {
        let primary = self.calculate_slot_requirement(tray, quantity)?;
        let mut out = Vec::with_capacity(2);
        let overflow = if primary.can_overflow {
            self.overflow_requirement(tray, quantity)?
        } else {
            None
        };
        out.push(primary);
        out.extend(overflow);
        Ok(out)
    }
}

impl Default for RackLayout {
    fn default() -> Self {
        Self::reference()
    }
}

#[cfg(test)]
#[path = "rack_tests.rs"]
mod tests;
