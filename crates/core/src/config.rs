// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration
//!
//! Loaded from TOML. Every section has defaults, so an empty file gives the
//! reference deployment (Tue/Thu/Sat deliveries, main + premium racks).

use crate::calendar::{weekday_from_index, DeliveryCalendar, LeadTimePolicy, DEFAULT_WINDOW};
use crate::rack::{RackId, RackLayout, RackPool};
use crate::tray::TraySize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("weekday index {0} is out of range (0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(u8),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Weekday indices, 0 = Sunday
    pub delivery_days: Vec<u8>,
    pub horizon_days: u32,
    pub split_threshold_days: u32,
    /// Window label per weekday index
    pub windows: BTreeMap<String, String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        CalendarConfig {
            delivery_days: vec![2, 4, 6],
            horizon_days: 30,
            split_threshold_days: 5,
            windows: BTreeMap::from([
                ("2".to_string(), DEFAULT_WINDOW.to_string()),
                ("4".to_string(), DEFAULT_WINDOW.to_string()),
                ("6".to_string(), "10 AM - 2 PM".to_string()),
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub total_slots: u32,
    pub tray_size: TraySize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacksConfig {
    /// 5x5 trays per 10x20 slot
    pub trays_per_slot: u32,
    #[serde(rename = "pool")]
    pub pools: Vec<PoolConfig>,
}

impl Default for RacksConfig {
    fn default() -> Self {
        let reference = RackLayout::reference();
        RacksConfig {
            trays_per_slot: reference.trays_per_slot(),
            pools: reference
                .pools()
                .iter()
                .map(|p| PoolConfig {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    total_slots: p.total_slots,
                    tray_size: p.tray_size,
                })
                .collect(),
        }
    }
}

/// Promotion sweep timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Promote tasks whose run time falls within this much of now
    #[serde(with = "humantime_serde")]
    pub lookahead: Duration,
    /// READY tasks older than this are reported overdue
    #[serde(with = "humantime_serde")]
    pub overdue_after: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            lookahead: Duration::ZERO,
            overdue_after: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub calendar: CalendarConfig,
    pub lead_times: LeadTimePolicy,
    pub racks: RacksConfig,
    pub sweep: SweepConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.calendar()?;
        self.rack_layout()?;
        Ok(())
    }

    pub fn calendar(&self) -> Result<DeliveryCalendar, ConfigError> {
        let days = self
            .calendar
            .delivery_days
            .iter()
            .map(|i| weekday_from_index(*i).ok_or(ConfigError::InvalidWeekday(*i)))
            .collect::<Result<Vec<_>, _>>()?;
        if days.is_empty() {
            return Err(ConfigError::Invalid(
                "calendar.delivery_days is empty".to_string(),
            ));
        }

        let mut windows = HashMap::new();
        for (key, label) in &self.calendar.windows {
            let index: u8 = key.parse().map_err(|_| {
                ConfigError::Invalid(format!("calendar.windows key {:?} is not a weekday", key))
            })?;
            let day = weekday_from_index(index).ok_or(ConfigError::InvalidWeekday(index))?;
            windows.insert(day, label.clone());
        }

        let calendar = DeliveryCalendar::new(
            days,
            self.calendar.horizon_days,
            self.calendar.split_threshold_days,
            self.lead_times.clone(),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(calendar.with_windows(windows))
    }

    pub fn rack_layout(&self) -> Result<RackLayout, ConfigError> {
        let pools = self
            .racks
            .pools
            .iter()
            .map(|p| RackPool {
                id: RackId::new(p.id.clone()),
                name: if p.name.is_empty() {
                    p.id.clone()
                } else {
                    p.name.clone()
                },
                total_slots: p.total_slots,
                tray_size: p.tray_size,
            })
            .collect();
        RackLayout::new(pools, self.racks.trays_per_slot).map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
