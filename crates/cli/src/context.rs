// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loaded configuration, catalog and clock shared by every command

use anyhow::{bail, Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use mg_adapters::{CatalogResolver, JsonlEventSink, TracedEventSink, TracedResolver};
use mg_catalog::{load_catalog, Catalog, ProductDef};
use mg_core::{CartItem, Clock, DeliveryCalendar, EngineConfig, SystemClock, UuidIdGen};
use mg_engine::{EngineDeps, SchedulerConfig, TaskScheduler};
use mg_storage::Store;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where emitted events are appended inside the state directory
pub const EVENTS_FILE: &str = "events.jsonl";

pub type Scheduler = TaskScheduler<
    Store,
    TracedResolver<CatalogResolver>,
    TracedEventSink<JsonlEventSink>,
    CliClock,
    UuidIdGen,
>;

/// Wall clock, or a fixed instant from `--now`
#[derive(Clone)]
pub enum CliClock {
    System(SystemClock),
    Pinned(DateTime<Utc>),
}

impl Clock for CliClock {
    fn now(&self) -> DateTime<Utc> {
        match self {
            CliClock::System(clock) => clock.now(),
            CliClock::Pinned(at) => *at,
        }
    }
}

pub struct Context {
    pub config: EngineConfig,
    pub calendar: DeliveryCalendar,
    pub catalog: Catalog,
    pub clock: CliClock,
    state_dir: PathBuf,
}

impl Context {
    pub fn load(
        state_dir: &Path,
        config: Option<&Path>,
        catalog: Option<&Path>,
        now: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let config_path = config
            .map(Path::to_path_buf)
            .or_else(|| Some(state_dir.join("config.toml")).filter(|p| p.exists()));
        let config = match config_path {
            Some(path) => EngineConfig::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        config.validate()?;
        let calendar = config.calendar()?;

        let catalog = match catalog {
            Some(path) if !path.exists() => bail!("catalog not found: {}", path.display()),
            Some(path) => load_catalog(path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?,
            None => {
                let path = state_dir.join("catalog.toml");
                if path.exists() {
                    load_catalog(&path)
                        .with_context(|| format!("failed to load catalog {}", path.display()))?
                } else {
                    Catalog::default()
                }
            }
        };

        let clock = match now {
            Some(at) => CliClock::Pinned(at),
            None => CliClock::System(SystemClock),
        };

        Ok(Self {
            config,
            calendar,
            catalog,
            clock,
            state_dir: state_dir.to_path_buf(),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn product(&self, id: &str) -> Result<&ProductDef> {
        match self.catalog.get(id) {
            Some(product) => Ok(product),
            None => bail!("unknown product: {}", id),
        }
    }

    /// Open the store in the state directory and wire up the engine
    pub fn scheduler(&self) -> Result<Scheduler> {
        let store = Store::open(&self.state_dir)?;
        let sink = JsonlEventSink::open(&self.state_dir.join(EVENTS_FILE))?;
        let config = SchedulerConfig {
            layout: self.config.rack_layout()?,
            lead_times: self.config.lead_times.clone(),
            sweep: self.config.sweep.clone(),
        };
        Ok(TaskScheduler::new(
            EngineDeps {
                store,
                resolver: TracedResolver::new(CatalogResolver::new(self.catalog.clone())),
                sink: TracedEventSink::new(sink),
            },
            config,
            self.clock.clone(),
            UuidIdGen,
        ))
    }
}

/// `product[:qty]` on the command line, quantity defaulting to 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineArg {
    pub product: String,
    pub qty: u32,
}

impl FromStr for LineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product, qty) = match s.split_once(':') {
            Some((product, qty)) => {
                let qty = qty
                    .parse()
                    .map_err(|_| format!("invalid quantity in {:?}", s))?;
                (product, qty)
            }
            None => (s, 1),
        };
        if product.is_empty() {
            return Err(format!("missing product in {:?}", s));
        }
        Ok(LineArg {
            product: product.to_string(),
            qty,
        })
    }
}

impl LineArg {
    pub fn cart_item(&self, ctx: &Context) -> Result<CartItem> {
        Ok(ctx.product(&self.product)?.cart_item(self.qty))
    }
}
