// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rack capacity views: utilization, availability checks, forecast

use crate::context::Context;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use clap::Args;
use mg_core::{GrowWindow, TraySize};
use mg_engine::{Availability, ForecastEntry, RackUtilization};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct CapacityArgs {
    /// First day of the range (default: today)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the range (default: today + calendar horizon)
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Check whether this many trays fit for a delivery date instead
    #[arg(long, requires = "tray", conflicts_with_all = ["from", "until"])]
    delivery: Option<NaiveDate>,

    /// Tray size for the availability check (10x20 or 5x5)
    #[arg(long)]
    tray: Option<TraySize>,

    /// Trays for the availability check
    #[arg(long, default_value_t = 1)]
    qty: u32,
}

#[derive(Serialize)]
struct UtilizationRow {
    rack: String,
    name: String,
    used: u32,
    available: u32,
    total: u32,
    utilization_percent: u32,
}

impl From<RackUtilization> for UtilizationRow {
    fn from(u: RackUtilization) -> Self {
        UtilizationRow {
            rack: u.rack.to_string(),
            name: u.name,
            used: u.used,
            available: u.available,
            total: u.total,
            utilization_percent: u.utilization_percent,
        }
    }
}

impl fmt::Display for UtilizationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<26} {:>4} {:>5} {:>5} {:>4}%",
            self.rack, self.name, self.used, self.available, self.total, self.utilization_percent
        )
    }
}

#[derive(Serialize)]
struct AvailabilityView {
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    rack: String,
    available_slots: u32,
    requested_slots: u32,
}

impl From<Availability> for AvailabilityView {
    fn from(a: Availability) -> Self {
        AvailabilityView {
            available: a.available,
            reason: a.reason,
            rack: a.rack.to_string(),
            available_slots: a.available_slots,
            requested_slots: a.requested_slots,
        }
    }
}

impl fmt::Display for AvailabilityView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            None => write!(
                f,
                "Available on {}: {} slot(s) needed, {} free",
                self.rack, self.requested_slots, self.available_slots
            ),
            Some(reason) => write!(f, "Unavailable: {}", reason),
        }
    }
}

pub async fn capacity(ctx: &Context, args: CapacityArgs, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let allocator = scheduler.allocator();

    if let Some(delivery) = args.delivery {
        let Some(tray) = args.tray else {
            bail!("--delivery needs --tray");
        };
        let check = allocator.check_availability(tray, args.qty, delivery).await?;
        output::print(&AvailabilityView::from(check), format);
        return Ok(());
    }

    let start = args.from.unwrap_or_else(|| ctx.today());
    let end = args.until.unwrap_or_else(|| {
        ctx.today() + Duration::days(i64::from(ctx.calendar.horizon_days()))
    });
    if end < start {
        bail!("--until {} is before --from {}", end, start);
    }
    let rows: Vec<UtilizationRow> = allocator
        .utilization(GrowWindow { start, end })
        .await?
        .into_iter()
        .map(UtilizationRow::from)
        .collect();
    output::print_table(
        &format!(
            "{:<10} {:<26} {:>4} {:>5} {:>5} {:>5}",
            "RACK", "NAME", "USED", "FREE", "TOTAL", "UTIL"
        ),
        &rows,
        "No racks configured",
        format,
    );
    Ok(())
}

#[derive(Args)]
pub struct ForecastArgs {
    /// Tray size to forecast (10x20 or 5x5)
    #[arg(long)]
    tray: TraySize,

    /// Days ahead to look
    #[arg(long, default_value_t = 14)]
    days: u32,
}

#[derive(Serialize)]
struct ForecastRow {
    date: NaiveDate,
    available_slots: u32,
    status: String,
}

impl From<ForecastEntry> for ForecastRow {
    fn from(e: ForecastEntry) -> Self {
        ForecastRow {
            date: e.date,
            available_slots: e.available_slots,
            status: e.status.to_string(),
        }
    }
}

impl fmt::Display for ForecastRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<10} {:>5}  {}",
            self.date,
            self.date.format("%A"),
            self.available_slots,
            self.status
        )
    }
}

pub async fn forecast(ctx: &Context, args: ForecastArgs, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let rows: Vec<ForecastRow> = scheduler
        .allocator()
        .forecast(&ctx.calendar, ctx.today(), args.days, args.tray)
        .await?
        .into_iter()
        .map(ForecastRow::from)
        .collect();
    output::print_table(
        &format!("{:<12} {:<10} {:>5}  STATUS", "DATE", "DAY", "FREE"),
        &rows,
        "No delivery dates in range",
        format,
    );
    Ok(())
}
