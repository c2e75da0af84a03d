// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery calendar commands: dates, groups, validate

use crate::context::{Context, LineArg};
use crate::output::{self, OutputFormat};
use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use clap::Args;
use mg_core::{
    CartItem, DeliveryDateOption, DeliveryGroup, LeadTimeSpread, MAX_HORIZON_DAYS,
    MAX_LEAD_TIME_DAYS,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Cart contents from a JSON file and/or catalog products
#[derive(Args)]
pub struct CartArgs {
    /// JSON file holding an array of cart items
    #[arg(long)]
    cart: Option<PathBuf>,

    /// Catalog product as `id[:qty]` (repeatable)
    #[arg(long = "item")]
    items: Vec<LineArg>,
}

impl CartArgs {
    fn load(&self, ctx: &Context) -> Result<Vec<CartItem>> {
        let mut items: Vec<CartItem> = match &self.cart {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read cart {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("invalid cart {}", path.display()))?
            }
            None => Vec::new(),
        };
        for line in &self.items {
            items.push(line.cart_item(ctx)?);
        }
        Ok(items)
    }
}

#[derive(Args)]
pub struct DatesArgs {
    #[command(flatten)]
    cart: CartArgs,

    /// Required lead time in days, instead of a cart
    #[arg(
        long,
        conflicts_with_all = ["cart", "items"],
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_LEAD_TIME_DAYS)),
    )]
    lead_time: Option<u32>,

    /// Days ahead to list (default: calendar horizon)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_HORIZON_DAYS)))]
    horizon: Option<u32>,
}

#[derive(Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    cart: CartArgs,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    cart: CartArgs,

    /// Proposed delivery date (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
}

#[derive(Serialize)]
struct DateRow {
    date: NaiveDate,
    day_of_week: String,
    days_until_delivery: i64,
    available: bool,
    window: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<DeliveryDateOption> for DateRow {
    fn from(option: DeliveryDateOption) -> Self {
        DateRow {
            date: option.date,
            day_of_week: option.day_of_week,
            days_until_delivery: option.days_until_delivery,
            available: option.available,
            window: option.window,
            reason: option.reason,
        }
    }
}

impl fmt::Display for DateRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<10} {:>4}  {:<9}  {:<14} {}",
            self.date,
            self.day_of_week,
            self.days_until_delivery,
            if self.available { "yes" } else { "no" },
            self.window,
            self.reason.as_deref().unwrap_or("")
        )
    }
}

pub fn dates(ctx: &Context, args: DatesArgs, format: OutputFormat) -> Result<()> {
    let required = match args.lead_time {
        Some(days) => days,
        None => {
            let items = args.cart.load(ctx)?;
            if items.is_empty() {
                bail!("give a cart with --cart or --item, or a --lead-time");
            }
            ctx.calendar.required_lead_time(&items)?
        }
    };
    let horizon = args.horizon.unwrap_or(ctx.calendar.horizon_days());
    let rows: Vec<DateRow> = ctx
        .calendar
        .available_delivery_dates(ctx.today(), required, horizon)
        .into_iter()
        .map(DateRow::from)
        .collect();

    output::print_table(
        &format!(
            "{:<12} {:<10} {:>4}  {:<9}  {:<14} REASON",
            "DATE", "DAY", "DAYS", "AVAILABLE", "WINDOW"
        ),
        &rows,
        "No delivery dates in range",
        format,
    );
    Ok(())
}

#[derive(Serialize)]
struct GroupsReport {
    groups: Vec<DeliveryGroup>,
    spread: LeadTimeSpread,
    suggest_split: bool,
}

impl fmt::Display for GroupsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            let names: Vec<&str> = group.items.iter().map(|i| i.name.as_str()).collect();
            let earliest = group
                .earliest_delivery_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string());
            writeln!(
                f,
                "{:>3} days  earliest {}  {}",
                group.lead_time_days,
                earliest,
                names.join(", ")
            )?;
        }
        if self.suggest_split {
            write!(
                f,
                "Split delivery suggested ({} days between fastest and slowest)",
                self.spread.days_difference
            )
        } else {
            write!(f, "Ship together")
        }
    }
}

pub fn groups(ctx: &Context, args: GroupsArgs, format: OutputFormat) -> Result<()> {
    let items = args.cart.load(ctx)?;
    let groups = ctx.calendar.group_by_lead_time(ctx.today(), &items)?;
    let report = GroupsReport {
        suggest_split: ctx.calendar.suggests_split(&groups),
        spread: ctx.calendar.lead_time_spread(&items)?,
        groups,
    };
    output::print(&report, format);
    Ok(())
}

#[derive(Serialize)]
struct Valid {
    date: NaiveDate,
    day_of_week: String,
    window: String,
}

impl fmt::Display for Valid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) works for this cart",
            self.date, self.day_of_week, self.window
        )
    }
}

pub fn validate(ctx: &Context, args: ValidateArgs, format: OutputFormat) -> Result<()> {
    let items = args.cart.load(ctx)?;
    ctx.calendar
        .validate_delivery_date(ctx.today(), args.date, &items)?;
    output::print(
        &Valid {
            date: args.date,
            day_of_week: args.date.format("%A").to_string(),
            window: ctx.calendar.window_for(args.date).to_string(),
        },
        format,
    );
    Ok(())
}
