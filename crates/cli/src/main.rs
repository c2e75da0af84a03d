// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mg - microgreens production scheduler CLI

mod commands;
mod context;
mod output;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use commands::{calendar, capacity, schedule, tasks};
use context::Context;
use output::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "mg",
    version,
    about = "mg - production scheduling and rack capacity for a microgreens farm"
)]
struct Cli {
    /// State directory holding the log, events, config and catalog
    #[arg(long, global = true, default_value = ".mg")]
    state: PathBuf,

    /// Engine config (default: <state>/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Product catalog (default: <state>/catalog.toml)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Pin the clock to an RFC 3339 instant
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    #[arg(long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delivery dates a cart can be offered
    Dates(calendar::DatesArgs),
    /// Group a cart by lead time and suggest split delivery
    Groups(calendar::GroupsArgs),
    /// Check one proposed delivery date
    Validate(calendar::ValidateArgs),
    /// Reserve capacity and create SEED tasks for order lines
    Schedule(schedule::ScheduleArgs),
    /// Mark a task done
    Complete(schedule::CompleteArgs),
    /// List production tasks
    Tasks(tasks::TasksArgs),
    /// Promote due tasks and report overdue ones
    Sweep,
    /// Cancel an order or subscription and release its capacity
    Cancel(schedule::CancelArgs),
    /// Rack utilization, or an availability check with --delivery
    Capacity(capacity::CapacityArgs),
    /// Free capacity on upcoming delivery dates
    Forecast(capacity::ForecastArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let ctx = Context::load(
        &cli.state,
        cli.config.as_deref(),
        cli.catalog.as_deref(),
        cli.now,
    )?;
    let format = cli.output;

    match cli.command {
        Commands::Dates(args) => calendar::dates(&ctx, args, format)?,
        Commands::Groups(args) => calendar::groups(&ctx, args, format)?,
        Commands::Validate(args) => calendar::validate(&ctx, args, format)?,
        Commands::Schedule(args) => schedule::schedule(&ctx, args, format).await?,
        Commands::Complete(args) => schedule::complete(&ctx, args, format).await?,
        Commands::Tasks(args) => tasks::list(&ctx, args, format).await?,
        Commands::Sweep => tasks::sweep(&ctx, format).await?,
        Commands::Cancel(args) => schedule::cancel(&ctx, args, format).await?,
        Commands::Capacity(args) => capacity::capacity(&ctx, args, format).await?,
        Commands::Forecast(args) => capacity::forecast(&ctx, args, format).await?,
    }

    Ok(())
}

/// Logs go to stderr, filtered by `MG_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env("MG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
