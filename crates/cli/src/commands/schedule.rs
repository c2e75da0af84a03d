// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduling, completion and cancellation

use super::tasks::{task_header, TaskRow};
use crate::context::{Context, LineArg};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use mg_core::{OwnerRef, ReservationId};
use mg_engine::{CompleteOutcome, LineItem};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Order the lines belong to
    #[arg(long, required_unless_present = "subscription", conflicts_with = "subscription")]
    order: Option<String>,

    /// Subscription cycle the lines belong to
    #[arg(long)]
    subscription: Option<String>,

    /// Delivery date (YYYY-MM-DD)
    #[arg(long)]
    delivery: NaiveDate,

    /// Order lines as `product[:qty]`
    #[arg(required = true)]
    lines: Vec<LineArg>,
}

#[derive(Serialize)]
struct ScheduledRow {
    #[serde(flatten)]
    task: TaskRow,
    rack: String,
    slots: u32,
}

impl fmt::Display for ScheduledRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {} x{}", self.task, self.rack, self.slots)
    }
}

pub async fn schedule(ctx: &Context, args: ScheduleArgs, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let tasks = match (&args.order, &args.subscription) {
        (_, Some(subscription)) => {
            let lines: Vec<LineItem> = args
                .lines
                .iter()
                .map(|l| LineItem::new(l.product.clone(), l.qty))
                .collect();
            scheduler
                .schedule_subscription(subscription, &lines, args.delivery)
                .await?
        }
        (order, None) => {
            let owner = OwnerRef::order(order.clone().unwrap_or_default());
            let mut tasks = Vec::new();
            for line in &args.lines {
                let scheduled = scheduler
                    .schedule_production(owner.clone(), &line.product, line.qty, args.delivery)
                    .await?;
                tasks.extend(scheduled);
            }
            tasks
        }
    };

    let mut rows = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let id = ReservationId::for_line(&task.owner, &task.product_id);
        let (rack, slots) = match scheduler.allocator().reservation(&id).await? {
            Some(r) => (r.rack.to_string(), r.slots),
            None => ("-".to_string(), 0),
        };
        rows.push(ScheduledRow {
            task: TaskRow::from(task),
            rack,
            slots,
        });
    }
    output::print_table(
        &format!("{}  RACK", task_header()),
        &rows,
        "Nothing scheduled",
        format,
    );
    Ok(())
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Task id or unique prefix
    id: String,

    /// Operator notes; replace the task's notes when given
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Serialize)]
struct Completed {
    #[serde(flatten)]
    task: TaskRow,
    already_done: bool,
}

impl fmt::Display for Completed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.already_done {
            write!(f, "Task {} is already done", self.task.id)
        } else {
            write!(
                f,
                "Completed {} task {} ({} x{})",
                self.task.kind, self.task.id, self.task.product_id, self.task.quantity
            )
        }
    }
}

pub async fn complete(ctx: &Context, args: CompleteArgs, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let outcome = scheduler.complete_task(&args.id, &args.notes).await?;
    output::print(
        &Completed {
            task: TaskRow::from(outcome.task()),
            already_done: matches!(outcome, CompleteOutcome::AlreadyDone(_)),
        },
        format,
    );
    Ok(())
}

#[derive(Args)]
pub struct CancelArgs {
    /// `order:<id>`, `subscription:<id>`, or a bare order id
    owner: OwnerRef,
}

#[derive(Serialize)]
struct Cancelled {
    owner: String,
    released: Vec<String>,
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cancelled {}; released {} reservation(s)",
            self.owner,
            self.released.len()
        )
    }
}

pub async fn cancel(ctx: &Context, args: CancelArgs, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let released = scheduler.cancel(&args.owner).await?;
    output::print(
        &Cancelled {
            owner: args.owner.to_string(),
            released: released.iter().map(|r| r.id.to_string()).collect(),
        },
        format,
    );
    Ok(())
}
