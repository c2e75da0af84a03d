// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task listing and the promotion sweep

use crate::context::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Args;
use mg_core::{OwnerRef, ProductionTask, TaskStatus, TaskType};
use mg_storage::TaskFilter;
use serde::Serialize;
use std::fmt;

pub fn task_header() -> String {
    format!(
        "{:<9} {:<10} {:<12} {:<18} {:>3}  {:<16}  {:<8} PRIORITY",
        "ID", "TYPE", "PRODUCT", "OWNER", "QTY", "RUN AT", "STATUS"
    )
}

#[derive(Args)]
pub struct TasksArgs {
    /// Only tasks in this status (pending, ready, done)
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Only tasks for this owner (`order:<id>`, `subscription:<id>`, or an order id)
    #[arg(long)]
    owner: Option<OwnerRef>,

    /// Only tasks of this stage type
    #[arg(long = "type")]
    kind: Option<TaskType>,

    /// Earliest run date (inclusive)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Latest run date (inclusive)
    #[arg(long)]
    until: Option<NaiveDate>,
}

/// A task as shown in tables
#[derive(Serialize)]
pub struct TaskRow {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub product_id: String,
    pub owner: String,
    pub quantity: u32,
    pub run_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl From<&ProductionTask> for TaskRow {
    fn from(task: &ProductionTask) -> Self {
        TaskRow {
            id: task.id.to_string(),
            kind: task.kind,
            product_id: task.product_id.clone(),
            owner: task.owner.to_string(),
            quantity: task.quantity,
            run_at: task.run_at,
            status: task.status,
            priority: task.priority.to_string(),
            notes: task.notes.clone(),
        }
    }
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<9} {:<10} {:<12} {:<18} {:>3}  {:<16}  {:<8} {}",
            output::short(&self.id, 8),
            self.kind.as_str(),
            output::short(&self.product_id, 12),
            output::short(&self.owner, 18),
            self.quantity,
            self.run_at.format("%Y-%m-%d %H:%M"),
            self.status.to_string(),
            self.priority
        )
    }
}

pub fn rows(tasks: &[ProductionTask]) -> Vec<TaskRow> {
    tasks.iter().map(TaskRow::from).collect()
}

pub async fn list(ctx: &Context, args: TasksArgs, format: OutputFormat) -> Result<()> {
    let filter = TaskFilter {
        status: args.status,
        owner: args.owner,
        kind: args.kind,
        from: args.from.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
        until: args
            .until
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|t| t.and_utc()),
    };
    let scheduler = ctx.scheduler()?;
    let tasks = scheduler.list_tasks(&filter).await?;
    output::print_table(&task_header(), &rows(&tasks), "No tasks", format);
    Ok(())
}

#[derive(Serialize)]
struct SweepRows {
    promoted: Vec<TaskRow>,
    overdue: Vec<TaskRow>,
}

impl fmt::Display for SweepRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Promoted {} task(s), {} overdue",
            self.promoted.len(),
            self.overdue.len()
        )?;
        for (label, rows) in [("Promoted", &self.promoted), ("Overdue", &self.overdue)] {
            if rows.is_empty() {
                continue;
            }
            write!(f, "\n\n{}:\n{}", label, task_header())?;
            for row in rows {
                write!(f, "\n{}", row)?;
            }
        }
        Ok(())
    }
}

pub async fn sweep(ctx: &Context, format: OutputFormat) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let report = scheduler.sweep().await?;
    output::print(
        &SweepRows {
            promoted: rows(&report.promoted),
            overdue: rows(&report.overdue),
        },
        format,
    );
    Ok(())
}
