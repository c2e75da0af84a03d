// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production task state machine
//!
//! A production task is one stage of growing an order line's trays.
//! Tasks move `Pending -> Ready -> Done`; `Done` is terminal. Completing a
//! task yields the effects that derive its dependent work (stage expansion
//! after SEED, packing after HARVEST, capacity release after PACK).

use crate::effect::Effect;
use crate::event::Event;
use crate::reservation::{ReservationId, ReservationStatus};
use crate::stage::{Stage, TaskType};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

/// The order or subscription a task was scheduled for
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerRef {
    Order(String),
    Subscription(String),
}

impl OwnerRef {
    pub fn order(id: impl Into<String>) -> Self {
        OwnerRef::Order(id.into())
    }

    pub fn subscription(id: impl Into<String>) -> Self {
        OwnerRef::Subscription(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            OwnerRef::Order(id) | OwnerRef::Subscription(id) => id,
        }
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerRef::Order(id) => write!(f, "order:{}", id),
            OwnerRef::Subscription(id) => write!(f, "subscription:{}", id),
        }
    }
}

impl std::str::FromStr for OwnerRef {
    type Err = String;

    /// Accepts `order:<id>`, `subscription:<id>`, or a bare order id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("order", id)) if !id.is_empty() => Ok(OwnerRef::order(id)),
            Some(("subscription", id)) if !id.is_empty() => Ok(OwnerRef::subscription(id)),
            Some((kind, _)) => Err(format!("unknown owner kind: {}", kind)),
            None if !s.is_empty() => Ok(OwnerRef::order(s)),
            None => Err("owner id is empty".to_string()),
        }
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Scheduled but not yet actionable
    Pending,
    /// Due now, awaiting operator action
    Ready,
    /// Terminal
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Ready => "READY",
            TaskStatus::Done => "DONE",
        })
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "ready" => Ok(TaskStatus::Ready),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Operator queue ordering hint. Sorts most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority for a stage due at `run_at`, judged at `now`
    pub fn for_stage(kind: TaskType, run_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days_until = days_until_ceil(run_at, now);
        match kind {
            TaskType::Harvest | TaskType::Pack => match days_until {
                d if d <= 1 => Priority::Urgent,
                d if d <= 3 => Priority::High,
                _ => Priority::Medium,
            },
            TaskType::Seed => match days_until {
                d if d <= 0 => Priority::Urgent,
                d if d <= 2 => Priority::High,
                _ => Priority::Medium,
            },
            TaskType::Germinate | TaskType::Light => match days_until {
                d if d <= 0 => Priority::Urgent,
                d if d <= 2 => Priority::High,
                d if d <= 5 => Priority::Medium,
                _ => Priority::Low,
            },
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Priority::Urgent => "URGENT",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        })
    }
}

/// Whole days from `now` until `at`, rounded up
fn days_until_ceil(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (at - now).num_seconds();
    let whole = secs.div_euclid(86_400);
    if secs.rem_euclid(86_400) > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Uniqueness key: one task per stage type per order line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub owner: OwnerRef,
    pub product_id: String,
    pub kind: TaskType,
}

/// Events that can change task state
#[derive(Clone, Debug)]
pub enum TaskEvent {
    /// Time-based sweep found the task due
    Promote { at: DateTime<Utc> },
    /// Operator marked the work done
    Complete { notes: String, at: DateTime<Utc> },
}

/// One stage of production for an order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionTask {
    pub id: TaskId,
    pub owner: OwnerRef,
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub run_at: DateTime<Utc>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Trays covered by this task
    pub quantity: u32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProductionTask {
    /// Materialize a template stage relative to the sow instant.
    ///
    /// Same-day stages (`offset_days == 0`) are born READY, later ones PENDING.
    #[allow(clippy::too_many_arguments)]
    pub fn for_stage(
        id: TaskId,
        owner: OwnerRef,
        product_id: impl Into<String>,
        stage: &Stage,
        sow: DateTime<Utc>,
        quantity: u32,
        priority: Priority,
        now: DateTime<Utc>,
    ) -> Self {
        let status = if stage.offset_days == 0 {
            TaskStatus::Ready
        } else {
            TaskStatus::Pending
        };
        ProductionTask {
            id,
            owner,
            product_id: product_id.into(),
            kind: stage.kind,
            run_at: sow + Duration::days(i64::from(stage.offset_days)),
            status,
            priority,
            quantity,
            notes: stage.notes.clone().unwrap_or_default(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// The PACK task derived from a completed HARVEST, actionable immediately
    pub fn pack_after(harvest: &ProductionTask, id: TaskId, now: DateTime<Utc>) -> Self {
        ProductionTask {
            id,
            owner: harvest.owner.clone(),
            product_id: harvest.product_id.clone(),
            kind: TaskType::Pack,
            run_at: now,
            status: TaskStatus::Ready,
            priority: harvest.priority,
            quantity: harvest.quantity,
            notes: "Auto-created after harvest completion".to_string(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn key(&self) -> TaskKey {
        TaskKey {
            owner: self.owner.clone(),
            product_id: self.product_id.clone(),
            kind: self.kind,
        }
    }

    /// Reservation holding rack space for this task's order line
    pub fn reservation_id(&self) -> ReservationId {
        ReservationId::for_line(&self.owner, &self.product_id)
    }

    /// Promotion predicate used by the time-based sweep
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.run_at <= now
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Pure transition function - returns new state and effects
    pub fn transition(&self, event: TaskEvent) -> (ProductionTask, Vec<Effect>) {
        match (self.status, event) {
            // Pending → Ready
            (TaskStatus::Pending, TaskEvent::Promote { at }) => {
                let task = ProductionTask {
                    status: TaskStatus::Ready,
                    updated_at: at,
                    ..self.clone()
                };
                let effects = vec![Effect::Emit(Event::TaskReady {
                    task_id: self.id.clone(),
                    kind: self.kind,
                    run_at: self.run_at,
                })];
                (task, effects)
            }

            // Pending/Ready → Done (Pending is a force-complete)
            (TaskStatus::Pending | TaskStatus::Ready, TaskEvent::Complete { notes, at }) => {
                let task = ProductionTask {
                    status: TaskStatus::Done,
                    notes: if notes.is_empty() {
                        self.notes.clone()
                    } else {
                        notes
                    },
                    updated_at: at,
                    completed_at: Some(at),
                    ..self.clone()
                };

                let mut effects = vec![Effect::Emit(Event::TaskCompleted {
                    task_id: self.id.clone(),
                    owner: self.owner.clone(),
                    product_id: self.product_id.clone(),
                    kind: self.kind,
                })];
                match self.kind {
                    TaskType::Seed => {
                        effects.push(Effect::MarkInProgress {
                            reservation: self.reservation_id(),
                        });
                        effects.push(Effect::ExpandStages { seed: task.clone() });
                    }
                    TaskType::Harvest => {
                        effects.push(Effect::CreatePack {
                            harvest: task.clone(),
                        });
                    }
                    TaskType::Pack => {
                        effects.push(Effect::ReleaseCapacity {
                            reservation: self.reservation_id(),
                            status: ReservationStatus::Fulfilled,
                        });
                    }
                    TaskType::Germinate | TaskType::Light => {}
                }
                (task, effects)
            }

            // Done is terminal; Ready ignores promotion
            _ => (self.clone(), vec![]),
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
