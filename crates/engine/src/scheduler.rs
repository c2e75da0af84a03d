// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task scheduler: the engine's boundary operations

use crate::allocator::{Allocation, CapacityAllocator};
use crate::executor::{task_created, Executor};
use crate::EngineError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mg_adapters::{EventSink, StageResolver};
use mg_core::{
    Clock, Effect, Event, IdGen, LeadTimePolicy, OwnerRef, Priority, ProductionTask, RackLayout,
    Reservation, SweepConfig, TaskStatus,
};
use mg_storage::{CapacityLedger, Completion, TaskFilter, TaskInsert, TaskStore};

/// Engine adapter dependencies
pub struct EngineDeps<T, R, S> {
    pub store: T,
    pub resolver: R,
    pub sink: S,
}

/// Static engine configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    pub layout: RackLayout,
    pub lead_times: LeadTimePolicy,
    pub sweep: SweepConfig,
}

/// One line of a subscription cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed(ProductionTask),
    /// Nothing changed; the task was done before this call
    AlreadyDone(ProductionTask),
}

impl CompleteOutcome {
    pub fn task(&self) -> &ProductionTask {
        match self {
            CompleteOutcome::Completed(t) | CompleteOutcome::AlreadyDone(t) => t,
        }
    }
}

/// What one promotion sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub promoted: Vec<ProductionTask>,
    pub overdue: Vec<ProductionTask>,
}

/// Schedules production runs and drives tasks through their lifecycle
pub struct TaskScheduler<T, R, S, C: Clock, I: IdGen> {
    store: T,
    resolver: R,
    executor: Executor<T, R, S, C, I>,
    allocator: CapacityAllocator<T>,
    lead_times: LeadTimePolicy,
    sweep: SweepConfig,
    clock: C,
    id_gen: I,
}

impl<T, R, S, C, I> TaskScheduler<T, R, S, C, I>
where
    T: TaskStore + CapacityLedger,
    R: StageResolver,
    S: EventSink,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: EngineDeps<T, R, S>, config: SchedulerConfig, clock: C, id_gen: I) -> Self {
        let executor = Executor::new(
            deps.store.clone(),
            deps.resolver.clone(),
            deps.sink,
            clock.clone(),
            id_gen.clone(),
        );
        Self {
            allocator: CapacityAllocator::new(
                deps.store.clone(),
                config.layout,
                config.lead_times.clone(),
            ),
            store: deps.store,
            resolver: deps.resolver,
            executor,
            lead_times: config.lead_times,
            sweep: config.sweep,
            clock,
            id_gen,
        }
    }

    pub fn allocator(&self) -> &CapacityAllocator<T> {
        &self.allocator
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Reserve capacity for one order line and create its SEED task.
    ///
    /// Scheduling the same line twice returns the existing SEED task.
    pub async fn schedule_production(
        &self,
        owner: OwnerRef,
        product_id: &str,
        quantity: u32,
        delivery: NaiveDate,
    ) -> Result<Vec<ProductionTask>, EngineError> {
        if quantity == 0 {
            return Err(mg_core::CapacityError::InvalidQuantity { quantity }.into());
        }
        if self.store.is_cancelled(&owner).await? {
            return Err(EngineError::OwnerCancelled(owner));
        }
        let spec = self.resolver.resolve(product_id).await?;
        let lead_time_days = spec.lead_time(&self.lead_times)?;
        let window = mg_core::GrowWindow::ending(delivery, lead_time_days);

        let now = self.clock.now();
        let today = self.clock.today();
        if window.start < today {
            return Err(EngineError::DeliveryTooSoon {
                product_id: product_id.to_string(),
                delivery,
                lead_time_days,
                days_until: (delivery - today).num_days(),
            });
        }

        let allocation = match self
            .allocator
            .reserve(&owner, product_id, spec.tray_size, quantity, window, now)
            .await
        {
            Ok(allocation) => allocation,
            Err(EngineError::CapacityExhausted {
                tray,
                quantity,
                reason,
            }) => {
                self.executor
                    .emit(Event::CapacityDenied {
                        owner: owner.clone(),
                        product_id: product_id.to_string(),
                        tray,
                        quantity,
                        reason: reason.clone(),
                    })
                    .await;
                return Err(EngineError::CapacityExhausted {
                    tray,
                    quantity,
                    reason,
                });
            }
            Err(e) => return Err(e),
        };
        let mut effects = Vec::new();
        if let Allocation::New(r) = &allocation {
            effects.push(Effect::Emit(Event::CapacityReserved {
                reservation_id: r.id.clone(),
                rack: r.rack.clone(),
                slots: r.slots,
            }));
        }

        let sow = start_of_day(window.start);
        let stage = spec.stages.seed();
        let run_at = sow + chrono::Duration::days(i64::from(stage.offset_days));
        let seed = ProductionTask::for_stage(
            self.id_gen.next_task_id(),
            owner,
            product_id,
            stage,
            sow,
            quantity,
            Priority::for_stage(stage.kind, run_at, now),
            now,
        );
        let seed = match self.store.insert_if_absent(seed).await? {
            TaskInsert::Inserted(seed) => {
                tracing::info!(
                    task_id = %seed.id,
                    owner = %seed.owner,
                    product_id,
                    run_at = %seed.run_at,
                    "production scheduled"
                );
                effects.push(Effect::Emit(task_created(&seed)));
                seed
            }
            TaskInsert::Existing(seed) => seed,
            TaskInsert::OwnerCancelled(seed) => {
                tracing::info!(owner = %seed.owner, product_id, "owner cancelled while scheduling");
                return Err(EngineError::OwnerCancelled(seed.owner));
            }
        };
        self.executor.run(effects).await?;
        Ok(vec![seed])
    }

    /// Schedule every line of one subscription cycle for `delivery`.
    ///
    /// Lines are scheduled in order; a failing line stops the cycle and lines
    /// already scheduled keep their reservations.
    pub async fn schedule_subscription(
        &self,
        subscription_id: &str,
        lines: &[LineItem],
        delivery: NaiveDate,
    ) -> Result<Vec<ProductionTask>, EngineError> {
        let owner = OwnerRef::subscription(subscription_id);
        let mut tasks = Vec::with_capacity(lines.len());
        for line in lines {
            let scheduled = self
                .schedule_production(owner.clone(), &line.product_id, line.quantity, delivery)
                .await?;
            tasks.extend(scheduled);
        }
        Ok(tasks)
    }

    /// Mark a task done and derive its dependents.
    ///
    /// Completing a done task is a no-op. If SEED expansion fails the SEED
    /// stays done and the error is returned.
    pub async fn complete_task(
        &self,
        id: &str,
        notes: &str,
    ) -> Result<CompleteOutcome, EngineError> {
        let task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| EngineError::TaskNotFound(id.to_string()))?;

        match self.store.complete(&task.id, notes, self.clock.now()).await? {
            Completion::NotFound => Err(EngineError::TaskNotFound(id.to_string())),
            Completion::AlreadyDone(task) => {
                tracing::debug!(task_id = %task.id, "task already done");
                Ok(CompleteOutcome::AlreadyDone(task))
            }
            Completion::Completed { task, effects } => {
                tracing::info!(task_id = %task.id, kind = %task.kind, "task completed");
                self.executor.run(effects).await?;
                Ok(CompleteOutcome::Completed(task))
            }
        }
    }

    /// Promote due PENDING tasks and report READY tasks left too long
    pub async fn sweep(&self) -> Result<SweepReport, EngineError> {
        let now = self.clock.now();
        let cutoff = now
            .checked_add_signed(to_chrono(self.sweep.lookahead))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let promoted = self.store.promote_due(cutoff, now).await?;
        let mut report = SweepReport::default();
        let mut effects = Vec::new();
        for (task, task_effects) in promoted {
            effects.extend(task_effects);
            report.promoted.push(task);
        }

        let overdue_before = now
            .checked_sub_signed(to_chrono(self.sweep.overdue_after))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let ready = self
            .store
            .list(&TaskFilter {
                status: Some(TaskStatus::Ready),
                until: Some(overdue_before),
                ..TaskFilter::default()
            })
            .await?;
        for task in ready {
            if task.run_at >= overdue_before || self.store.is_cancelled(&task.owner).await? {
                continue;
            }
            effects.push(Effect::Emit(Event::TaskOverdue {
                task_id: task.id.clone(),
                kind: task.kind,
                run_at: task.run_at,
            }));
            report.overdue.push(task);
        }

        if !report.promoted.is_empty() || !report.overdue.is_empty() {
            tracing::info!(
                promoted = report.promoted.len(),
                overdue = report.overdue.len(),
                "sweep finished"
            );
        }
        self.executor.run(effects).await?;
        Ok(report)
    }

    /// Cancel an owner and release every reservation it holds. Idempotent.
    pub async fn cancel(&self, owner: &OwnerRef) -> Result<Vec<Reservation>, EngineError> {
        let released = self.store.cancel_owner(owner, self.clock.now()).await?;
        tracing::info!(%owner, released = released.len(), "owner cancelled");

        let mut effects: Vec<Effect> = released
            .iter()
            .map(|r| {
                Effect::Emit(Event::CapacityReleased {
                    reservation_id: r.id.clone(),
                    rack: r.rack.clone(),
                    slots: r.slots,
                    status: r.status,
                })
            })
            .collect();
        effects.push(Effect::Emit(Event::OwnerCancelled {
            owner: owner.clone(),
            released: released.iter().map(|r| r.id.clone()).collect(),
        }));
        self.executor.run(effects).await?;
        Ok(released)
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<ProductionTask>, EngineError> {
        Ok(self.store.list(filter).await?)
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
