// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::EngineError;
use chrono::Duration;
use mg_adapters::{EventSink, StageResolver};
use mg_core::{
    Clock, Effect, Event, IdGen, Priority, ProductionTask, ReservationId, ReservationStatus,
};
use mg_storage::{CapacityLedger, TaskInsert, TaskStore};
use std::collections::VecDeque;
use tracing::Instrument;

/// Executes task-transition effects against the store and adapters
#[derive(Clone)]
pub struct Executor<T, R, S, C, I> {
    store: T,
    resolver: R,
    sink: S,
    clock: C,
    id_gen: I,
}

impl<T, R, S, C, I> Executor<T, R, S, C, I>
where
    T: TaskStore + CapacityLedger,
    R: StageResolver,
    S: EventSink,
    C: Clock,
    I: IdGen,
{
    pub fn new(store: T, resolver: R, sink: S, clock: C, id_gen: I) -> Self {
        Self {
            store,
            resolver,
            sink,
            clock,
            id_gen,
        }
    }

    /// Run `effects` and everything they produce, in order.
    ///
    /// Stops at the first failing effect; effects already run stay applied.
    pub async fn run(&self, effects: Vec<Effect>) -> Result<(), EngineError> {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let follow_up = self.execute(effect).await?;
            queue.extend(follow_up);
        }
        Ok(())
    }

    /// Execute a single effect with tracing
    ///
    /// Returns the effects it produced (usually events to emit).
    pub async fn execute(&self, effect: Effect) -> Result<Vec<Effect>, EngineError> {
        use mg_core::TracedEffect;

        let op_name = effect.name();
        let span = tracing::info_span!("effect", effect = op_name);
        span.in_scope(|| tracing::info!(fields = ?effect.fields(), "executing"));

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).instrument(span.clone()).await;
        let elapsed = start.elapsed();

        let _guard = span.enter();
        match &result {
            Ok(follow_up) => tracing::info!(
                elapsed_ms = elapsed.as_millis() as u64,
                follow_up = follow_up.len(),
                "completed"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "failed"
            ),
        }

        result
    }

    /// Hand an event to the sink. Delivery failures never fail the caller.
    pub async fn emit(&self, event: Event) {
        if let Err(e) = self.sink.emit(&event).await {
            tracing::warn!(event = event.name(), error = %e, "event sink failed");
        }
    }

    async fn execute_inner(&self, effect: Effect) -> Result<Vec<Effect>, EngineError> {
        match effect {
            Effect::Emit(event) => {
                self.emit(event).await;
                Ok(vec![])
            }

            Effect::ExpandStages { seed } => self.expand_stages(&seed).await,

            Effect::CreatePack { harvest } => {
                let now = self.clock.now();
                let pack = ProductionTask::pack_after(&harvest, self.id_gen.next_task_id(), now);
                match self.store.insert_if_absent(pack).await? {
                    TaskInsert::Inserted(pack) => {
                        tracing::info!(task_id = %pack.id, harvest = %harvest.id, "pack task created");
                        Ok(vec![Effect::Emit(task_created(&pack))])
                    }
                    TaskInsert::Existing(existing) => {
                        tracing::debug!(task_id = %existing.id, "pack task already exists");
                        Ok(vec![])
                    }
                    TaskInsert::OwnerCancelled(pack) => {
                        tracing::info!(owner = %pack.owner, harvest = %harvest.id, "owner cancelled, no pack task");
                        Ok(vec![])
                    }
                }
            }

            Effect::MarkInProgress { reservation } => {
                self.move_reservation(&reservation, ReservationStatus::InProgress)
                    .await?;
                Ok(vec![])
            }

            Effect::ReleaseCapacity {
                reservation,
                status,
            } => Ok(self
                .move_reservation(&reservation, status)
                .await?
                .into_iter()
                .collect()),
        }
    }

    /// Materialize every non-SEED stage, anchored at the seed's completion
    async fn expand_stages(&self, seed: &ProductionTask) -> Result<Vec<Effect>, EngineError> {
        let spec = match self.resolver.resolve(&seed.product_id).await {
            Ok(spec) => spec,
            Err(source) => {
                tracing::error!(
                    task_id = %seed.id,
                    owner = %seed.owner,
                    product_id = %seed.product_id,
                    error = %source,
                    "seed done but stage template unavailable, needs manual remediation"
                );
                self.emit(Event::StageExpansionFailed {
                    seed_id: seed.id.clone(),
                    product_id: seed.product_id.clone(),
                    reason: source.to_string(),
                })
                .await;
                return Err(EngineError::DataIntegrity {
                    task: seed.id.clone(),
                    source,
                });
            }
        };

        let now = self.clock.now();
        let sow = seed.completed_at.unwrap_or(seed.updated_at);
        let tasks: Vec<ProductionTask> = spec
            .stages
            .dependents()
            .map(|stage| {
                let run_at = sow + Duration::days(i64::from(stage.offset_days));
                ProductionTask::for_stage(
                    self.id_gen.next_task_id(),
                    seed.owner.clone(),
                    &seed.product_id,
                    stage,
                    sow,
                    seed.quantity,
                    Priority::for_stage(stage.kind, run_at, now),
                    now,
                )
            })
            .collect();

        let created = self.store.insert_all_absent(tasks).await?;
        if created.is_empty() {
            tracing::debug!(task_id = %seed.id, "stages already expanded");
            return Ok(vec![]);
        }
        tracing::info!(task_id = %seed.id, created = created.len(), "stages expanded");

        let mut effects: Vec<Effect> = created
            .iter()
            .map(|task| Effect::Emit(task_created(task)))
            .collect();
        effects.push(Effect::Emit(Event::StagesExpanded {
            seed_id: seed.id.clone(),
            created: created.into_iter().map(|t| t.id).collect(),
        }));
        Ok(effects)
    }

    /// Returns the release event when the move ended the reservation
    async fn move_reservation(
        &self,
        id: &ReservationId,
        status: ReservationStatus,
    ) -> Result<Option<Effect>, EngineError> {
        let Some(reservation) = self.store.set_status(id, status, self.clock.now()).await? else {
            tracing::debug!(reservation = %id, %status, "reservation missing or already moved");
            return Ok(None);
        };
        tracing::info!(reservation = %id, rack = %reservation.rack, %status, "reservation updated");
        Ok((!status.is_active()).then(|| {
            Effect::Emit(Event::CapacityReleased {
                reservation_id: reservation.id.clone(),
                rack: reservation.rack.clone(),
                slots: reservation.slots,
                status,
            })
        }))
    }
}

pub(crate) fn task_created(task: &ProductionTask) -> Event {
    Event::TaskCreated {
        task_id: task.id.clone(),
        owner: task.owner.clone(),
        product_id: task.product_id.clone(),
        kind: task.kind,
        run_at: task.run_at,
        status: task.status,
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
