// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use chrono::NaiveDate;
use mg_core::{
    GrowWindow, Operation, OwnerRef, ProductionTask, RackId, Reservation, ReservationId, TaskEvent,
    TaskId, TaskKey,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Tasks, reservations and the per-day capacity ledger
#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    pub tasks: HashMap<TaskId, ProductionTask>,
    task_keys: HashMap<TaskKey, TaskId>,
    pub reservations: BTreeMap<ReservationId, Reservation>,
    /// Slots held per rack per day by live reservations
    ledger: BTreeMap<(RackId, NaiveDate), u32>,
    cancelled: HashSet<OwnerRef>,
}

impl MaterializedState {
    /// Get a task by ID or unique prefix (like git commit hashes)
    pub fn get_task(&self, id: &str) -> Option<&ProductionTask> {
        if let Some(task) = self.tasks.get(&TaskId::from(id)) {
            return Some(task);
        }

        let matches: Vec<_> = self
            .tasks
            .iter()
            .filter(|(k, _)| k.0.starts_with(id))
            .collect();

        // Only return if exactly one match (unambiguous)
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    /// The task occupying a uniqueness key, if any
    pub fn task_for(&self, key: &TaskKey) -> Option<&ProductionTask> {
        self.task_keys.get(key).and_then(|id| self.tasks.get(id))
    }

    pub fn is_cancelled(&self, owner: &OwnerRef) -> bool {
        self.cancelled.contains(owner)
    }

    /// Highest single-day usage of `rack` across `window`
    pub fn peak_usage(&self, rack: &RackId, window: &GrowWindow) -> u32 {
        self.ledger
            .range((rack.clone(), window.start)..=(rack.clone(), window.end))
            .map(|(_, slots)| *slots)
            .max()
            .unwrap_or(0)
    }

    pub fn reservations_for<'a>(
        &'a self,
        owner: &'a OwnerRef,
    ) -> impl Iterator<Item = &'a Reservation> + 'a {
        self.reservations.values().filter(move |r| &r.owner == owner)
    }

    /// Apply an operation to update the state.
    ///
    /// Operations that would break an invariant (duplicate key, illegal
    /// status move) are ignored so replay stays idempotent.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::TaskCreate { task } => {
                let key = task.key();
                if self.task_keys.contains_key(&key) || self.tasks.contains_key(&task.id) {
                    return;
                }
                self.task_keys.insert(key, task.id.clone());
                self.tasks.insert(task.id.clone(), task.clone());
            }

            Operation::TaskPromote { id, at } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    // Effects were executed when the operation was first recorded
                    let (next, _) = task.transition(TaskEvent::Promote { at: *at });
                    *task = next;
                }
            }

            Operation::TaskComplete { id, notes, at } => {
                if let Some(task) = self.tasks.get_mut(id) {
                    let (next, _) = task.transition(TaskEvent::Complete {
                        notes: notes.clone(),
                        at: *at,
                    });
                    *task = next;
                }
            }

            Operation::ReservationCreate { reservation } => {
                if self.reservations.contains_key(&reservation.id) {
                    return;
                }
                if reservation.is_active() {
                    self.charge(&reservation.rack, &reservation.window, reservation.slots);
                }
                self.reservations
                    .insert(reservation.id.clone(), reservation.clone());
            }

            Operation::ReservationStatus { id, status, at } => {
                let Some(current) = self.reservations.get(id) else {
                    return;
                };
                let Some(next) = current.with_status(*status, *at) else {
                    return;
                };
                if current.is_active() && !next.is_active() {
                    let (rack, window, slots) = (next.rack.clone(), next.window, next.slots);
                    self.refund(&rack, &window, slots);
                }
                self.reservations.insert(id.clone(), next);
            }

            Operation::OwnerCancel { owner, .. } => {
                self.cancelled.insert(owner.clone());
            }
        }
    }

    fn charge(&mut self, rack: &RackId, window: &GrowWindow, slots: u32) {
        for day in window.days() {
            *self.ledger.entry((rack.clone(), day)).or_insert(0) += slots;
        }
    }

    fn refund(&mut self, rack: &RackId, window: &GrowWindow, slots: u32) {
        for day in window.days() {
            let key = (rack.clone(), day);
            if let Some(held) = self.ledger.get_mut(&key) {
                *held = held.saturating_sub(slots);
                if *held == 0 {
                    self.ledger.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
