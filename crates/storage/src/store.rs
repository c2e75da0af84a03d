// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task store and capacity ledger
//!
//! Both are check-then-act surfaces. `Store` runs the check, the WAL append
//! and the state update in one critical section, which makes
//! `insert_if_absent` and `reserve_within` atomic with respect to every
//! other caller sharing the store. A durable store also holds an exclusive
//! lock on `<dir>/lock` for its whole lifetime, so a second process opening
//! the same directory waits and then replays everything the first appended.

use crate::{MaterializedState, Wal, WalError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use mg_core::{
    Effect, GrowWindow, Operation, OwnerRef, ProductionTask, RackId, Reservation, ReservationId,
    ReservationStatus, TaskEvent, TaskId, TaskStatus, TaskType,
};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    #[error("Failed to acquire state lock: {0}")]
    LockFailed(#[source] std::io::Error),
}

/// Result of an insert keyed on `(owner, product, type)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInsert {
    Inserted(ProductionTask),
    /// Another task already holds the key; it is returned unchanged
    Existing(ProductionTask),
    /// The owner was cancelled; the task was not written
    OwnerCancelled(ProductionTask),
}

impl TaskInsert {
    pub fn task(&self) -> &ProductionTask {
        match self {
            TaskInsert::Inserted(t) | TaskInsert::Existing(t) | TaskInsert::OwnerCancelled(t) => t,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, TaskInsert::Inserted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// This call moved the task to DONE; effects are for the caller to run
    Completed {
        task: ProductionTask,
        effects: Vec<Effect>,
    },
    AlreadyDone(ProductionTask),
    NotFound,
}

/// A task promoted by the sweep, with the effects of its transition
pub type Promoted = (ProductionTask, Vec<Effect>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    Reserved(Reservation),
    /// A reservation with this id already exists
    Existing(Reservation),
    /// The pool cannot fit the request on at least one day of the window
    Denied { available: u32 },
    OwnerCancelled,
}

/// Task query; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub owner: Option<OwnerRef>,
    pub kind: Option<TaskType>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TaskFilter {
    pub fn matches(&self, task: &ProductionTask) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.owner.as_ref().is_none_or(|o| &task.owner == o)
            && self.kind.is_none_or(|k| task.kind == k)
            && self.from.is_none_or(|from| task.run_at >= from)
            && self.until.is_none_or(|until| task.run_at <= until)
    }
}

/// Persistence for production tasks
#[async_trait]
pub trait TaskStore: Clone + Send + Sync + 'static {
    /// Insert unless the owner is cancelled or a task already holds the
    /// same `(owner, product, type)`
    async fn insert_if_absent(&self, task: ProductionTask) -> Result<TaskInsert, StoreError>;

    /// Insert each task whose key is free, all in one critical section.
    /// Returns only the tasks this call created.
    async fn insert_all_absent(
        &self,
        tasks: Vec<ProductionTask>,
    ) -> Result<Vec<ProductionTask>, StoreError>;

    /// Look up by id or unique id prefix
    async fn get(&self, id: &str) -> Result<Option<ProductionTask>, StoreError>;

    /// Complete a task; only the first caller sees `Completed`
    async fn complete(
        &self,
        id: &TaskId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<Completion, StoreError>;

    /// Promote every PENDING task due by `cutoff` whose owner is not cancelled
    async fn promote_due(
        &self,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Promoted>, StoreError>;

    /// Matching tasks ordered by run time, then priority
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<ProductionTask>, StoreError>;
}

/// Slot accounting per rack pool and day
#[async_trait]
pub trait CapacityLedger: Clone + Send + Sync + 'static {
    /// Highest single-day usage of `rack` across `window`
    async fn peak_usage(&self, rack: &RackId, window: GrowWindow) -> Result<u32, StoreError>;

    /// Record `reservation` only if usage stays within `ceiling` on every day
    /// of its window (atomic increment-with-ceiling)
    async fn reserve_within(
        &self,
        reservation: Reservation,
        ceiling: u32,
    ) -> Result<ReserveOutcome, StoreError>;

    /// Move a reservation to `status`. `None` if missing or the move is
    /// illegal (e.g. already released), which makes release idempotent.
    async fn set_status(
        &self,
        id: &ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, StoreError>;

    async fn reservation(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError>;

    async fn reservations_for(&self, owner: &OwnerRef) -> Result<Vec<Reservation>, StoreError>;

    async fn is_cancelled(&self, owner: &OwnerRef) -> Result<bool, StoreError>;

    /// Mark the owner cancelled and cancel its live reservations.
    /// Returns the reservations released by this call.
    async fn cancel_owner(
        &self,
        owner: &OwnerRef,
        at: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, StoreError>;
}

struct Inner {
    wal: Option<Wal>,
    state: MaterializedState,
    /// Held until the last clone of the store drops
    _lock: Option<File>,
}

impl Inner {
    /// Append then apply; a failed append leaves state untouched
    fn persist(&mut self, op: Operation) -> Result<(), StoreError> {
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&op)?;
        }
        tracing::trace!(op = op.name(), "persisted");
        self.state.apply(&op);
        Ok(())
    }
}

/// WAL-backed implementation of [`TaskStore`] and [`CapacityLedger`]
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

pub const WAL_FILE: &str = "events.wal";
pub const LOCK_FILE: &str = "lock";

/// Take the directory lock, waiting for any other holder to let go
fn acquire_lock(dir: &Path) -> Result<File, StoreError> {
    let path = dir.join(LOCK_FILE);
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&path)
        .map_err(StoreError::LockFailed)?;
    if file.try_lock_exclusive().is_err() {
        tracing::info!(path = %path.display(), "state directory in use, waiting for lock");
        file.lock_exclusive().map_err(StoreError::LockFailed)?;
    }
    file.set_len(0).map_err(StoreError::LockFailed)?;
    writeln!(file, "{}", std::process::id()).map_err(StoreError::LockFailed)?;
    Ok(file)
}

impl Store {
    /// Open the store in `dir`, replaying `events.wal` if present.
    ///
    /// Blocks while another store holds the directory. Replay happens after
    /// the lock is taken.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(WalError::from)?;
        let lock = acquire_lock(dir)?;
        let path = dir.join(WAL_FILE);

        let mut state = MaterializedState::default();
        let ops = Wal::replay(&path)?;
        for op in &ops {
            state.apply(op);
        }
        tracing::debug!(path = %path.display(), operations = ops.len(), "replayed WAL");

        let wal = Wal::open(&path)?;
        Ok(Self::from_parts(Some(wal), state, Some(lock)))
    }

    /// A store without a log, for tests and dry runs
    pub fn in_memory() -> Self {
        Self::from_parts(None, MaterializedState::default(), None)
    }

    fn from_parts(wal: Option<Wal>, state: MaterializedState, lock: Option<File>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                wal,
                state,
                _lock: lock,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> MaterializedState {
        self.lock().state.clone()
    }
}

#[async_trait]
impl TaskStore for Store {
    async fn insert_if_absent(&self, task: ProductionTask) -> Result<TaskInsert, StoreError> {
        let mut inner = self.lock();
        if inner.state.is_cancelled(&task.owner) {
            return Ok(TaskInsert::OwnerCancelled(task));
        }
        if let Some(existing) = inner.state.task_for(&task.key()) {
            return Ok(TaskInsert::Existing(existing.clone()));
        }
        inner.persist(Operation::TaskCreate { task: task.clone() })?;
        Ok(TaskInsert::Inserted(task))
    }

    async fn insert_all_absent(
        &self,
        tasks: Vec<ProductionTask>,
    ) -> Result<Vec<ProductionTask>, StoreError> {
        let mut inner = self.lock();
        let mut created = Vec::new();
        for task in tasks {
            if inner.state.task_for(&task.key()).is_some() {
                continue;
            }
            inner.persist(Operation::TaskCreate { task: task.clone() })?;
            created.push(task);
        }
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<ProductionTask>, StoreError> {
        Ok(self.lock().state.get_task(id).cloned())
    }

    async fn complete(
        &self,
        id: &TaskId,
        notes: &str,
        at: DateTime<Utc>,
    ) -> Result<Completion, StoreError> {
        let mut inner = self.lock();
        let Some(task) = inner.state.tasks.get(id).cloned() else {
            return Ok(Completion::NotFound);
        };
        if task.is_done() {
            return Ok(Completion::AlreadyDone(task));
        }
        let (done, effects) = task.transition(TaskEvent::Complete {
            notes: notes.to_string(),
            at,
        });
        inner.persist(Operation::TaskComplete {
            id: id.clone(),
            notes: notes.to_string(),
            at,
        })?;
        Ok(Completion::Completed {
            task: done,
            effects,
        })
    }

    async fn promote_due(
        &self,
        cutoff: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Promoted>, StoreError> {
        let mut inner = self.lock();
        let mut due: Vec<ProductionTask> = inner
            .state
            .tasks
            .values()
            .filter(|t| t.is_due(cutoff) && !inner.state.is_cancelled(&t.owner))
            .cloned()
            .collect();
        due.sort_by(|a, b| (a.run_at, &a.id).cmp(&(b.run_at, &b.id)));

        let mut promoted = Vec::with_capacity(due.len());
        for task in due {
            let (next, effects) = task.transition(TaskEvent::Promote { at });
            inner.persist(Operation::TaskPromote {
                id: task.id.clone(),
                at,
            })?;
            promoted.push((next, effects));
        }
        Ok(promoted)
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<ProductionTask>, StoreError> {
        let inner = self.lock();
        let mut tasks: Vec<ProductionTask> = inner
            .state
            .tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            (a.run_at, a.priority, &a.id).cmp(&(b.run_at, b.priority, &b.id))
        });
        Ok(tasks)
    }
}

#[async_trait]
impl CapacityLedger for Store {
    async fn peak_usage(&self, rack: &RackId, window: GrowWindow) -> Result<u32, StoreError> {
        Ok(self.lock().state.peak_usage(rack, &window))
    }

    async fn reserve_within(
        &self,
        reservation: Reservation,
        ceiling: u32,
    ) -> Result<ReserveOutcome, StoreError> {
        let mut inner = self.lock();
        if inner.state.is_cancelled(&reservation.owner) {
            return Ok(ReserveOutcome::OwnerCancelled);
        }
        if let Some(existing) = inner.state.reservations.get(&reservation.id) {
            return Ok(ReserveOutcome::Existing(existing.clone()));
        }
        let peak = inner
            .state
            .peak_usage(&reservation.rack, &reservation.window);
        let available = ceiling.saturating_sub(peak);
        if reservation.slots > available {
            return Ok(ReserveOutcome::Denied { available });
        }
        inner.persist(Operation::ReservationCreate {
            reservation: reservation.clone(),
        })?;
        Ok(ReserveOutcome::Reserved(reservation))
    }

    async fn set_status(
        &self,
        id: &ReservationId,
        status: ReservationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Reservation>, StoreError> {
        let mut inner = self.lock();
        let Some(next) = inner
            .state
            .reservations
            .get(id)
            .and_then(|r| r.with_status(status, at))
        else {
            return Ok(None);
        };
        inner.persist(Operation::ReservationStatus {
            id: id.clone(),
            status,
            at,
        })?;
        Ok(Some(next))
    }

    async fn reservation(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        Ok(self.lock().state.reservations.get(id).cloned())
    }

    async fn reservations_for(&self, owner: &OwnerRef) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .lock()
            .state
            .reservations_for(owner)
            .cloned()
            .collect())
    }

    async fn is_cancelled(&self, owner: &OwnerRef) -> Result<bool, StoreError> {
        Ok(self.lock().state.is_cancelled(owner))
    }

    async fn cancel_owner(
        &self,
        owner: &OwnerRef,
        at: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, StoreError> {
        let mut inner = self.lock();
        if !inner.state.is_cancelled(owner) {
            inner.persist(Operation::OwnerCancel {
                owner: owner.clone(),
                at,
            })?;
        }
        let live: Vec<Reservation> = inner
            .state
            .reservations_for(owner)
            .filter_map(|r| r.with_status(ReservationStatus::Cancelled, at))
            .collect();
        for reservation in &live {
            inner.persist(Operation::ReservationStatus {
                id: reservation.id.clone(),
                status: ReservationStatus::Cancelled,
                at,
            })?;
        }
        Ok(live)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
