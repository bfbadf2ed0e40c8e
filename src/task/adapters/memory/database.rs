//! In-memory transactional store used as a test double for the task tables.
//!
//! Each transaction works on a private copy of the tables. Read-write
//! transactions run one at a time. Serializable transactions run
//! concurrently and are checked at commit: if anything committed a write
//! since they began, the later one aborts with a serialization failure
//! (first committer wins), which is at least as strict as a real
//! serializable isolation level.

use super::{InMemoryTaskCheckRunStore, InMemoryTaskRows, InMemoryTaskRunStore};
use crate::task::{
    domain::{
        PrincipalId, Task, TaskCheckRun, TaskCheckRunId, TaskCheckRunStatus, TaskId, TaskPayload,
        TaskRun, TaskRunId,
    },
    error::{StorageError, TaskError, TaskResult},
    ports::{TransactionMode, TransactionRunner},
    services::{TaskService, TaskStores},
};
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Store operation at which an armed fault fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// Inserting a task row.
    InsertTask,
    /// Patching task metadata.
    UpdateTask,
    /// Writing a task's status.
    UpdateTaskStatus,
    /// Inserting a task run.
    CreateTaskRun,
    /// Patching a task run's status.
    PatchTaskRunStatus,
    /// Committing a transaction that wrote something.
    Commit,
}

/// Table contents, copied into each transaction.
#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    pub(super) tasks: BTreeMap<TaskId, Task>,
    pub(super) task_runs: BTreeMap<TaskRunId, TaskRun>,
    pub(super) task_check_runs: BTreeMap<TaskCheckRunId, TaskCheckRun>,
    task_seq: i64,
    task_run_seq: i64,
    task_check_run_seq: i64,
}

impl Tables {
    pub(super) const fn next_task_id(&mut self) -> TaskId {
        self.task_seq += 1;
        TaskId::new(self.task_seq)
    }

    pub(super) const fn next_task_run_id(&mut self) -> TaskRunId {
        self.task_run_seq += 1;
        TaskRunId::new(self.task_run_seq)
    }

    const fn next_task_check_run_id(&mut self) -> TaskCheckRunId {
        self.task_check_run_seq += 1;
        TaskCheckRunId::new(self.task_check_run_seq)
    }
}

#[derive(Debug, Default)]
struct DatabaseState {
    tables: Tables,
    version: u64,
    faults: Vec<FaultPoint>,
}

/// Open transaction on an [`InMemoryDatabase`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    tables: Tables,
    mode: TransactionMode,
    now: DateTime<Utc>,
    dirty: bool,
    faults: Vec<FaultPoint>,
}

impl InMemoryTransaction {
    pub(super) const fn tables(&self) -> &Tables {
        &self.tables
    }

    pub(super) fn tables_mut(&mut self) -> TaskResult<&mut Tables> {
        if self.mode == TransactionMode::Snapshot {
            return Err(TaskError::Storage(StorageError::ReadOnlyTransaction));
        }
        self.dirty = true;
        Ok(&mut self.tables)
    }

    /// Transaction start time, used for every timestamp written.
    pub(super) const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Fails if a fault is armed at `point`, disarming it.
    pub(super) fn trip(&mut self, point: FaultPoint) -> TaskResult<()> {
        let Some(position) = self.faults.iter().position(|armed| *armed == point) else {
            return Ok(());
        };
        self.faults.remove(position);
        Err(TaskError::Storage(StorageError::InjectedFault(format!(
            "{point:?}"
        ))))
    }
}

/// Shared in-memory database. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<DatabaseState>>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the in-memory store ports.
    #[must_use]
    pub fn stores(&self) -> TaskStores<InMemoryTransaction> {
        TaskStores::new(
            Arc::new(InMemoryTaskRows),
            Arc::new(InMemoryTaskRunStore),
            Arc::new(InMemoryTaskCheckRunStore),
        )
    }

    /// Builds a task service backed by this database.
    #[must_use]
    pub fn task_service<C>(&self, clock: Arc<C>) -> TaskService<Self, C>
    where
        C: Clock + Send + Sync + 'static,
    {
        TaskService::new(Arc::new(self.clone()), self.stores(), clock)
    }

    /// Arms a fault that fails the next store call reaching `point`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database lock is poisoned.
    pub fn arm_fault(&self, point: FaultPoint) -> TaskResult<()> {
        self.lock()?.faults.push(point);
        Ok(())
    }

    /// Records a check run as the external checker would.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] when the task does not exist.
    pub fn record_task_check_run(
        &self,
        task_id: TaskId,
        creator_id: PrincipalId,
        status: TaskCheckRunStatus,
        check_type: impl Into<String>,
    ) -> TaskResult<TaskCheckRun> {
        let kind = check_type.into();
        self.run_in_transaction(TransactionMode::ReadWrite, move |tx| {
            let now = tx.now();
            let tables = tx.tables_mut()?;
            if !tables.tasks.contains_key(&task_id) {
                return Err(TaskError::task_not_found(task_id));
            }
            let check = TaskCheckRun {
                id: tables.next_task_check_run_id(),
                creator_id,
                created_ts: now,
                updater_id: creator_id,
                updated_ts: now,
                task_id,
                status,
                check_type: kind,
                code: 0,
                comment: String::new(),
                result: Value::Object(Map::new()),
                payload: TaskPayload::empty(),
            };
            tables.task_check_runs.insert(check.id, check.clone());
            Ok(check)
        })
    }

    /// Returns every committed task run, across all tasks.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database lock is poisoned.
    pub fn committed_task_runs(&self) -> TaskResult<Vec<TaskRun>> {
        Ok(self.lock()?.tables.task_runs.values().cloned().collect())
    }

    fn lock(&self) -> TaskResult<MutexGuard<'_, DatabaseState>> {
        self.state
            .lock()
            .map_err(|err| TaskError::Storage(StorageError::Connection(err.to_string())))
    }

    fn run_exclusive<T, F>(&self, f: F) -> TaskResult<T>
    where
        F: FnOnce(&mut InMemoryTransaction) -> TaskResult<T>,
    {
        let mut state = self.lock()?;
        let mut tx = begin(&mut state, TransactionMode::ReadWrite);
        let result = f(&mut tx);
        finish(&mut state, tx, result)
    }

    fn run_optimistic<T, F>(&self, mode: TransactionMode, f: F) -> TaskResult<T>
    where
        F: FnOnce(&mut InMemoryTransaction) -> TaskResult<T>,
    {
        let (mut tx, base_version) = {
            let mut state = self.lock()?;
            let base_version = state.version;
            (begin(&mut state, mode), base_version)
        };
        let result = f(&mut tx);

        let mut state = self.lock()?;
        if result.is_ok() && tx.dirty && state.version != base_version {
            state.faults.append(&mut tx.faults);
            return Err(TaskError::Storage(StorageError::SerializationFailure(
                "could not serialize access due to a concurrent update".to_owned(),
            )));
        }
        finish(&mut state, tx, result)
    }
}

fn begin(state: &mut DatabaseState, mode: TransactionMode) -> InMemoryTransaction {
    InMemoryTransaction {
        tables: state.tables.clone(),
        mode,
        now: DefaultClock.utc(),
        dirty: false,
        faults: std::mem::take(&mut state.faults),
    }
}

/// Commits `tx` when `result` is `Ok`; otherwise drops its writes. Faults
/// the transaction did not reach are re-armed either way.
fn finish<T>(
    state: &mut DatabaseState,
    mut tx: InMemoryTransaction,
    result: TaskResult<T>,
) -> TaskResult<T> {
    let outcome = if tx.dirty {
        result.and_then(|value| tx.trip(FaultPoint::Commit).map(|()| value))
    } else {
        result
    };
    state.faults.append(&mut tx.faults);
    if outcome.is_ok() && tx.dirty {
        state.tables = tx.tables;
        state.version += 1;
    }
    outcome
}

impl TransactionRunner for InMemoryDatabase {
    type Connection = InMemoryTransaction;

    fn run_in_transaction<T, F>(&self, mode: TransactionMode, f: F) -> TaskResult<T>
    where
        F: FnOnce(&mut Self::Connection) -> TaskResult<T>,
    {
        match mode {
            TransactionMode::ReadWrite => self.run_exclusive(f),
            TransactionMode::Snapshot | TransactionMode::Serializable => {
                self.run_optimistic(mode, f)
            }
        }
    }
}
