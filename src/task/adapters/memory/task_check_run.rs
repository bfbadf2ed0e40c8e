//! In-memory task check run store.

use super::InMemoryTransaction;
use crate::task::{
    domain::{TaskCheckRun, TaskCheckRunFind},
    error::TaskResult,
    ports::TaskCheckRunStore,
};

/// Task check runs stored in an [`super::InMemoryDatabase`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryTaskCheckRunStore;

impl TaskCheckRunStore<InMemoryTransaction> for InMemoryTaskCheckRunStore {
    fn find_task_check_run_list(
        &self,
        tx: &mut InMemoryTransaction,
        find: &TaskCheckRunFind,
    ) -> TaskResult<Vec<TaskCheckRun>> {
        Ok(tx
            .tables()
            .task_check_runs
            .values()
            .filter(|check| find.matches(check))
            .cloned()
            .collect())
    }
}
