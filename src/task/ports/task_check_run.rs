//! Task check run store contract. The core only reads check runs.

use crate::task::{
    domain::{TaskCheckRun, TaskCheckRunFind},
    error::TaskResult,
};

/// Task check run lookups that participate in the caller's transaction.
pub trait TaskCheckRunStore<C>: Send + Sync {
    /// Returns the check runs matching `find`, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the query fails.
    fn find_task_check_run_list(
        &self,
        conn: &mut C,
        find: &TaskCheckRunFind,
    ) -> TaskResult<Vec<TaskCheckRun>>;
}
