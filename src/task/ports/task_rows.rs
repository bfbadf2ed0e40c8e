//! Row-level access to the task table inside an open transaction.

use crate::task::{
    domain::{PrincipalId, Task, TaskCreate, TaskFind, TaskId, TaskPatch, TaskStatus},
    error::TaskResult,
};

/// Task table operations that participate in the caller's transaction.
///
/// Returned tasks carry empty run and check-run lists; the repository
/// attaches those itself.
pub trait TaskRowStore<C>: Send + Sync {
    /// Inserts a task row and returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns a conflict or storage error when the row is rejected.
    fn insert_task(&self, conn: &mut C, create: &TaskCreate) -> TaskResult<Task>;

    /// Returns the task rows matching `find`, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the query fails.
    fn select_tasks(&self, conn: &mut C, find: &TaskFind) -> TaskResult<Vec<Task>>;

    /// Applies a metadata patch, returning `None` when no row has the id.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the update fails.
    fn update_task(&self, conn: &mut C, patch: &TaskPatch) -> TaskResult<Option<Task>>;

    /// Sets the status and updater of a task, returning `None` when no row
    /// has the id.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the update fails.
    fn update_task_status(
        &self,
        conn: &mut C,
        id: TaskId,
        status: TaskStatus,
        updater_id: PrincipalId,
    ) -> TaskResult<Option<Task>>;
}
