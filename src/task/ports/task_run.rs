//! Task run store contract consumed by the status transition coordinator.

use crate::task::{
    domain::{TaskRun, TaskRunCreate, TaskRunFind, TaskRunStatusPatch},
    error::{EntityKind, TaskResult, at_most_one},
};

/// Task run operations that participate in the caller's transaction.
///
/// Implementations never open or commit transactions of their own.
pub trait TaskRunStore<C>: Send + Sync {
    /// Inserts a run in [`crate::task::domain::TaskRunStatus::Running`].
    ///
    /// # Errors
    ///
    /// Returns a conflict or storage error when the row is rejected.
    fn create_task_run(&self, conn: &mut C, create: &TaskRunCreate) -> TaskResult<TaskRun>;

    /// Returns the runs matching `find`, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the query fails.
    fn find_task_run_list(&self, conn: &mut C, find: &TaskRunFind) -> TaskResult<Vec<TaskRun>>;

    /// Returns the single run matching `find`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::Conflict`] when more than one
    /// run matches.
    fn find_task_run(&self, conn: &mut C, find: &TaskRunFind) -> TaskResult<Option<TaskRun>> {
        at_most_one(EntityKind::TaskRun, self.find_task_run_list(conn, find)?)
    }

    /// Updates the status and outcome of a run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::NotFound`] when no run with
    /// the id belongs to the patch's task.
    fn patch_task_run_status(
        &self,
        conn: &mut C,
        patch: &TaskRunStatusPatch,
    ) -> TaskResult<TaskRun>;
}
