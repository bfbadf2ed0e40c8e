//! Repository port for task creation, lookup, and status changes.

use super::OperationContext;
use crate::task::{
    domain::{Task, TaskCreate, TaskFind, TaskPatch, TaskStatusPatch},
    error::TaskResult,
};
use async_trait::async_trait;

/// Task persistence contract used by the API layer.
///
/// Every returned [`Task`] has its full run and check-run lists attached,
/// read in the same transaction as the task itself.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::Conflict`] when a constraint
    /// rejects the row, or a storage error.
    async fn create_task(&self, ctx: &OperationContext, create: &TaskCreate) -> TaskResult<Task>;

    /// Returns the tasks matching `find`, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot cannot be read.
    async fn find_task_list(&self, ctx: &OperationContext, find: &TaskFind)
    -> TaskResult<Vec<Task>>;

    /// Returns the single task matching `find`, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::Conflict`] when more than one
    /// task matches.
    async fn find_task(&self, ctx: &OperationContext, find: &TaskFind) -> TaskResult<Option<Task>>;

    /// Updates task metadata and stamps the updater.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::NotFound`] when the task does
    /// not exist.
    async fn patch_task(&self, ctx: &OperationContext, patch: &TaskPatch) -> TaskResult<Task>;

    /// Changes task status and applies the matching run effect atomically.
    ///
    /// # Errors
    ///
    /// Returns [`crate::task::error::TaskError::NotFound`] when the task does
    /// not exist, a transition error when the change has no legal run effect,
    /// or a storage error (including serialization failures the caller may
    /// retry).
    async fn patch_task_status(
        &self,
        ctx: &OperationContext,
        patch: &TaskStatusPatch,
    ) -> TaskResult<Task>;
}
