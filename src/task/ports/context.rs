//! Per-call cancellation and deadline handling.

use crate::task::error::{TaskError, TaskResult};
use std::time::{Duration, Instant};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Caller-supplied bounds for one repository operation.
///
/// Coordinators call [`OperationContext::checkpoint`] between store round
/// trips and right before commit, so a cancelled request rolls back instead
/// of committing a partial change.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// Creates a context that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `token` to observe caller cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Fails the operation once `deadline` has passed.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Fails the operation once `timeout` has elapsed from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the instant after which the operation fails, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Derives a context for work that may outlive the caller's future.
    ///
    /// The derived context is cancelled when this one is, and also when the
    /// returned guard is dropped. Holding the guard inside the awaiting
    /// future ties blocking work to that future's lifetime.
    #[must_use]
    pub fn scoped(&self) -> (Self, DropGuard) {
        let token = self.cancellation.child_token();
        let guard = token.clone().drop_guard();
        (
            Self {
                cancellation: token,
                deadline: self.deadline,
            },
            guard,
        )
    }

    /// Returns `Err(TaskError::Cancelled)` once the caller has given up.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Cancelled`] when the token is cancelled or the
    /// deadline has passed.
    pub fn checkpoint(&self) -> TaskResult<()> {
        let expired = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if self.cancellation.is_cancelled() || expired {
            return Err(TaskError::Cancelled);
        }
        Ok(())
    }
}
