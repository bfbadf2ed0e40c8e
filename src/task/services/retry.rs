//! Caller-side retry for serialization failures.
//!
//! The coordinator never retries; callers that want to absorb losing a
//! serializable race opt in here.

use crate::task::error::TaskResult;
use std::future::Future;

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `attempts` runs have been made. At least one attempt is always made.
///
/// # Errors
///
/// Returns the last error produced by `operation`.
pub async fn retry_serialization_failures<T, F, Fut>(
    attempts: u32,
    mut operation: F,
) -> TaskResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TaskResult<T>>,
{
    let mut remaining = attempts.max(1);
    loop {
        match operation().await {
            Err(err) if err.is_retryable() && remaining > 1 => {
                remaining -= 1;
                tracing::debug!(remaining, error = %err, "retrying after serialization failure");
            }
            result => return result,
        }
    }
}
