//! Transaction port: run a closure against one store transaction.

use crate::task::error::TaskResult;
use std::time::Instant;

/// Isolation and access mode requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionMode {
    /// Read-only transaction over one consistent snapshot.
    Snapshot,
    /// Read-write transaction at the store's default isolation.
    ReadWrite,
    /// Read-write transaction whose outcome equals some serial order of all
    /// concurrent transactions; conflicting ones abort.
    Serializable,
}

/// Opens, commits, and rolls back transactions on a transactional store.
///
/// Implementations are blocking; callers run them on a blocking thread.
/// Every store port takes the connection handed to the closure, so all work
/// inside one call shares a single transaction.
pub trait TransactionRunner: Send + Sync + 'static {
    /// Connection type store ports operate on while the transaction is open.
    type Connection: 'static;

    /// Runs `f` inside a transaction opened in `mode`.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back on every
    /// other exit path.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a storage error when the
    /// transaction cannot be opened or committed (including serialization
    /// failures).
    fn run_in_transaction<T, F>(&self, mode: TransactionMode, f: F) -> TaskResult<T>
    where
        F: FnOnce(&mut Self::Connection) -> TaskResult<T>;

    /// Runs `f` like [`TransactionRunner::run_in_transaction`], bounding
    /// individual store round trips by `deadline` where the store supports
    /// it.
    ///
    /// The default ignores `deadline`; callers still observe it between
    /// round trips through their operation context.
    ///
    /// # Errors
    ///
    /// As [`TransactionRunner::run_in_transaction`]. A round trip cut short
    /// by `deadline` fails with [`crate::task::error::TaskError::Cancelled`].
    fn run_with_deadline<T, F>(
        &self,
        mode: TransactionMode,
        deadline: Option<Instant>,
        f: F,
    ) -> TaskResult<T>
    where
        F: FnOnce(&mut Self::Connection) -> TaskResult<T>,
    {
        let _ = deadline;
        self.run_in_transaction(mode, f)
    }
}
