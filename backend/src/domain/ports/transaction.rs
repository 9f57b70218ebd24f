//! Transaction lifecycle port driven by the unit of work.
//!
//! A manager hands out transactions and binds one to the current task while
//! the wrapped operation runs. Repositories from the same adapter discover the
//! bound transaction and stage their writes against it.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Errors raised while driving a transaction.
    pub enum TransactionError {
        /// No transaction could be opened.
        Begin { message: String } => "failed to begin transaction: {message}",
        /// Staged changes failed their pre-commit checks.
        Flush { message: String } => "failed to flush staged changes: {message}",
        /// Staged changes conflict with committed state.
        Conflict { message: String } => "transaction conflict: {message}",
        /// The store refused to commit.
        Commit { message: String } => "failed to commit transaction: {message}",
        /// The store failed to roll back.
        Rollback { message: String } => "failed to roll back transaction: {message}",
        /// A transaction is already bound to this task.
        Nested => "a unit of work is already active on this task",
    }
}

impl From<TransactionError> for Error {
    fn from(value: TransactionError) -> Self {
        match value {
            TransactionError::Begin { message } => {
                Self::service_unavailable(format!("storage unavailable: {message}"))
            }
            TransactionError::Conflict { message } => Self::conflict(message),
            other => Self::internal(other.to_string()),
        }
    }
}

/// Opens, binds and finishes transactions.
///
/// Implementations must make `commit` and `rollback` safe to call on a
/// transaction that has already finished: `rollback` after a failed `commit`
/// is the normal failure path.
#[async_trait]
pub trait TransactionManager: Send + Sync + 'static {
    /// Adapter-specific transaction handle.
    type Transaction: Send + Sync + 'static;

    /// Open a transaction. Fails with [`TransactionError::Nested`] when one is
    /// already bound to the current task.
    async fn begin(&self) -> Result<Arc<Self::Transaction>, TransactionError>;

    /// Run `work` with `transaction` bound as the task's ambient transaction.
    fn bind<'a, T: Send + 'a>(
        &self,
        transaction: Arc<Self::Transaction>,
        work: BoxFuture<'a, T>,
    ) -> BoxFuture<'a, T>;

    /// Run pre-commit checks against staged changes.
    async fn flush(&self, transaction: &Self::Transaction) -> Result<(), TransactionError>;

    /// Make staged changes durable and visible.
    async fn commit(&self, transaction: &Self::Transaction) -> Result<(), TransactionError>;

    /// Discard staged changes.
    async fn rollback(&self, transaction: &Self::Transaction) -> Result<(), TransactionError>;

    /// Discard staged changes without awaiting. Called when a unit of work is
    /// dropped before it finished.
    fn abandon(&self, transaction: &Self::Transaction);
}
