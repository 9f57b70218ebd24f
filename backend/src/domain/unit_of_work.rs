//! Transactional boundary around one mutation.
//!
//! [`UnitOfWork::execute`] opens a transaction, runs the supplied operation
//! with that transaction bound to the task, then flushes and commits. Any
//! failure from the operation, the flush or the commit triggers exactly one
//! rollback and the original failure is returned unchanged.

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, warn};

use super::ports::{TransactionError, TransactionManager};

/// Runs operations atomically through a [`TransactionManager`].
pub struct UnitOfWork<M> {
    manager: Arc<M>,
}

impl<M> Clone for UnitOfWork<M> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}

impl<M: TransactionManager> UnitOfWork<M> {
    pub fn new(manager: Arc<M>) -> Self {
        Self { manager }
    }

    /// Execute `operation` inside a fresh transaction.
    ///
    /// The transaction is finished (committed or rolled back) before this
    /// returns. If the returned future is dropped early the transaction is
    /// abandoned instead.
    ///
    /// # Errors
    /// Returns the operation's own error unchanged, or a
    /// [`TransactionError`] converted into `E` when begin, flush or commit
    /// fails.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<TransactionError> + Send,
    {
        let transaction = self.manager.begin().await.map_err(E::from)?;
        debug!("unit of work started");
        let guard = AbandonOnDrop::arm(self.manager.as_ref(), transaction.as_ref());

        let outcome = self
            .manager
            .bind(Arc::clone(&transaction), operation().boxed())
            .await;

        let result = match outcome {
            Ok(value) => match self.finish(&transaction).await {
                Ok(()) => {
                    debug!("unit of work committed");
                    Ok(value)
                }
                Err(error) => {
                    self.roll_back(&transaction, &error).await;
                    Err(E::from(error))
                }
            },
            Err(error) => {
                self.roll_back(&transaction, &"operation failed").await;
                Err(error)
            }
        };

        guard.disarm();
        result
    }

    async fn finish(&self, transaction: &M::Transaction) -> Result<(), TransactionError> {
        self.manager.flush(transaction).await?;
        self.manager.commit(transaction).await
    }

    async fn roll_back(&self, transaction: &M::Transaction, cause: &(dyn std::fmt::Display + Sync)) {
        match self.manager.rollback(transaction).await {
            Ok(()) => debug!(%cause, "unit of work rolled back"),
            // The original failure is what the caller needs to see.
            Err(error) => warn!(%error, %cause, "rollback failed"),
        }
    }
}

struct AbandonOnDrop<'a, M: TransactionManager> {
    manager: &'a M,
    transaction: &'a M::Transaction,
    armed: bool,
}

impl<'a, M: TransactionManager> AbandonOnDrop<'a, M> {
    fn arm(manager: &'a M, transaction: &'a M::Transaction) -> Self {
        Self {
            manager,
            transaction,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<M: TransactionManager> Drop for AbandonOnDrop<'_, M> {
    fn drop(&mut self) {
        if self.armed {
            warn!("unit of work dropped before completion; abandoning transaction");
            self.manager.abandon(self.transaction);
        }
    }
}

#[cfg(test)]
#[path = "unit_of_work_tests.rs"]
mod tests;
