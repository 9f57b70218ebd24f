//! PostgreSQL transaction manager and the ambient connection it binds.
//!
//! `begin` checks out an owned connection and opens a transaction on it. The
//! unit of work binds the transaction to the task, and every Diesel repository
//! sharing the pool runs its statements on that connection until commit or
//! rollback hands the connection back to the pool. Foreign keys are declared
//! `DEFERRABLE INITIALLY DEFERRED`, so `flush` switches them to immediate to
//! surface violations before commit.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use diesel::QueryResult;
use diesel::result::Error as DieselError;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{
    AnsiTransactionManager, AsyncPgConnection, RunQueryDsl,
    TransactionManager as DieselTransactionManager,
};
use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task_local;
use tracing::debug;

use super::diesel_error_mapping::{
    classify, map_diesel_error, map_finish_error, map_pool_error, pool_message,
};
use super::pool::DbPool;
use crate::domain::ports::{RepositoryError, TransactionError, TransactionManager};

type OwnedConnection = PooledConnection<'static, AsyncPgConnection>;
type Ansi = AnsiTransactionManager;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

task_local! {
    static AMBIENT_PG: Arc<PgTransaction>;
}

fn ambient_transaction() -> Option<Arc<PgTransaction>> {
    AMBIENT_PG.try_with(Arc::clone).ok()
}

/// An open PostgreSQL transaction holding its pooled connection.
pub struct PgTransaction {
    id: u64,
    pool_id: u64,
    connection: Mutex<Option<OwnedConnection>>,
}

impl PgTransaction {
    fn belongs_to(&self, pool: &DbPool) -> bool {
        self.pool_id == pool.id()
    }
}

/// Whether a statement may run outside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
}

/// Run `query` on the ambient transaction's connection, or on a fresh pooled
/// connection for reads outside a unit of work.
pub(crate) async fn run_query<'a, T, F>(
    pool: &'a DbPool,
    access: Access,
    query: F,
) -> Result<T, RepositoryError>
where
    T: Send + 'a,
    F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, QueryResult<T>>
        + Send
        + 'a,
{
    match ambient_transaction() {
        Some(transaction) if transaction.belongs_to(pool) => {
            let mut guard = transaction.connection.lock().await;
            let connection = guard
                .as_mut()
                .ok_or_else(|| RepositoryError::invariant("transaction already finished"))?;
            query(&mut **connection).await.map_err(map_diesel_error)
        }
        Some(_) => Err(RepositoryError::invariant(
            "ambient transaction belongs to another pool",
        )),
        None if access == Access::Write => Err(RepositoryError::write_outside_unit_of_work()),
        None => {
            let mut connection = pool.get().await.map_err(map_pool_error)?;
            query(&mut *connection).await.map_err(map_diesel_error)
        }
    }
}

/// Transaction manager over a [`DbPool`].
#[derive(Clone)]
pub struct PgTransactionManager {
    pool: DbPool,
}

impl PgTransactionManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn rollback_connection(connection: &mut OwnedConnection) -> QueryResult<()> {
    let result =
        <Ansi as DieselTransactionManager<AsyncPgConnection>>::rollback_transaction(&mut **connection)
            .await;
    match result {
        Ok(()) | Err(DieselError::NotInTransaction) => Ok(()),
        Err(error) => Err(error),
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<Arc<PgTransaction>, TransactionError> {
        if AMBIENT_PG.try_with(|_| ()).is_ok() {
            return Err(TransactionError::nested());
        }
        let mut connection = self
            .pool
            .get_owned()
            .await
            .map_err(|err| TransactionError::begin(pool_message(err)))?;
        <Ansi as DieselTransactionManager<AsyncPgConnection>>::begin_transaction(&mut *connection)
            .await
            .map_err(|err| TransactionError::begin(classify(&err).into_message()))?;

        let id = NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(transaction = id, "postgres transaction opened");
        Ok(Arc::new(PgTransaction {
            id,
            pool_id: self.pool.id(),
            connection: Mutex::new(Some(connection)),
        }))
    }

    fn bind<'a, T: Send + 'a>(
        &self,
        transaction: Arc<PgTransaction>,
        work: BoxFuture<'a, T>,
    ) -> BoxFuture<'a, T> {
        Box::pin(AMBIENT_PG.scope(transaction, work))
    }

    async fn flush(&self, transaction: &PgTransaction) -> Result<(), TransactionError> {
        let mut guard = transaction.connection.lock().await;
        let connection = guard
            .as_mut()
            .ok_or_else(|| TransactionError::flush("transaction already finished"))?;
        diesel::sql_query("SET CONSTRAINTS ALL IMMEDIATE")
            .execute(&mut **connection)
            .await
            .map(|_| ())
            .map_err(|err| map_finish_error(err, TransactionError::flush))
    }

    async fn commit(&self, transaction: &PgTransaction) -> Result<(), TransactionError> {
        let mut guard = transaction.connection.lock().await;
        let connection = guard
            .as_mut()
            .ok_or_else(|| TransactionError::commit("transaction already finished"))?;
        <Ansi as DieselTransactionManager<AsyncPgConnection>>::commit_transaction(&mut **connection)
            .await
            .map_err(|err| map_finish_error(err, TransactionError::commit))?;
        // Committed: the connection goes back to the pool.
        guard.take();
        debug!(transaction = transaction.id, "postgres transaction committed");
        Ok(())
    }

    async fn rollback(&self, transaction: &PgTransaction) -> Result<(), TransactionError> {
        let Some(mut connection) = transaction.connection.lock().await.take() else {
            return Ok(());
        };
        rollback_connection(&mut connection)
            .await
            .map_err(|err| TransactionError::rollback(classify(&err).into_message()))?;
        debug!(transaction = transaction.id, "postgres transaction rolled back");
        Ok(())
    }

    fn abandon(&self, transaction: &PgTransaction) {
        let Ok(mut guard) = transaction.connection.try_lock() else {
            return;
        };
        let Some(mut connection) = guard.take() else {
            return;
        };
        let id = transaction.id;
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = rollback_connection(&mut connection).await {
                        debug!(transaction = id, %error, "abandoned transaction rollback failed");
                    }
                });
            }
            // The pool discards connections still inside a transaction.
            Err(_) => drop(connection),
        }
    }
}
