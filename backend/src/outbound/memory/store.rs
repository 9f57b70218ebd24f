//! In-memory store and its transaction manager.
//!
//! Each transaction collects the tables it wrote to. Commit takes the
//! store-wide commit lock, re-checks every table and then applies every
//! table, so commits from concurrent units of work never interleave.
//!
//! The store also keeps every table it created so that references between
//! rows can be checked across tables, the way PostgreSQL checks deferred
//! foreign keys. A reference to a kind with no table in the store is not
//! checked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::task_local;
use tracing::debug;

use super::repository::InMemoryRepository;
use super::table::InMemoryTable;
use crate::domain::{Entity, Reference};
use crate::domain::ports::{TransactionError, TransactionManager};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

task_local! {
    static AMBIENT_TRANSACTION: Arc<MemoryTransaction>;
}

/// The transaction bound to the current task, if any.
pub(super) fn ambient_transaction() -> Option<Arc<MemoryTransaction>> {
    AMBIENT_TRANSACTION.try_with(Arc::clone).ok()
}

pub(super) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct TransactionId(u64);

/// Foreign keys touched by one transaction in one table.
#[derive(Debug, Default)]
pub(super) struct StagedLinks {
    /// `(row id, target)` for every inserted or updated row.
    pub(super) references: Vec<(i32, Reference)>,
    /// Ids of deleted rows.
    pub(super) removed: Vec<i32>,
}

/// A table holding staged changes for a transaction.
///
/// Implementations lock only their own state in each call.
pub(super) trait Participant: Send + Sync {
    /// [`Entity::KIND`] of the rows held.
    fn kind(&self) -> &'static str;
    /// Verify staged changes still apply cleanly to this table: updated and
    /// deleted rows still exist and unique keys hold.
    fn check(&self, transaction: TransactionId) -> Result<(), TransactionError>;
    /// References added and rows removed by `transaction`.
    fn staged_links(&self, transaction: TransactionId) -> StagedLinks;
    /// Whether row `id` is visible to `transaction`.
    fn contains(&self, transaction: TransactionId, id: i32) -> bool;
    /// A row visible to `transaction` that references `target`.
    fn referrer(&self, transaction: TransactionId, target: Reference) -> Option<i32>;
    /// Apply staged changes. Only called after a successful `check` under the
    /// commit lock.
    fn apply(&self, transaction: TransactionId);
    /// Drop staged changes.
    fn discard(&self, transaction: TransactionId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Committed,
    RolledBack,
}

/// Transaction handle issued by [`InMemoryStore`].
pub struct MemoryTransaction {
    id: TransactionId,
    store_id: u64,
    phase: Mutex<Phase>,
    participants: Mutex<Vec<Arc<dyn Participant>>>,
}

impl MemoryTransaction {
    pub(super) fn id(&self) -> TransactionId {
        self.id
    }

    pub(super) fn belongs_to(&self, store_id: u64) -> bool {
        self.store_id == store_id
    }

    pub(super) fn is_active(&self) -> bool {
        *lock(&self.phase) == Phase::Active
    }

    /// Register a table. Tables enlist once, on their first staged change.
    pub(super) fn enlist(&self, participant: Arc<dyn Participant>) {
        lock(&self.participants).push(participant);
    }

    fn participants(&self) -> Vec<Arc<dyn Participant>> {
        lock(&self.participants).clone()
    }

    fn check_all(&self, tables: &[Arc<dyn Participant>]) -> Result<(), TransactionError> {
        for participant in self.participants() {
            participant.check(self.id)?;
            let links = participant.staged_links(self.id);
            for (row, target) in &links.references {
                self.check_reference(tables, participant.kind(), *row, *target)?;
            }
            for removed in links.removed {
                let target = Reference {
                    kind: participant.kind(),
                    id: removed,
                };
                for table in tables {
                    if let Some(referrer) = table.referrer(self.id, target) {
                        return Err(TransactionError::conflict(format!(
                            "{} {removed} is still referenced by {} {referrer}",
                            target.kind,
                            table.kind()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_reference(
        &self,
        tables: &[Arc<dyn Participant>],
        kind: &str,
        row: i32,
        target: Reference,
    ) -> Result<(), TransactionError> {
        let mut candidates = tables
            .iter()
            .filter(|table| table.kind() == target.kind)
            .peekable();
        if candidates.peek().is_none() {
            return Ok(());
        }
        if candidates.any(|table| table.contains(self.id, target.id)) {
            return Ok(());
        }
        Err(TransactionError::conflict(format!(
            "{kind} {row} references missing {} {}",
            target.kind, target.id
        )))
    }

    fn discard_all(&self) {
        for participant in self.participants() {
            participant.discard(self.id);
        }
    }
}

struct StoreInner {
    id: u64,
    next_transaction: AtomicU64,
    commit_lock: Mutex<()>,
    tables: Mutex<Vec<Arc<dyn Participant>>>,
}

/// Process-local store for tests, demos and database-less deployments.
///
/// Create one repository per entity type with [`InMemoryStore::repository`]
/// and share it; every call creates a separate, empty table.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<StoreInner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
                next_transaction: AtomicU64::new(1),
                commit_lock: Mutex::new(()),
                tables: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a new empty table for `E` in this store.
    pub fn repository<E: Entity>(&self) -> InMemoryRepository<E> {
        let table = Arc::new(InMemoryTable::<E>::new());
        lock(&self.inner.tables).push(Arc::clone(&table) as Arc<dyn Participant>);
        InMemoryRepository::new(self.inner.id, table)
    }

    fn tables(&self) -> Vec<Arc<dyn Participant>> {
        lock(&self.inner.tables).clone()
    }

    fn commit_now(&self, transaction: &MemoryTransaction) -> Result<(), TransactionError> {
        let _commit = lock(&self.inner.commit_lock);
        let mut phase = lock(&transaction.phase);
        if *phase != Phase::Active {
            return Err(TransactionError::commit("transaction already finished"));
        }
        transaction.check_all(&self.tables())?;
        for participant in transaction.participants() {
            participant.apply(transaction.id);
        }
        *phase = Phase::Committed;
        Ok(())
    }

    fn rollback_now(transaction: &MemoryTransaction) -> Result<(), TransactionError> {
        let mut phase = lock(&transaction.phase);
        match *phase {
            Phase::Committed => Err(TransactionError::rollback("transaction already committed")),
            Phase::RolledBack => Ok(()),
            Phase::Active => {
                transaction.discard_all();
                *phase = Phase::RolledBack;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<Arc<MemoryTransaction>, TransactionError> {
        if AMBIENT_TRANSACTION.try_with(|_| ()).is_ok() {
            return Err(TransactionError::nested());
        }
        let id = TransactionId(self.inner.next_transaction.fetch_add(1, Ordering::Relaxed));
        debug!(transaction = id.0, "memory transaction opened");
        Ok(Arc::new(MemoryTransaction {
            id,
            store_id: self.inner.id,
            phase: Mutex::new(Phase::Active),
            participants: Mutex::new(Vec::new()),
        }))
    }

    fn bind<'a, T: Send + 'a>(
        &self,
        transaction: Arc<MemoryTransaction>,
        work: BoxFuture<'a, T>,
    ) -> BoxFuture<'a, T> {
        Box::pin(AMBIENT_TRANSACTION.scope(transaction, work))
    }

    async fn flush(&self, transaction: &MemoryTransaction) -> Result<(), TransactionError> {
        if !transaction.is_active() {
            return Err(TransactionError::flush("transaction already finished"));
        }
        transaction.check_all(&self.tables())
    }

    async fn commit(&self, transaction: &MemoryTransaction) -> Result<(), TransactionError> {
        self.commit_now(transaction)?;
        debug!(transaction = transaction.id.0, "memory transaction committed");
        Ok(())
    }

    async fn rollback(&self, transaction: &MemoryTransaction) -> Result<(), TransactionError> {
        Self::rollback_now(transaction)
    }

    fn abandon(&self, transaction: &MemoryTransaction) {
        if Self::rollback_now(transaction).is_err() {
            debug!(transaction = transaction.id.0, "abandoned transaction had already committed");
        }
    }
}
