//! Generic in-memory repository plus the entity-specific finders.

use std::sync::Arc;

use async_trait::async_trait;

use super::store::{MemoryTransaction, TransactionId, ambient_transaction};
use super::table::InMemoryTable;
use crate::domain::ports::{
    BodyTrackRepository, ExerciseSetRepository, Projection, ProjectingRepository, Repository,
    RepositoryError, UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
use crate::domain::{
    BodyTrack, Entity, ExerciseSet, PlanId, SessionId, User, UserId, Username, WorkoutPlan,
    WorkoutSession,
};

/// Repository over one in-memory table.
///
/// Obtain instances from [`InMemoryStore::repository`](super::InMemoryStore::repository).
pub struct InMemoryRepository<E: Entity> {
    store_id: u64,
    table: Arc<InMemoryTable<E>>,
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store_id: self.store_id,
            table: Arc::clone(&self.table),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub(super) fn new(store_id: u64, table: Arc<InMemoryTable<E>>) -> Self {
        Self { store_id, table }
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        self.reader().map(|transaction| transaction.id())
    }

    /// The ambient transaction when it was opened by this repository's store.
    fn reader(&self) -> Option<Arc<MemoryTransaction>> {
        ambient_transaction().filter(|transaction| transaction.belongs_to(self.store_id))
    }

    fn writer(&self) -> Result<Arc<MemoryTransaction>, RepositoryError> {
        let transaction =
            ambient_transaction().ok_or_else(RepositoryError::write_outside_unit_of_work)?;
        if !transaction.belongs_to(self.store_id) {
            return Err(RepositoryError::invariant(
                "ambient transaction belongs to another store",
            ));
        }
        if !transaction.is_active() {
            return Err(RepositoryError::invariant("transaction already finished"));
        }
        Ok(transaction)
    }

    fn rows_where(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        self.table
            .select(self.transaction_id(), |row| predicate(row).then(|| row.clone()))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get_one_by_id(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        Ok(self.table.find(self.transaction_id(), id))
    }

    async fn get_all(&self) -> Result<Vec<E>, RepositoryError> {
        Ok(self.rows_where(|_| true))
    }

    async fn create(&self, draft: E::Draft) -> Result<E, RepositoryError> {
        let transaction = self.writer()?;
        self.table.insert(&transaction, draft)
    }

    async fn update(&self, entity: &E) -> Result<(), RepositoryError> {
        let transaction = self.writer()?;
        self.table.update(&transaction, entity)
    }

    async fn delete(&self, id: E::Id) -> Result<Option<E>, RepositoryError> {
        let transaction = self.writer()?;
        Ok(self.table.delete(&transaction, id))
    }
}

#[async_trait]
impl<E: Entity, P: Projection<E>> ProjectingRepository<E, P> for InMemoryRepository<E> {
    /// Projects borrowed rows; whole entities are never copied out.
    async fn get_all_projected(&self) -> Result<Vec<P>, RepositoryError> {
        Ok(self
            .table
            .select(self.transaction_id(), |row| Some(P::project(row))))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .table
            .first(self.transaction_id(), |user| user.username() == username))
    }
}

#[async_trait]
impl WorkoutPlanRepository for InMemoryRepository<WorkoutPlan> {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WorkoutPlan>, RepositoryError> {
        Ok(self.rows_where(|plan| plan.user_id == user_id))
    }
}

#[async_trait]
impl WorkoutSessionRepository for InMemoryRepository<WorkoutSession> {
    async fn list_for_plan(
        &self,
        plan_id: PlanId,
    ) -> Result<Vec<WorkoutSession>, RepositoryError> {
        Ok(self.rows_where(|session| session.plan_id == Some(plan_id)))
    }
}

#[async_trait]
impl ExerciseSetRepository for InMemoryRepository<ExerciseSet> {
    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ExerciseSet>, RepositoryError> {
        Ok(self.rows_where(|set| set.session_id == session_id))
    }
}

#[async_trait]
impl BodyTrackRepository for InMemoryRepository<BodyTrack> {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<BodyTrack>, RepositoryError> {
        let mut tracks = self.rows_where(|track| track.user_id == user_id);
        tracks.sort_by_key(|track| track.date);
        Ok(tracks)
    }
}
