//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! Compiled for `cfg(test)` and when the `test-support` feature is enabled.
//! The recording decorators wrap real adapters and append one entry per call
//! to a shared [`CallLog`], so tests can assert on call order across the
//! validator, the transaction manager and the repositories.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use chrono::NaiveDate;

use crate::domain::ports::{
    CheapValidator, ProjectingRepository, Repository, RepositoryError, TransactionError,
    TransactionManager, UserRepository,
};
use crate::domain::{
    BodyTrack, Email, Error, Exercise, ExerciseSet, MembershipTier, NewBodyTrack, NewExercise,
    NewUser, NewWorkoutPlan, NewWorkoutSession, PasswordHash, PlanId, TargetMuscles, UnitOfWork,
    User, UserId, UserSummary, Username, WorkoutPlan, WorkoutSession,
};
use crate::outbound::memory::{InMemoryRepository, InMemoryStore};

/// Ordered, shareable list of recorded calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.into());
    }

    /// Snapshot of every call so far.
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of calls named `event`.
    pub fn count(&self, event: &str) -> usize {
        self.entries().iter().filter(|entry| *entry == event).count()
    }

    /// Number of calls whose name starts with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }
}

/// Transaction manager decorator that records lifecycle calls and can inject
/// commit or rollback failures.
pub struct RecordingTransactionManager<M> {
    inner: M,
    log: CallLog,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
}

impl<M: TransactionManager> RecordingTransactionManager<M> {
    pub fn new(inner: M, log: CallLog) -> Self {
        Self {
            inner,
            log,
            fail_commit: AtomicBool::new(false),
            fail_rollback: AtomicBool::new(false),
        }
    }

    /// Make the next `commit` fail without reaching the inner manager.
    pub fn fail_next_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    /// Make the next `rollback` report a failure after discarding changes.
    pub fn fail_next_rollback(&self) {
        self.fail_rollback.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl<M: TransactionManager> TransactionManager for RecordingTransactionManager<M> {
    type Transaction = M::Transaction;

    async fn begin(&self) -> Result<Arc<M::Transaction>, TransactionError> {
        self.log.record("tx.begin");
        self.inner.begin().await
    }

    fn bind<'a, T: Send + 'a>(
        &self,
        transaction: Arc<M::Transaction>,
        work: BoxFuture<'a, T>,
    ) -> BoxFuture<'a, T> {
        self.inner.bind(transaction, work)
    }

    async fn flush(&self, transaction: &M::Transaction) -> Result<(), TransactionError> {
        self.log.record("tx.flush");
        self.inner.flush(transaction).await
    }

    async fn commit(&self, transaction: &M::Transaction) -> Result<(), TransactionError> {
        self.log.record("tx.commit");
        if self.fail_commit.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::commit("injected commit failure"));
        }
        self.inner.commit(transaction).await
    }

    async fn rollback(&self, transaction: &M::Transaction) -> Result<(), TransactionError> {
        self.log.record("tx.rollback");
        self.inner.rollback(transaction).await?;
        if self.fail_rollback.swap(false, Ordering::SeqCst) {
            return Err(TransactionError::rollback("injected rollback failure"));
        }
        Ok(())
    }

    fn abandon(&self, transaction: &M::Transaction) {
        self.log.record("tx.abandon");
        self.inner.abandon(transaction);
    }
}

/// Validator decorator that records each check.
pub struct RecordingValidator<V> {
    inner: V,
    log: CallLog,
}

impl<V> RecordingValidator<V> {
    pub fn new(inner: V, log: CallLog) -> Self {
        Self { inner, log }
    }
}

impl<Req: 'static, V: CheapValidator<Req>> CheapValidator<Req> for RecordingValidator<V> {
    fn validate_cheap(&self, request: &Req) -> Result<(), Error> {
        self.log.record("validate");
        self.inner.validate_cheap(request)
    }
}

/// User repository decorator that records each call as `repo.<method>`.
pub struct RecordingUserRepository<R> {
    inner: R,
    log: CallLog,
}

impl<R> RecordingUserRepository<R> {
    pub fn new(inner: R, log: CallLog) -> Self {
        Self { inner, log }
    }
}

#[async_trait]
impl<R: UserRepository> Repository<User> for RecordingUserRepository<R> {
    async fn get_one_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.log.record("repo.get_one_by_id");
        self.inner.get_one_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<User>, RepositoryError> {
        self.log.record("repo.get_all");
        self.inner.get_all().await
    }

    async fn create(&self, draft: crate::domain::NewUser) -> Result<User, RepositoryError> {
        self.log.record("repo.create");
        self.inner.create(draft).await
    }

    async fn update(&self, entity: &User) -> Result<(), RepositoryError> {
        self.log.record("repo.update");
        self.inner.update(entity).await
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.log.record("repo.delete");
        self.inner.delete(id).await
    }
}

#[async_trait]
impl<R: UserRepository> ProjectingRepository<User, UserSummary> for RecordingUserRepository<R> {
    async fn get_all_projected(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        self.log.record("repo.get_all_projected");
        self.inner.get_all_projected().await
    }
}

#[async_trait]
impl<R: UserRepository> UserRepository for RecordingUserRepository<R> {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        self.log.record("repo.find_by_username");
        self.inner.find_by_username(username).await
    }
}

/// In-memory store with one repository per entity and seeding helpers.
///
/// Every seed runs in its own committed unit of work.
pub struct MemoryFixture {
    pub store: Arc<InMemoryStore>,
    pub users: InMemoryRepository<User>,
    pub exercises: InMemoryRepository<Exercise>,
    pub plans: InMemoryRepository<WorkoutPlan>,
    pub sessions: InMemoryRepository<WorkoutSession>,
    pub sets: InMemoryRepository<ExerciseSet>,
    pub body_tracks: InMemoryRepository<BodyTrack>,
}

impl Default for MemoryFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.repository(),
            exercises: store.repository(),
            plans: store.repository(),
            sessions: store.repository(),
            sets: store.repository(),
            body_tracks: store.repository(),
            store,
        }
    }

    pub fn unit_of_work(&self) -> UnitOfWork<InMemoryStore> {
        UnitOfWork::new(Arc::clone(&self.store))
    }

    /// Password of every seeded user.
    pub const PASSWORD: &'static str = "secret";
    const SECRET_HASH: &'static str = "fixture$terces";

    /// Store a user with [`Self::PASSWORD`] as their
    /// [`FixturePasswordHasher`](crate::domain::ports::FixturePasswordHasher) password.
    pub async fn seed_user(&self, username: &str, tier: MembershipTier) -> Result<User, Error> {
        let users = self.users.clone();
        let draft = NewUser {
            username: Username::new(username).map_err(|e| Error::invalid_request(e.to_string()))?,
            email: Email::new(format!("{username}@example.com"))
                .map_err(|e| Error::invalid_request(e.to_string()))?,
            password_hash: PasswordHash::new(Self::SECRET_HASH)
                .map_err(|e| Error::invalid_request(e.to_string()))?,
            membership_tier: tier,
        };
        self.unit_of_work()
            .execute(move || async move { Ok(users.create(draft).await?) })
            .await
    }

    pub async fn seed_exercise(&self, name: &str) -> Result<Exercise, Error> {
        let exercises = self.exercises.clone();
        let draft = NewExercise {
            name: name.to_owned(),
            image_url: None,
            target_muscles: TargetMuscles::default(),
        };
        self.unit_of_work()
            .execute(move || async move { Ok(exercises.create(draft).await?) })
            .await
    }

    pub async fn seed_plan(&self, user_id: UserId, name: &str) -> Result<WorkoutPlan, Error> {
        let plans = self.plans.clone();
        let draft = NewWorkoutPlan {
            user_id,
            name: name.to_owned(),
            membership_tier: MembershipTier::Basic,
        };
        self.unit_of_work()
            .execute(move || async move { Ok(plans.create(draft).await?) })
            .await
    }

    pub async fn seed_session(
        &self,
        date: NaiveDate,
        plan_id: Option<PlanId>,
    ) -> Result<WorkoutSession, Error> {
        let sessions = self.sessions.clone();
        let draft = NewWorkoutSession { date, plan_id };
        self.unit_of_work()
            .execute(move || async move { Ok(sessions.create(draft).await?) })
            .await
    }

    /// Store a measurement dated 2025-01-01 with a height of 180 cm.
    pub async fn seed_body_track(&self, user_id: UserId, weight: f64) -> Result<BodyTrack, Error> {
        let body_tracks = self.body_tracks.clone();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1)
            .ok_or_else(|| Error::internal("fixture date out of range"))?;
        let draft = NewBodyTrack {
            user_id,
            date,
            weight,
            height: 180.0,
        };
        self.unit_of_work()
            .execute(move || async move { Ok(body_tracks.create(draft).await?) })
            .await
    }
}
