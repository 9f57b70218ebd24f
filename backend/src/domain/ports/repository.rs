//! Generic repository port plus the entity-specific extensions.
//!
//! Writes (`create`, `update`, `delete`) must run inside a unit of work.
//! Adapters stage them against the ambient transaction and they become
//! visible to other callers only once that transaction commits. Reads
//! outside a unit of work observe committed state.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{
    BodyTrack, Entity, Error, ExerciseSet, PlanId, SessionId, User, UserId, UserSummary,
    Username, WorkoutPlan, WorkoutSession,
};

define_port_error! {
    /// Errors raised by repository adapters.
    pub enum RepositoryError {
        /// The store could not be reached.
        Connection { message: String } => "repository connection failed: {message}",
        /// A statement failed for reasons other than connectivity.
        Query { message: String } => "repository query failed: {message}",
        /// A uniqueness or foreign key constraint rejected the write.
        Conflict { message: String } => "repository constraint violated: {message}",
        /// An update targeted a row that does not exist.
        Missing { message: String } => "repository row missing: {message}",
        /// The store returned something it promised not to.
        Invariant { message: String } => "repository invariant violated: {message}",
        /// A write was attempted with no active unit of work.
        WriteOutsideUnitOfWork => "repository writes require an active unit of work",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => {
                Self::service_unavailable(format!("storage unavailable: {message}"))
            }
            RepositoryError::Conflict { message } => Self::conflict(message),
            RepositoryError::Missing { message } => Self::not_found(message),
            other => Self::internal(other.to_string()),
        }
    }
}

/// Builds a read-only view of an entity.
pub trait Projection<E: Entity>: Send + Sync + 'static {
    /// Project one entity.
    fn project(entity: &E) -> Self;
}

impl Projection<User> for UserSummary {
    fn project(entity: &User) -> Self {
        Self::from(entity)
    }
}

/// CRUD access to one entity type.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch one entity, or `None` when it does not exist.
    async fn get_one_by_id(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;

    /// Fetch every entity in insertion order.
    async fn get_all(&self) -> Result<Vec<E>, RepositoryError>;

    /// Stage a new entity and return it with its assigned id.
    async fn create(&self, draft: E::Draft) -> Result<E, RepositoryError>;

    /// Stage new field values for an existing entity.
    async fn update(&self, entity: &E) -> Result<(), RepositoryError>;

    /// Stage removal of an entity, returning it when it existed.
    async fn delete(&self, id: E::Id) -> Result<Option<E>, RepositoryError>;
}

/// Projected reads computed by the store.
///
/// Adapters select only the projected columns; fields outside the projection
/// are never read.
#[async_trait]
pub trait ProjectingRepository<E: Entity, P: Projection<E>>: Repository<E> {
    /// Fetch every entity's projection in insertion order.
    async fn get_all_projected(&self) -> Result<Vec<P>, RepositoryError>;
}

/// Users with lookup by login name.
#[async_trait]
pub trait UserRepository: ProjectingRepository<User, UserSummary> {
    /// Find the user with exactly this username.
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait WorkoutPlanRepository: Repository<WorkoutPlan> {
    /// Plans owned by `user_id`, oldest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WorkoutPlan>, RepositoryError>;
}

#[async_trait]
pub trait WorkoutSessionRepository: Repository<WorkoutSession> {
    /// Sessions following `plan_id`, oldest first.
    async fn list_for_plan(&self, plan_id: PlanId)
    -> Result<Vec<WorkoutSession>, RepositoryError>;
}

#[async_trait]
pub trait ExerciseSetRepository: Repository<ExerciseSet> {
    /// Sets logged in `session_id`, in logging order.
    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ExerciseSet>, RepositoryError>;
}

#[async_trait]
pub trait BodyTrackRepository: Repository<BodyTrack> {
    /// Measurements recorded for `user_id`, by date and then by id.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<BodyTrack>, RepositoryError>;
}
