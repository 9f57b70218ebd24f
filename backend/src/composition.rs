//! Wiring of repositories, transaction managers and use cases into
//! [`HttpState`].
//!
//! Every mutation is wrapped in a [`MutationPipeline`] sharing one
//! transaction manager, so the repositories handed to the inner use cases
//! must belong to the same storage as that manager.

use std::sync::Arc;

use crate::domain::ports::{
    BodyTrackRepository, ExerciseSetRepository, NoCheapChecks, PasswordHasher, Repository,
    TransactionManager, UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
use crate::domain::{
    AuthenticateUser, BodyTrack, ChangeMembershipTier, CreateExercise, CreateExerciseValidator,
    CreateUserService, CreateUserUseCase, CreateUserValidator, CreateWorkoutPlan,
    CreateWorkoutPlanValidator, DeleteUser, Exercise, ExerciseSet, GetUser, GetUsersService,
    GetUsersUseCase, GetWorkoutSession, ListBodyTracks, ListExercises, ListWorkoutPlans,
    LogExerciseSet, LogExerciseSetValidator, MutationPipeline, RecordBodyTrack,
    RecordBodyTrackValidator, StartWorkoutSession, UnitOfWork, User, WorkoutPlan, WorkoutSession,
};
use crate::inbound::http::state::{HttpState, UserPorts, WorkoutPorts};
use crate::outbound::memory::InMemoryStore;
use crate::outbound::persistence::{DbPool, DieselRepository, PgTransactionManager};

/// One repository per entity, all backed by the same storage.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub exercises: Arc<dyn Repository<Exercise>>,
    pub plans: Arc<dyn WorkoutPlanRepository>,
    pub sessions: Arc<dyn WorkoutSessionRepository>,
    pub sets: Arc<dyn ExerciseSetRepository>,
    pub body_tracks: Arc<dyn BodyTrackRepository>,
}

impl Repositories {
    /// Tables held by `store`. Use `store` as the transaction manager.
    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            users: Arc::new(store.repository::<User>()),
            exercises: Arc::new(store.repository::<Exercise>()),
            plans: Arc::new(store.repository::<WorkoutPlan>()),
            sessions: Arc::new(store.repository::<WorkoutSession>()),
            sets: Arc::new(store.repository::<ExerciseSet>()),
            body_tracks: Arc::new(store.repository::<BodyTrack>()),
        }
    }

    /// Diesel repositories sharing `pool`.
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselRepository::<User>::new(pool.clone())),
            exercises: Arc::new(DieselRepository::<Exercise>::new(pool.clone())),
            plans: Arc::new(DieselRepository::<WorkoutPlan>::new(pool.clone())),
            sessions: Arc::new(DieselRepository::<WorkoutSession>::new(pool.clone())),
            sets: Arc::new(DieselRepository::<ExerciseSet>::new(pool.clone())),
            body_tracks: Arc::new(DieselRepository::<BodyTrack>::new(pool.clone())),
        }
    }
}

/// Build the handler state over `repos`, committing mutations through
/// `transactions`.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use fittrack::composition::{Repositories, wire};
/// use fittrack::domain::ports::FixturePasswordHasher;
/// use fittrack::outbound::memory::InMemoryStore;
///
/// let store = Arc::new(InMemoryStore::new());
/// let repos = Repositories::in_memory(&store);
/// let _state = wire(store, repos, Arc::new(FixturePasswordHasher));
/// ```
pub fn wire<M: TransactionManager>(
    transactions: Arc<M>,
    repos: Repositories,
    hasher: Arc<dyn PasswordHasher>,
) -> HttpState {
    let unit_of_work = UnitOfWork::new(transactions);
    let Repositories {
        users,
        exercises,
        plans,
        sessions,
        sets,
        body_tracks,
    } = repos;

    let user_ports = UserPorts {
        create_user: Arc::new(MutationPipeline::new(
            CreateUserValidator,
            unit_of_work.clone(),
            CreateUserUseCase::new(CreateUserService::new(users.clone(), hasher.clone())),
        )),
        get_users: Arc::new(GetUsersUseCase::new(GetUsersService::new(users.clone()))),
        get_user: Arc::new(GetUser::new(users.clone())),
        change_membership_tier: Arc::new(MutationPipeline::new(
            NoCheapChecks,
            unit_of_work.clone(),
            ChangeMembershipTier::new(users.clone()),
        )),
        delete_user: Arc::new(MutationPipeline::new(
            NoCheapChecks,
            unit_of_work.clone(),
            DeleteUser::new(
                users.clone(),
                plans.clone(),
                sessions.clone(),
                body_tracks.clone(),
            ),
        )),
        record_body_track: Arc::new(MutationPipeline::new(
            RecordBodyTrackValidator,
            unit_of_work.clone(),
            RecordBodyTrack::new(users.clone(), body_tracks.clone()),
        )),
        list_body_tracks: Arc::new(ListBodyTracks::new(users.clone(), body_tracks)),
        login: Arc::new(AuthenticateUser::new(users.clone(), hasher)),
    };

    let workout_ports = WorkoutPorts {
        create_exercise: Arc::new(MutationPipeline::new(
            CreateExerciseValidator,
            unit_of_work.clone(),
            CreateExercise::new(exercises.clone()),
        )),
        list_exercises: Arc::new(ListExercises::new(exercises.clone())),
        create_plan: Arc::new(MutationPipeline::new(
            CreateWorkoutPlanValidator,
            unit_of_work.clone(),
            CreateWorkoutPlan::new(users.clone(), plans.clone()),
        )),
        list_plans: Arc::new(ListWorkoutPlans::new(users, plans.clone())),
        start_session: Arc::new(MutationPipeline::new(
            NoCheapChecks,
            unit_of_work.clone(),
            StartWorkoutSession::new(plans, sessions.clone()),
        )),
        log_set: Arc::new(MutationPipeline::new(
            LogExerciseSetValidator,
            unit_of_work,
            LogExerciseSet::new(sessions.clone(), exercises, sets.clone()),
        )),
        get_session: Arc::new(GetWorkoutSession::new(sessions, sets)),
    };

    HttpState::new(user_ports, workout_ports)
}

/// Handler state over a fresh [`InMemoryStore`].
pub fn wire_in_memory(hasher: Arc<dyn PasswordHasher>) -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    let repos = Repositories::in_memory(&store);
    wire(store, repos, hasher)
}

/// Handler state over PostgreSQL.
pub fn wire_postgres(pool: &DbPool, hasher: Arc<dyn PasswordHasher>) -> HttpState {
    let transactions = Arc::new(PgTransactionManager::new(pool.clone()));
    wire(transactions, Repositories::postgres(pool), hasher)
}
