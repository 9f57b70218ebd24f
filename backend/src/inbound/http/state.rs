//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see use-case ports.
//! Validation, units of work and storage are composed behind them by
//! [`crate::composition`].

use std::sync::Arc;

use crate::domain::ports::{MutationUseCase, QueryUseCase};
use crate::domain::{
    BodyTrack, ChangeMembershipTierRequest, CreateExerciseRequest, CreateUserRequest, CreateUserResponse,
    CreateWorkoutPlanRequest, Exercise, ExerciseSet, GetUsersRequest, ListExercisesRequest,
    LogExerciseSetRequest, LoginRequest, RecordBodyTrackRequest, SessionId, StartWorkoutSessionRequest, UserId,
    UserSummary, WorkoutPlan, WorkoutSession, WorkoutSessionDetail,
};

pub type Mutation<Req, Resp> = Arc<dyn MutationUseCase<Req, Resp>>;
pub type Query<Req, Resp> = Arc<dyn QueryUseCase<Req, Resp>>;

/// User account and body measurement operations.
#[derive(Clone)]
pub struct UserPorts {
    pub create_user: Mutation<CreateUserRequest, CreateUserResponse>,
    pub get_users: Query<GetUsersRequest, Vec<UserSummary>>,
    pub get_user: Query<UserId, UserSummary>,
    pub change_membership_tier: Mutation<ChangeMembershipTierRequest, UserSummary>,
    pub delete_user: Mutation<UserId, ()>,
    pub record_body_track: Mutation<RecordBodyTrackRequest, BodyTrack>,
    pub list_body_tracks: Query<UserId, Vec<BodyTrack>>,
    pub login: Query<LoginRequest, UserSummary>,
}

/// Exercise catalogue, plan and session operations.
#[derive(Clone)]
pub struct WorkoutPorts {
    pub create_exercise: Mutation<CreateExerciseRequest, Exercise>,
    pub list_exercises: Query<ListExercisesRequest, Vec<Exercise>>,
    pub create_plan: Mutation<CreateWorkoutPlanRequest, WorkoutPlan>,
    pub list_plans: Query<UserId, Vec<WorkoutPlan>>,
    pub start_session: Mutation<StartWorkoutSessionRequest, WorkoutSession>,
    pub log_set: Mutation<LogExerciseSetRequest, ExerciseSet>,
    pub get_session: Query<SessionId, WorkoutSessionDetail>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: UserPorts,
    pub workouts: WorkoutPorts,
}

impl HttpState {
    pub fn new(users: UserPorts, workouts: WorkoutPorts) -> Self {
        Self { users, workouts }
    }
}
