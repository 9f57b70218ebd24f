//! Domain primitives, entities and use cases.
//!
//! Purpose: define the strongly typed fitness entities, the ports adapters
//! implement, and the application operations composed on top of them.
//! Nothing here depends on actix or diesel.
//!
//! Public surface:
//! - [`Entity`] and [`EntityId`]: the contract every persisted type meets.
//! - [`UnitOfWork`] and [`MutationPipeline`]: transactional execution of
//!   mutations behind cheap validation.
//! - [`Error`] and [`ErrorCode`]: the API error payload.
//! - One module per group of use cases.

pub mod body_track;
pub mod entity;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod trace_id;
pub mod unit_of_work;
pub mod user;
mod validation;
pub mod workout;

pub mod body_track_service;
pub mod create_user;
pub mod get_users;
pub mod user_account_service;
pub mod workout_service;

pub use self::body_track::{
    BodyTrack, BodyTrackId, BodyTrackValidationError, NewBodyTrack, validate_measurements,
};
pub use self::entity::{Entity, EntityId, Reference, UniqueKey};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::pipeline::MutationPipeline;
pub use self::trace_id::TraceId;
pub use self::unit_of_work::UnitOfWork;
pub use self::user::{
    Email, MembershipTier, NewUser, PasswordHash, UnknownMembershipTier, User, UserId,
    UserSummary, UserValidationError, Username,
};
pub use self::workout::{
    Exercise, ExerciseId, ExerciseSet, Muscle, NewExercise, NewExerciseSet, NewWorkoutPlan,
    NewWorkoutSession, PlanId, SessionId, SetId, TargetMuscles, UnknownMuscle, WorkoutPlan,
    WorkoutSession, WorkoutValidationError,
};

pub use self::body_track_service::{
    ListBodyTracks, RecordBodyTrack, RecordBodyTrackRequest, RecordBodyTrackValidator,
};
pub use self::create_user::{
    CreateUserRequest, CreateUserResponse, CreateUserService, CreateUserUseCase,
    CreateUserValidator,
};
pub use self::get_users::{GetUsersRequest, GetUsersService, GetUsersUseCase};
pub use self::user_account_service::{
    AuthenticateUser, ChangeMembershipTier, ChangeMembershipTierRequest, DeleteUser, GetUser,
    LoginRequest, LoginValidator,
};
pub use self::workout_service::{
    CreateExercise, CreateExerciseRequest, CreateExerciseValidator, CreateWorkoutPlan,
    CreateWorkoutPlanRequest, CreateWorkoutPlanValidator, GetWorkoutSession, ListExercises,
    ListExercisesRequest, ListWorkoutPlans, LogExerciseSet, LogExerciseSetRequest,
    LogExerciseSetValidator, StartWorkoutSession, StartWorkoutSessionRequest,
    WorkoutSessionDetail,
};
