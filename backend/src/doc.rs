//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] lists every HTTP endpoint under `/api/v1`, the health checks,
//! and the domain payloads they exchange. The document is served by Swagger
//! UI in debug builds and printed by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{
    BodyTrack, CreateExerciseRequest, CreateUserRequest, CreateUserResponse, Error, ErrorCode, Exercise,
    ExerciseSet, LoginRequest, MembershipTier, Muscle, StartWorkoutSessionRequest, UserSummary,
    WorkoutPlan, WorkoutSession, WorkoutSessionDetail,
};
use crate::inbound::http::body_tracks::BodyTrackBody;
use crate::inbound::http::users::MembershipTierBody;
use crate::inbound::http::workouts::{ExerciseSetBody, WorkoutPlanBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FitTrack API",
        description = "Users, body measurements, exercises, workout plans and training sessions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::change_membership_tier,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::login,
        crate::inbound::http::body_tracks::record_body_track,
        crate::inbound::http::body_tracks::list_body_tracks,
        crate::inbound::http::workouts::create_exercise,
        crate::inbound::http::workouts::list_exercises,
        crate::inbound::http::workouts::create_plan,
        crate::inbound::http::workouts::list_plans,
        crate::inbound::http::workouts::start_session,
        crate::inbound::http::workouts::get_session,
        crate::inbound::http::workouts::log_set,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CreateUserRequest,
        CreateUserResponse,
        UserSummary,
        MembershipTier,
        MembershipTierBody,
        LoginRequest,
        BodyTrackBody,
        BodyTrack,
        CreateExerciseRequest,
        Exercise,
        Muscle,
        WorkoutPlanBody,
        WorkoutPlan,
        StartWorkoutSessionRequest,
        WorkoutSession,
        ExerciseSetBody,
        ExerciseSet,
        WorkoutSessionDetail,
    )),
    tags(
        (name = "users", description = "Registration, membership and login"),
        (name = "body-tracks", description = "Weight and height measurements of users"),
        (name = "exercises", description = "Exercise catalogue"),
        (name = "plans", description = "Workout plans owned by users"),
        (name = "sessions", description = "Training sessions and logged sets"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
