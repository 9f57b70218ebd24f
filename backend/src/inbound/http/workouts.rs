//! Exercise catalogue, workout plan and session handlers.
//!
//! ```text
//! POST /api/v1/exercises            {"name","imageUrl"?,"targetMuscles"?}
//! GET  /api/v1/exercises
//! POST /api/v1/users/{id}/plans     {"name","membershipTier"?}
//! GET  /api/v1/users/{id}/plans
//! POST /api/v1/sessions             {"date":"2024-05-01","planId"?}
//! GET  /api/v1/sessions/{id}
//! POST /api/v1/sessions/{id}/sets   {"exerciseId","weight","reps","restTime"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    CreateExerciseRequest, CreateWorkoutPlanRequest, Error, Exercise, ExerciseId, ExerciseSet,
    ListExercisesRequest, LogExerciseSetRequest, MembershipTier, SessionId,
    StartWorkoutSessionRequest, UserId, WorkoutPlan, WorkoutSession, WorkoutSessionDetail,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/users/{id}/plans`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlanBody {
    #[schema(example = "Push day")]
    pub name: String,
    /// Defaults to the owner's tier.
    #[serde(default)]
    pub membership_tier: Option<MembershipTier>,
}

/// Body for `POST /api/v1/sessions/{id}/sets`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSetBody {
    pub exercise_id: ExerciseId,
    /// Kilograms.
    #[schema(example = 80)]
    pub weight: i32,
    #[schema(example = 5)]
    pub reps: i32,
    /// Seconds.
    #[schema(example = 120)]
    pub rest_time: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/exercises",
    request_body = CreateExerciseRequest,
    responses(
        (status = 201, description = "Exercise created", body = Exercise),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["exercises"],
    operation_id = "createExercise"
)]
#[post("/exercises")]
pub async fn create_exercise(
    state: web::Data<HttpState>,
    payload: web::Json<CreateExerciseRequest>,
) -> ApiResult<HttpResponse> {
    let exercise = state
        .workouts
        .create_exercise
        .execute(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(exercise))
}

#[utoipa::path(
    get,
    path = "/api/v1/exercises",
    responses((status = 200, description = "Exercise catalogue", body = [Exercise])),
    tags = ["exercises"],
    operation_id = "listExercises"
)]
#[get("/exercises")]
pub async fn list_exercises(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Exercise>>> {
    let exercises = state
        .workouts
        .list_exercises
        .execute(ListExercisesRequest)
        .await?;
    Ok(web::Json(exercises))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/plans",
    params(("id" = i32, Path, description = "Owner id")),
    request_body = WorkoutPlanBody,
    responses(
        (status = 201, description = "Plan created", body = WorkoutPlan),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["plans"],
    operation_id = "createWorkoutPlan"
)]
#[post("/users/{id}/plans")]
pub async fn create_plan(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
    payload: web::Json<WorkoutPlanBody>,
) -> ApiResult<HttpResponse> {
    let WorkoutPlanBody {
        name,
        membership_tier,
    } = payload.into_inner();
    let request = CreateWorkoutPlanRequest {
        user_id: id.into_inner(),
        name,
        membership_tier,
    };
    let plan = state.workouts.create_plan.execute(request).await?;
    Ok(HttpResponse::Created().json(plan))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/plans",
    params(("id" = i32, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Plans owned by the user", body = [WorkoutPlan]),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["plans"],
    operation_id = "listWorkoutPlans"
)]
#[get("/users/{id}/plans")]
pub async fn list_plans(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<WorkoutPlan>>> {
    let plans = state.workouts.list_plans.execute(id.into_inner()).await?;
    Ok(web::Json(plans))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    request_body = StartWorkoutSessionRequest,
    responses(
        (status = 201, description = "Session started", body = WorkoutSession),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such plan", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "startWorkoutSession"
)]
#[post("/sessions")]
pub async fn start_session(
    state: web::Data<HttpState>,
    payload: web::Json<StartWorkoutSessionRequest>,
) -> ApiResult<HttpResponse> {
    let session = state
        .workouts
        .start_session
        .execute(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(session))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}",
    params(("id" = i32, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session with its sets", body = WorkoutSessionDetail),
        (status = 404, description = "No such session", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "getWorkoutSession"
)]
#[get("/sessions/{id}")]
pub async fn get_session(
    state: web::Data<HttpState>,
    id: web::Path<SessionId>,
) -> ApiResult<web::Json<WorkoutSessionDetail>> {
    let detail = state.workouts.get_session.execute(id.into_inner()).await?;
    Ok(web::Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/sets",
    params(("id" = i32, Path, description = "Session id")),
    request_body = ExerciseSetBody,
    responses(
        (status = 201, description = "Set logged", body = ExerciseSet),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such session or exercise", body = Error)
    ),
    tags = ["sessions"],
    operation_id = "logExerciseSet"
)]
#[post("/sessions/{id}/sets")]
pub async fn log_set(
    state: web::Data<HttpState>,
    id: web::Path<SessionId>,
    payload: web::Json<ExerciseSetBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = LogExerciseSetRequest {
        session_id: id.into_inner(),
        exercise_id: body.exercise_id,
        weight: body.weight,
        reps: body.reps,
        rest_time: body.rest_time,
    };
    let set = state.workouts.log_set.execute(request).await?;
    Ok(HttpResponse::Created().json(set))
}

#[cfg(test)]
#[path = "workouts_tests.rs"]
mod tests;
