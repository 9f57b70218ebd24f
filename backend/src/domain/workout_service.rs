//! Exercise catalogue, workout plans and logged sessions.
//!
//! Mutations here are inner use cases: wire each into a
//! [`MutationPipeline`](super::MutationPipeline) with its validator so the
//! repository writes run inside a unit of work.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ports::{
    CheapValidator, ExerciseSetRepository, MutationUseCase, QueryUseCase, Repository,
    UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
use super::user::is_blank;
use super::validation::field_error;
use super::{
    Error, Exercise, ExerciseId, ExerciseSet, MembershipTier, Muscle, NewExercise,
    NewExerciseSet, NewWorkoutPlan, NewWorkoutSession, PlanId, SessionId, TargetMuscles, UserId,
    WorkoutPlan, WorkoutSession, WorkoutValidationError,
};

fn missing(kind: &str, id: impl std::fmt::Display) -> Error {
    Error::not_found(format!("{kind} {id} does not exist"))
}

/// New catalogue exercise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    #[schema(example = "Back squat")]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// At most three distinct muscles.
    #[serde(default)]
    pub target_muscles: Vec<Muscle>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateExerciseValidator;

impl CheapValidator<CreateExerciseRequest> for CreateExerciseValidator {
    fn validate_cheap(&self, request: &CreateExerciseRequest) -> Result<(), Error> {
        if is_blank(&request.name) {
            return Err(field_error(WorkoutValidationError::EmptyExerciseName));
        }
        TargetMuscles::new(request.target_muscles.clone()).map_err(field_error)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct CreateExercise {
    exercises: Arc<dyn Repository<Exercise>>,
}

impl CreateExercise {
    pub fn new(exercises: Arc<dyn Repository<Exercise>>) -> Self {
        Self { exercises }
    }
}

#[async_trait]
impl MutationUseCase<CreateExerciseRequest, Exercise> for CreateExercise {
    async fn execute(&self, request: CreateExerciseRequest) -> Result<Exercise, Error> {
        let target_muscles = TargetMuscles::new(request.target_muscles).map_err(field_error)?;
        Ok(self
            .exercises
            .create(NewExercise {
                name: request.name,
                image_url: request.image_url,
                target_muscles,
            })
            .await?)
    }
}

/// Request for the whole catalogue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListExercisesRequest;

#[derive(Clone)]
pub struct ListExercises {
    exercises: Arc<dyn Repository<Exercise>>,
}

impl ListExercises {
    pub fn new(exercises: Arc<dyn Repository<Exercise>>) -> Self {
        Self { exercises }
    }
}

#[async_trait]
impl QueryUseCase<ListExercisesRequest, Vec<Exercise>> for ListExercises {
    async fn execute(&self, _request: ListExercisesRequest) -> Result<Vec<Exercise>, Error> {
        Ok(self.exercises.get_all().await?)
    }
}

/// New plan for an existing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkoutPlanRequest {
    pub user_id: UserId,
    pub name: String,
    /// Defaults to the owner's tier when omitted.
    pub membership_tier: Option<MembershipTier>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateWorkoutPlanValidator;

impl CheapValidator<CreateWorkoutPlanRequest> for CreateWorkoutPlanValidator {
    fn validate_cheap(&self, request: &CreateWorkoutPlanRequest) -> Result<(), Error> {
        if is_blank(&request.name) {
            return Err(field_error(WorkoutValidationError::EmptyPlanName));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct CreateWorkoutPlan {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn WorkoutPlanRepository>,
}

impl CreateWorkoutPlan {
    pub fn new(users: Arc<dyn UserRepository>, plans: Arc<dyn WorkoutPlanRepository>) -> Self {
        Self { users, plans }
    }
}

#[async_trait]
impl MutationUseCase<CreateWorkoutPlanRequest, WorkoutPlan> for CreateWorkoutPlan {
    async fn execute(&self, request: CreateWorkoutPlanRequest) -> Result<WorkoutPlan, Error> {
        let owner = self
            .users
            .get_one_by_id(request.user_id)
            .await?
            .ok_or_else(|| missing("user", request.user_id))?;
        let membership_tier = request
            .membership_tier
            .unwrap_or_else(|| owner.membership_tier());

        Ok(self
            .plans
            .create(NewWorkoutPlan {
                user_id: owner.id(),
                name: request.name,
                membership_tier,
            })
            .await?)
    }
}

/// Plans owned by one user.
#[derive(Clone)]
pub struct ListWorkoutPlans {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn WorkoutPlanRepository>,
}

impl ListWorkoutPlans {
    pub fn new(users: Arc<dyn UserRepository>, plans: Arc<dyn WorkoutPlanRepository>) -> Self {
        Self { users, plans }
    }
}

#[async_trait]
impl QueryUseCase<UserId, Vec<WorkoutPlan>> for ListWorkoutPlans {
    async fn execute(&self, user_id: UserId) -> Result<Vec<WorkoutPlan>, Error> {
        if self.users.get_one_by_id(user_id).await?.is_none() {
            return Err(missing("user", user_id));
        }
        Ok(self.plans.list_for_user(user_id).await?)
    }
}

/// Opens a session on `date`, optionally following a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkoutSessionRequest {
    #[schema(example = "2024-05-01")]
    pub date: NaiveDate,
    #[serde(default)]
    pub plan_id: Option<PlanId>,
}

#[derive(Clone)]
pub struct StartWorkoutSession {
    plans: Arc<dyn WorkoutPlanRepository>,
    sessions: Arc<dyn WorkoutSessionRepository>,
}

impl StartWorkoutSession {
    pub fn new(
        plans: Arc<dyn WorkoutPlanRepository>,
        sessions: Arc<dyn WorkoutSessionRepository>,
    ) -> Self {
        Self { plans, sessions }
    }
}

#[async_trait]
impl MutationUseCase<StartWorkoutSessionRequest, WorkoutSession> for StartWorkoutSession {
    async fn execute(&self, request: StartWorkoutSessionRequest) -> Result<WorkoutSession, Error> {
        if let Some(plan_id) = request.plan_id {
            if self.plans.get_one_by_id(plan_id).await?.is_none() {
                return Err(missing("workout plan", plan_id));
            }
        }
        Ok(self
            .sessions
            .create(NewWorkoutSession {
                date: request.date,
                plan_id: request.plan_id,
            })
            .await?)
    }
}

/// One set performed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogExerciseSetRequest {
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    pub weight: i32,
    pub reps: i32,
    pub rest_time: i32,
}

/// Rejects non-positive reps and negative weight or rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExerciseSetValidator;

impl CheapValidator<LogExerciseSetRequest> for LogExerciseSetValidator {
    fn validate_cheap(&self, request: &LogExerciseSetRequest) -> Result<(), Error> {
        let violation = if request.reps <= 0 {
            Some(WorkoutValidationError::NonPositiveReps)
        } else if request.weight < 0 {
            Some(WorkoutValidationError::NegativeWeight)
        } else if request.rest_time < 0 {
            Some(WorkoutValidationError::NegativeRestTime)
        } else {
            None
        };
        violation.map_or(Ok(()), |violation| Err(field_error(violation)))
    }
}

#[derive(Clone)]
pub struct LogExerciseSet {
    sessions: Arc<dyn WorkoutSessionRepository>,
    exercises: Arc<dyn Repository<Exercise>>,
    sets: Arc<dyn ExerciseSetRepository>,
}

impl LogExerciseSet {
    pub fn new(
        sessions: Arc<dyn WorkoutSessionRepository>,
        exercises: Arc<dyn Repository<Exercise>>,
        sets: Arc<dyn ExerciseSetRepository>,
    ) -> Self {
        Self {
            sessions,
            exercises,
            sets,
        }
    }
}

#[async_trait]
impl MutationUseCase<LogExerciseSetRequest, ExerciseSet> for LogExerciseSet {
    async fn execute(&self, request: LogExerciseSetRequest) -> Result<ExerciseSet, Error> {
        if self.sessions.get_one_by_id(request.session_id).await?.is_none() {
            return Err(missing("workout session", request.session_id));
        }
        if self.exercises.get_one_by_id(request.exercise_id).await?.is_none() {
            return Err(missing("exercise", request.exercise_id));
        }
        Ok(self
            .sets
            .create(NewExerciseSet {
                session_id: request.session_id,
                exercise_id: request.exercise_id,
                weight: request.weight,
                reps: request.reps,
                rest_time: request.rest_time,
            })
            .await?)
    }
}

/// A session with every set logged in it, in logging order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSessionDetail {
    pub session: WorkoutSession,
    pub sets: Vec<ExerciseSet>,
}

#[derive(Clone)]
pub struct GetWorkoutSession {
    sessions: Arc<dyn WorkoutSessionRepository>,
    sets: Arc<dyn ExerciseSetRepository>,
}

impl GetWorkoutSession {
    pub fn new(
        sessions: Arc<dyn WorkoutSessionRepository>,
        sets: Arc<dyn ExerciseSetRepository>,
    ) -> Self {
        Self { sessions, sets }
    }
}

#[async_trait]
impl QueryUseCase<SessionId, WorkoutSessionDetail> for GetWorkoutSession {
    async fn execute(&self, id: SessionId) -> Result<WorkoutSessionDetail, Error> {
        let session = self
            .sessions
            .get_one_by_id(id)
            .await?
            .ok_or_else(|| missing("workout session", id))?;
        let sets = self.sets.list_for_session(id).await?;
        Ok(WorkoutSessionDetail { session, sets })
    }
}

#[cfg(test)]
#[path = "workout_service_tests.rs"]
mod tests;
