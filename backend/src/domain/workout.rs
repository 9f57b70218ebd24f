//! Exercises, workout plans, sessions and logged sets.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::{Entity, Reference, define_entity_id};
use super::user::{MembershipTier, User, UserId};

define_entity_id! {
    /// Exercise catalogue identifier.
    ExerciseId
}

define_entity_id! {
    /// Workout plan identifier.
    PlanId
}

define_entity_id! {
    /// Workout session identifier.
    SessionId
}

define_entity_id! {
    /// Logged set identifier.
    SetId
}

/// Muscle group an exercise targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Muscle {
    Quads,
    Hamstring,
    Calves,
    Glutes,
    Back,
    Chest,
    Shoulders,
    Triceps,
    Biceps,
    Traps,
}

impl Muscle {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quads => "Quads",
            Self::Hamstring => "Hamstring",
            Self::Calves => "Calves",
            Self::Glutes => "Glutes",
            Self::Back => "Back",
            Self::Chest => "Chest",
            Self::Shoulders => "Shoulders",
            Self::Triceps => "Triceps",
            Self::Biceps => "Biceps",
            Self::Traps => "Traps",
        }
    }
}

impl fmt::Display for Muscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored muscle name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown muscle: {0}")]
pub struct UnknownMuscle(pub String);

impl FromStr for Muscle {
    type Err = UnknownMuscle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Quads,
            Self::Hamstring,
            Self::Calves,
            Self::Glutes,
            Self::Back,
            Self::Chest,
            Self::Shoulders,
            Self::Triceps,
            Self::Biceps,
            Self::Traps,
        ]
        .into_iter()
        .find(|muscle| muscle.as_str() == s)
        .ok_or_else(|| UnknownMuscle(s.to_owned()))
    }
}

/// Validation failures for workout values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkoutValidationError {
    #[error("exercise name must not be empty")]
    EmptyExerciseName,
    #[error("plan name must not be empty")]
    EmptyPlanName,
    #[error("an exercise targets at most {max} muscles")]
    TooManyMuscles { max: usize },
    #[error("muscle {0} is listed more than once")]
    DuplicateMuscle(Muscle),
    #[error("reps must be positive")]
    NonPositiveReps,
    #[error("weight must not be negative")]
    NegativeWeight,
    #[error("rest time must not be negative")]
    NegativeRestTime,
}

/// Up to three distinct muscles, in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "Vec<Muscle>", into = "Vec<Muscle>")]
pub struct TargetMuscles(Vec<Muscle>);

impl TargetMuscles {
    /// Maximum number of muscles an exercise may target.
    pub const MAX: usize = 3;

    /// Validate a muscle list.
    pub fn new(muscles: Vec<Muscle>) -> Result<Self, WorkoutValidationError> {
        if muscles.len() > Self::MAX {
            return Err(WorkoutValidationError::TooManyMuscles { max: Self::MAX });
        }
        for (position, muscle) in muscles.iter().enumerate() {
            if muscles.iter().take(position).any(|seen| seen == muscle) {
                return Err(WorkoutValidationError::DuplicateMuscle(*muscle));
            }
        }
        Ok(Self(muscles))
    }

    /// Muscles in declaration order.
    pub fn as_slice(&self) -> &[Muscle] {
        &self.0
    }

    /// The muscle at `slot` (0-based), if any.
    pub fn slot(&self, slot: usize) -> Option<Muscle> {
        self.0.get(slot).copied()
    }
}

impl TryFrom<Vec<Muscle>> for TargetMuscles {
    type Error = WorkoutValidationError;

    fn try_from(value: Vec<Muscle>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetMuscles> for Vec<Muscle> {
    fn from(value: TargetMuscles) -> Self {
        value.0
    }
}

/// An exercise before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub image_url: Option<String>,
    pub target_muscles: TargetMuscles,
}

/// Catalogue exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,
    #[schema(example = "Back squat")]
    pub name: String,
    pub image_url: Option<String>,
    pub target_muscles: TargetMuscles,
}

impl Entity for Exercise {
    type Id = ExerciseId;
    type Draft = NewExercise;

    const KIND: &'static str = "exercise";

    fn id(&self) -> ExerciseId {
        self.id
    }

    fn from_draft(id: ExerciseId, draft: NewExercise) -> Self {
        Self {
            id,
            name: draft.name,
            image_url: draft.image_url,
            target_muscles: draft.target_muscles,
        }
    }
}

/// A workout plan before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkoutPlan {
    pub user_id: UserId,
    pub name: String,
    pub membership_tier: MembershipTier,
}

/// A named plan owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: PlanId,
    pub user_id: UserId,
    #[schema(example = "Push day")]
    pub name: String,
    pub membership_tier: MembershipTier,
}

impl Entity for WorkoutPlan {
    type Id = PlanId;
    type Draft = NewWorkoutPlan;

    const KIND: &'static str = "workout plan";

    fn id(&self) -> PlanId {
        self.id
    }

    fn from_draft(id: PlanId, draft: NewWorkoutPlan) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            membership_tier: draft.membership_tier,
        }
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<User>(self.user_id)]
    }
}

/// A session before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkoutSession {
    pub date: NaiveDate,
    pub plan_id: Option<PlanId>,
}

/// One training day, optionally following a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: SessionId,
    pub date: NaiveDate,
    pub plan_id: Option<PlanId>,
}

impl WorkoutSession {
    /// Copy of this session detached from its plan.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.plan_id = None;
        self
    }
}

impl Entity for WorkoutSession {
    type Id = SessionId;
    type Draft = NewWorkoutSession;

    const KIND: &'static str = "workout session";

    fn id(&self) -> SessionId {
        self.id
    }

    fn from_draft(id: SessionId, draft: NewWorkoutSession) -> Self {
        Self {
            id,
            date: draft.date,
            plan_id: draft.plan_id,
        }
    }

    fn references(&self) -> Vec<Reference> {
        self.plan_id
            .map(Reference::to::<WorkoutPlan>)
            .into_iter()
            .collect()
    }
}

/// A set before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExerciseSet {
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    pub weight: i32,
    pub reps: i32,
    pub rest_time: i32,
}

/// One logged set: weight in kilograms, rest time in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: SetId,
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    #[schema(example = 80)]
    pub weight: i32,
    #[schema(example = 5)]
    pub reps: i32,
    #[schema(example = 120)]
    pub rest_time: i32,
}

impl Entity for ExerciseSet {
    type Id = SetId;
    type Draft = NewExerciseSet;

    const KIND: &'static str = "exercise set";

    fn id(&self) -> SetId {
        self.id
    }

    fn from_draft(id: SetId, draft: NewExerciseSet) -> Self {
        Self {
            id,
            session_id: draft.session_id,
            exercise_id: draft.exercise_id,
            weight: draft.weight,
            reps: draft.reps,
            rest_time: draft.rest_time,
        }
    }

    fn references(&self) -> Vec<Reference> {
        vec![
            Reference::to::<WorkoutSession>(self.session_id),
            Reference::to::<Exercise>(self.exercise_id),
        ]
    }
}
