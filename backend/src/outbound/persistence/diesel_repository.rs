//! Diesel-backed repositories for every persisted entity.
//!
//! One generic [`DieselRepository`] type; the CRUD implementation for each
//! entity is stamped out by `impl_diesel_repository!` from its table, row and
//! values types. Statements run through [`run_query`], so writes land on the
//! ambient unit-of-work connection and reads outside one use the pool.

use std::marker::PhantomData;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use super::diesel_transaction::{Access, run_query};
use super::models::{
    BodyTrackRow, BodyTrackValues, ExerciseRow, ExerciseSetRow, ExerciseSetValues,
    ExerciseValues, UserRow, UserSummaryRow, UserValues, WorkoutPlanRow, WorkoutPlanValues,
    WorkoutSessionRow, WorkoutSessionValues,
};
use super::pool::DbPool;
use super::schema::{
    body_tracks, exercise_sets, exercises, users, workout_plans, workout_sessions,
};
use crate::domain::ports::{
    BodyTrackRepository, ExerciseSetRepository, ProjectingRepository, Repository,
    RepositoryError, UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
use crate::domain::{
    BodyTrack, Entity, EntityId as _, Exercise, ExerciseSet, PlanId, SessionId, User, UserId,
    UserSummary, Username, WorkoutPlan, WorkoutSession,
};

/// PostgreSQL repository for entity `E`.
pub struct DieselRepository<E> {
    pool: DbPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for DieselRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> DieselRepository<E> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

fn convert_all<R, E>(rows: Vec<R>) -> Result<Vec<E>, RepositoryError>
where
    E: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(E::try_from).collect()
}

macro_rules! impl_diesel_repository {
    ($entity:ty, $table:ident, $row:ident, $values:ident) => {
        #[async_trait]
        impl Repository<$entity> for DieselRepository<$entity> {
            async fn get_one_by_id(
                &self,
                id: <$entity as Entity>::Id,
            ) -> Result<Option<$entity>, RepositoryError> {
                let row = run_query(&self.pool, Access::Read, move |conn| {
                    async move {
                        $table::table
                            .find(id.get())
                            .select($row::as_select())
                            .first::<$row>(conn)
                            .await
                            .optional()
                    }
                    .scope_boxed()
                })
                .await?;
                row.map(<$entity>::try_from).transpose()
            }

            async fn get_all(&self) -> Result<Vec<$entity>, RepositoryError> {
                let rows = run_query(&self.pool, Access::Read, |conn| {
                    async move {
                        $table::table
                            .select($row::as_select())
                            .order($table::id.asc())
                            .load::<$row>(conn)
                            .await
                    }
                    .scope_boxed()
                })
                .await?;
                convert_all(rows)
            }

            async fn create(
                &self,
                draft: <$entity as Entity>::Draft,
            ) -> Result<$entity, RepositoryError> {
                let row = run_query(&self.pool, Access::Write, move |conn| {
                    async move {
                        diesel::insert_into($table::table)
                            .values($values::from(&draft))
                            .returning($row::as_returning())
                            .get_result::<$row>(conn)
                            .await
                            .optional()
                    }
                    .scope_boxed()
                })
                .await?
                .ok_or_else(|| {
                    RepositoryError::invariant(concat!(
                        "insert into ",
                        stringify!($table),
                        " returned no row"
                    ))
                })?;
                <$entity>::try_from(row)
            }

            async fn update(&self, entity: &$entity) -> Result<(), RepositoryError> {
                let id = entity.id();
                let values = $values::from(entity);
                let updated = run_query(&self.pool, Access::Write, move |conn| {
                    async move {
                        diesel::update($table::table.find(id.get()))
                            .set(values)
                            .execute(conn)
                            .await
                    }
                    .scope_boxed()
                })
                .await?;
                if updated == 0 {
                    return Err(RepositoryError::missing(format!(
                        "{} {id} does not exist",
                        <$entity as Entity>::KIND
                    )));
                }
                Ok(())
            }

            async fn delete(
                &self,
                id: <$entity as Entity>::Id,
            ) -> Result<Option<$entity>, RepositoryError> {
                let row = run_query(&self.pool, Access::Write, move |conn| {
                    async move {
                        diesel::delete($table::table.find(id.get()))
                            .returning($row::as_returning())
                            .get_result::<$row>(conn)
                            .await
                            .optional()
                    }
                    .scope_boxed()
                })
                .await?;
                row.map(<$entity>::try_from).transpose()
            }
        }
    };
}

impl_diesel_repository!(User, users, UserRow, UserValues);
impl_diesel_repository!(Exercise, exercises, ExerciseRow, ExerciseValues);
impl_diesel_repository!(WorkoutPlan, workout_plans, WorkoutPlanRow, WorkoutPlanValues);
impl_diesel_repository!(
    WorkoutSession,
    workout_sessions,
    WorkoutSessionRow,
    WorkoutSessionValues
);
impl_diesel_repository!(ExerciseSet, exercise_sets, ExerciseSetRow, ExerciseSetValues);
impl_diesel_repository!(BodyTrack, body_tracks, BodyTrackRow, BodyTrackValues);

#[async_trait]
impl ProjectingRepository<User, UserSummary> for DieselRepository<User> {
    /// Reads only the summary columns; password hashes never leave the database.
    async fn get_all_projected(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = run_query(&self.pool, Access::Read, |conn| {
            async move {
                users::table
                    .select(UserSummaryRow::as_select())
                    .order(users::id.asc())
                    .load::<UserSummaryRow>(conn)
                    .await
            }
            .scope_boxed()
        })
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl UserRepository for DieselRepository<User> {
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let username = username.as_str().to_owned();
        let row = run_query(&self.pool, Access::Read, move |conn| {
            async move {
                users::table
                    .filter(users::username.eq(username))
                    .select(UserRow::as_select())
                    .first::<UserRow>(conn)
                    .await
                    .optional()
            }
            .scope_boxed()
        })
        .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl WorkoutPlanRepository for DieselRepository<WorkoutPlan> {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WorkoutPlan>, RepositoryError> {
        let rows = run_query(&self.pool, Access::Read, move |conn| {
            async move {
                workout_plans::table
                    .filter(workout_plans::user_id.eq(user_id.get()))
                    .select(WorkoutPlanRow::as_select())
                    .order(workout_plans::id.asc())
                    .load::<WorkoutPlanRow>(conn)
                    .await
            }
            .scope_boxed()
        })
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl WorkoutSessionRepository for DieselRepository<WorkoutSession> {
    async fn list_for_plan(
        &self,
        plan_id: PlanId,
    ) -> Result<Vec<WorkoutSession>, RepositoryError> {
        let rows = run_query(&self.pool, Access::Read, move |conn| {
            async move {
                workout_sessions::table
                    .filter(workout_sessions::plan_id.eq(plan_id.get()))
                    .select(WorkoutSessionRow::as_select())
                    .order(workout_sessions::id.asc())
                    .load::<WorkoutSessionRow>(conn)
                    .await
            }
            .scope_boxed()
        })
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl ExerciseSetRepository for DieselRepository<ExerciseSet> {
    async fn list_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<ExerciseSet>, RepositoryError> {
        let rows = run_query(&self.pool, Access::Read, move |conn| {
            async move {
                exercise_sets::table
                    .filter(exercise_sets::session_id.eq(session_id.get()))
                    .select(ExerciseSetRow::as_select())
                    .order(exercise_sets::id.asc())
                    .load::<ExerciseSetRow>(conn)
                    .await
            }
            .scope_boxed()
        })
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl BodyTrackRepository for DieselRepository<BodyTrack> {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<BodyTrack>, RepositoryError> {
        let rows = run_query(&self.pool, Access::Read, move |conn| {
            async move {
                body_tracks::table
                    .filter(body_tracks::user_id.eq(user_id.get()))
                    .select(BodyTrackRow::as_select())
                    .order((body_tracks::track_date.asc(), body_tracks::id.asc()))
                    .load::<BodyTrackRow>(conn)
                    .await
            }
            .scope_boxed()
        })
        .await?;
        convert_all(rows)
    }
}
