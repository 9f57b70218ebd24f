//! Unit-of-work behaviour against a real PostgreSQL database.
//!
//! Runs only when `FITTRACK_TEST_DATABASE_URL` names a disposable database;
//! the schema is migrated and every table truncated first.

use std::sync::Arc;

use diesel::{Connection, PgConnection, RunQueryDsl};
use fittrack::composition::Repositories;
use fittrack::domain::ports::{Repository, RepositoryError};
use fittrack::domain::{
    Email, Error, ErrorCode, MembershipTier, NewUser, NewWorkoutPlan, PasswordHash, UnitOfWork,
    UserId, Username,
};
use fittrack::outbound::persistence::{DbPool, PgTransactionManager, PoolConfig, apply_migrations};
use rstest::rstest;

const DATABASE_URL_VAR: &str = "FITTRACK_TEST_DATABASE_URL";

fn user(name: &str) -> NewUser {
    NewUser {
        username: Username::new(name).expect("valid username"),
        email: Email::new(format!("{name}@example.com")).expect("valid email"),
        password_hash: PasswordHash::new("fixture$terces").expect("valid hash"),
        membership_tier: MembershipTier::Basic,
    }
}

fn reset(url: &str) {
    let mut conn = PgConnection::establish(url).expect("connect for reset");
    diesel::sql_query(
        "TRUNCATE body_tracks, exercise_sets, workout_sessions, workout_plans, exercises, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(&mut conn)
    .expect("truncate tables");
}

#[rstest]
#[tokio::test]
async fn postgres_units_of_work_commit_roll_back_and_defer_constraints() {
    let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
        return;
    };
    apply_migrations(&url).await.expect("migrations apply");
    reset(&url);

    let pool = DbPool::new(PoolConfig::new(url.clone()).with_max_size(2))
        .await
        .expect("pool builds");
    let repos = Repositories::postgres(&pool);
    let unit_of_work = UnitOfWork::new(Arc::new(PgTransactionManager::new(pool)));

    let users = Arc::clone(&repos.users);
    let alice = unit_of_work
        .execute(move || async move { Ok::<_, Error>(users.create(user("alice")).await?) })
        .await
        .expect("commit succeeds");
    let stored = repos
        .users
        .get_one_by_id(alice.id())
        .await
        .expect("read")
        .expect("alice committed");
    assert_eq!(stored, alice);

    let users = Arc::clone(&repos.users);
    let err = unit_of_work
        .execute(move || async move {
            users.create(user("bob")).await?;
            Err::<(), _>(Error::invalid_request("changed my mind"))
        })
        .await
        .expect_err("operation fails");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(repos.users.get_all().await.expect("read").len(), 1);

    let users = Arc::clone(&repos.users);
    let err = unit_of_work
        .execute(move || async move { Ok::<_, Error>(users.create(user("alice")).await?) })
        .await
        .expect_err("duplicate username");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let plans = Arc::clone(&repos.plans);
    let err = unit_of_work
        .execute(move || async move {
            Ok::<_, Error>(
                plans
                    .create(NewWorkoutPlan {
                        user_id: UserId::new(9_999),
                        name: "Orphan".to_owned(),
                        membership_tier: MembershipTier::Basic,
                    })
                    .await?,
            )
        })
        .await
        .expect_err("dangling owner rejected at flush");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert!(repos.plans.get_all().await.expect("read").is_empty());

    let users = Arc::clone(&repos.users);
    let err = users
        .create(user("carol"))
        .await
        .expect_err("writes need a unit of work");
    assert!(matches!(err, RepositoryError::WriteOutsideUnitOfWork));
}
