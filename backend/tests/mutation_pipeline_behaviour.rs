//! Behavioural tests for the validate → transact → execute → commit pipeline
//! over the in-memory store.
//!
//! The recording decorators from `fittrack::test_support` log every validator,
//! transaction and repository call so each scenario can assert on order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fittrack::domain::ports::{
    FixturePasswordHasher, MutationUseCase, NoCheapChecks, QueryUseCase, Repository,
    UserRepository,
};
use fittrack::domain::{
    BodyTrack, CreateUserRequest, CreateUserService, CreateUserUseCase, CreateUserValidator, DeleteUser,
    Email, Error, ErrorCode, GetUsersRequest, GetUsersService, GetUsersUseCase, MembershipTier,
    MutationPipeline, NewUser, PasswordHash, UnitOfWork, User, UserId, Username, WorkoutPlan,
    WorkoutSession,
};
use fittrack::outbound::memory::{InMemoryRepository, InMemoryStore};
use fittrack::test_support::{
    CallLog, RecordingTransactionManager, RecordingUserRepository, RecordingValidator,
};
use rstest::{fixture, rstest};

type Manager = RecordingTransactionManager<InMemoryStore>;

struct World {
    log: CallLog,
    manager: Arc<Manager>,
    users: InMemoryRepository<User>,
}

impl World {
    fn unit_of_work(&self) -> UnitOfWork<Manager> {
        UnitOfWork::new(Arc::clone(&self.manager))
    }

    fn recorded_users(&self) -> Arc<dyn UserRepository> {
        Arc::new(RecordingUserRepository::new(
            self.users.clone(),
            self.log.clone(),
        ))
    }

    fn create_user_pipeline(
        &self,
    ) -> MutationPipeline<RecordingValidator<CreateUserValidator>, Manager, CreateUserUseCase> {
        MutationPipeline::new(
            RecordingValidator::new(CreateUserValidator, self.log.clone()),
            self.unit_of_work(),
            CreateUserUseCase::new(CreateUserService::new(
                self.recorded_users(),
                Arc::new(FixturePasswordHasher),
            )),
        )
    }

    async fn committed_users(&self) -> Vec<User> {
        self.users.get_all().await.expect("committed read")
    }
}

#[fixture]
fn world() -> World {
    let store = InMemoryStore::new();
    let users = store.repository();
    let log = CallLog::new();
    World {
        manager: Arc::new(RecordingTransactionManager::new(store, log.clone())),
        log,
        users,
    }
}

fn registration(username: &str, tier: Option<MembershipTier>) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_owned(),
        email: format!("{username}@x.com"),
        password: "secret".to_owned(),
        membership_tier: tier,
    }
}

fn draft(username: &str) -> NewUser {
    NewUser {
        username: Username::new(username).expect("valid username"),
        email: Email::new(format!("{username}@x.com")).expect("valid email"),
        password_hash: PasswordHash::new("fixture$terces").expect("valid hash"),
        membership_tier: MembershipTier::Basic,
    }
}

/// Stores a user, then fails.
struct CreateThenFail {
    users: Arc<dyn UserRepository>,
}

#[async_trait]
impl MutationUseCase<NewUser, ()> for CreateThenFail {
    async fn execute(&self, request: NewUser) -> Result<(), Error> {
        self.users.create(request).await?;
        Err(Error::conflict("downstream step refused"))
    }
}

/// Stores a user, then never finishes.
struct CreateThenHang {
    users: Arc<dyn UserRepository>,
}

#[async_trait]
impl MutationUseCase<NewUser, ()> for CreateThenHang {
    async fn execute(&self, request: NewUser) -> Result<(), Error> {
        self.users.create(request).await?;
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Opens a second unit of work on the same manager.
struct Reentrant {
    unit_of_work: UnitOfWork<Manager>,
}

#[async_trait]
impl MutationUseCase<(), ()> for Reentrant {
    async fn execute(&self, _request: ()) -> Result<(), Error> {
        self.unit_of_work
            .execute(|| async { Ok::<(), Error>(()) })
            .await
    }
}

#[rstest]
#[tokio::test]
async fn registration_defaults_the_tier_and_hashes_the_password(world: World) {
    let response = world
        .create_user_pipeline()
        .execute(registration("alice", None))
        .await
        .expect("user created");

    assert_eq!(response.username, "alice");
    assert_eq!(response.membership_tier, MembershipTier::Basic);
    let stored = world
        .users
        .get_one_by_id(response.id)
        .await
        .expect("read")
        .expect("user committed");
    assert_ne!(stored.password_hash().as_str(), "secret");
    assert_eq!(
        world.log.entries(),
        ["validate", "tx.begin", "repo.create", "tx.flush", "tx.commit"]
    );
}

#[rstest]
#[tokio::test]
async fn blank_usernames_never_open_a_transaction(world: World) {
    let err = world
        .create_user_pipeline()
        .execute(registration("", None))
        .await
        .expect_err("validation fails");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(world.log.entries(), ["validate"]);
    assert_eq!(world.log.count_prefixed("tx."), 0);
    assert_eq!(world.log.count_prefixed("repo."), 0);
}

#[rstest]
#[tokio::test]
async fn inner_failures_roll_back_once_and_leave_nothing_behind(world: World) {
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        world.unit_of_work(),
        CreateThenFail {
            users: world.recorded_users(),
        },
    );

    let err = pipeline
        .execute(draft("alice"))
        .await
        .expect_err("inner use case fails");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "downstream step refused");
    assert_eq!(world.log.count("tx.rollback"), 1);
    assert_eq!(world.log.count("tx.commit"), 0);
    assert!(world.committed_users().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn listing_returns_summaries_in_insertion_order(world: World) {
    let pipeline = world.create_user_pipeline();
    for (name, tier) in [
        ("ann", None),
        ("ben", Some(MembershipTier::Advance)),
        ("cat", Some(MembershipTier::High)),
    ] {
        pipeline
            .execute(registration(name, tier))
            .await
            .expect("user created");
    }

    let summaries = GetUsersUseCase::new(GetUsersService::new(world.recorded_users()))
        .execute(GetUsersRequest)
        .await
        .expect("listing");

    let stored = world.committed_users().await;
    assert_eq!(summaries.len(), 3);
    for (summary, user) in summaries.iter().zip(&stored) {
        assert_eq!(summary.id, user.id());
        assert_eq!(summary.username, user.username().as_str());
        assert_eq!(summary.email, user.email().as_str());
        assert_eq!(summary.membership_tier, user.membership_tier());
        let json = serde_json::to_value(summary).expect("serialise summary");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
    assert_eq!(
        summaries.iter().map(|s| s.username.as_str()).collect::<Vec<_>>(),
        ["ann", "ben", "cat"]
    );
    assert_eq!(world.log.count("repo.get_all_projected"), 1);
    assert_eq!(world.log.count("repo.get_all"), 0);
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_id_reports_absence_and_changes_nothing(world: World) {
    world
        .create_user_pipeline()
        .execute(registration("alice", None))
        .await
        .expect("user created");
    let before = world.committed_users().await;
    let users = world.users.clone();

    let removed = world
        .unit_of_work()
        .execute(move || async move { Ok::<_, Error>(users.delete(UserId::new(404)).await?) })
        .await
        .expect("delete succeeds");

    assert!(removed.is_none());
    assert_eq!(world.committed_users().await, before);
}

#[rstest]
#[tokio::test]
async fn delete_user_of_a_missing_id_is_not_found(world: World) {
    let store = InMemoryStore::new();
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        world.unit_of_work(),
        DeleteUser::new(
            world.recorded_users(),
            Arc::new(store.repository::<WorkoutPlan>()),
            Arc::new(store.repository::<WorkoutSession>()),
            Arc::new(store.repository::<BodyTrack>()),
        ),
    );

    let err = pipeline
        .execute(UserId::new(404))
        .await
        .expect_err("nothing to delete");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(world.log.count("repo.delete"), 0);
    assert_eq!(world.log.count("tx.rollback"), 1);
}

#[rstest]
#[tokio::test]
async fn commit_failures_roll_back_and_surface(world: World) {
    world.manager.fail_next_commit();

    let err = world
        .create_user_pipeline()
        .execute(registration("alice", None))
        .await
        .expect_err("commit fails");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(
        world.log.entries(),
        [
            "validate",
            "tx.begin",
            "repo.create",
            "tx.flush",
            "tx.commit",
            "tx.rollback"
        ]
    );
    assert!(world.committed_users().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn duplicate_usernames_conflict_at_flush(world: World) {
    let pipeline = world.create_user_pipeline();
    pipeline
        .execute(registration("alice", None))
        .await
        .expect("first registration");

    let err = pipeline
        .execute(registration("alice", None))
        .await
        .expect_err("second registration");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(world.log.count("tx.commit"), 1);
    assert_eq!(world.log.count("tx.rollback"), 1);
    assert_eq!(world.committed_users().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn nested_units_of_work_are_rejected(world: World) {
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        world.unit_of_work(),
        Reentrant {
            unit_of_work: world.unit_of_work(),
        },
    );

    let err = pipeline.execute(()).await.expect_err("nesting refused");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(world.log.count("tx.begin"), 2);
    assert_eq!(world.log.count("tx.commit"), 0);
    assert_eq!(world.log.count("tx.rollback"), 1);
}

#[rstest]
#[tokio::test]
async fn cancelled_pipelines_discard_staged_writes(world: World) {
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        world.unit_of_work(),
        CreateThenHang {
            users: world.recorded_users(),
        },
    );

    let outcome = tokio::time::timeout(Duration::from_millis(50), pipeline.execute(draft("alice")))
        .await;

    assert!(outcome.is_err(), "pipeline should still be pending");
    assert_eq!(world.log.count("repo.create"), 1);
    assert_eq!(world.log.count("tx.abandon"), 1);
    assert!(world.committed_users().await.is_empty());

    let users = world.users.clone();
    world
        .unit_of_work()
        .execute(move || async move { Ok::<_, Error>(users.create(draft("alice")).await?) })
        .await
        .expect("abandoned transaction left no lock or name behind");
}
