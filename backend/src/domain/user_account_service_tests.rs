//! Tests for account management use cases.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{FixturePasswordHasher, Repository};
use crate::domain::{ErrorCode, MutationPipeline, UserId};
use crate::domain::ports::NoCheapChecks;
use crate::test_support::MemoryFixture;

#[fixture]
fn fixture() -> MemoryFixture {
    MemoryFixture::new()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
}

fn login(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_owned(),
        password: password.to_owned(),
    }
}

fn authenticate(fixture: &MemoryFixture) -> AuthenticateUser {
    AuthenticateUser::new(
        Arc::new(fixture.users.clone()),
        Arc::new(FixturePasswordHasher),
    )
}

#[rstest]
#[tokio::test]
async fn get_user_returns_the_summary(fixture: MemoryFixture) {
    let alice = fixture
        .seed_user("alice", MembershipTier::Advance)
        .await
        .expect("seeded");

    let summary = GetUser::new(Arc::new(fixture.users.clone()))
        .execute(alice.id())
        .await
        .expect("found");

    assert_eq!(summary.username, "alice");
    assert_eq!(summary.membership_tier, MembershipTier::Advance);
}

#[rstest]
#[tokio::test]
async fn get_user_reports_missing_users(fixture: MemoryFixture) {
    let error = GetUser::new(Arc::new(fixture.users.clone()))
        .execute(UserId::new(42))
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "user 42 does not exist");
}

#[rstest]
#[tokio::test]
async fn membership_changes_are_persisted(fixture: MemoryFixture) {
    let alice = fixture
        .seed_user("alice", MembershipTier::Basic)
        .await
        .expect("seeded");
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        fixture.unit_of_work(),
        ChangeMembershipTier::new(Arc::new(fixture.users.clone())),
    );

    let summary = pipeline
        .execute(ChangeMembershipTierRequest {
            user_id: alice.id(),
            membership_tier: MembershipTier::High,
        })
        .await
        .expect("changed");

    assert_eq!(summary.membership_tier, MembershipTier::High);
    let stored = fixture
        .users
        .get_one_by_id(alice.id())
        .await
        .expect("read")
        .expect("still stored");
    assert_eq!(stored.membership_tier(), MembershipTier::High);
}

#[rstest]
#[tokio::test]
async fn membership_change_for_a_missing_user_is_not_found(fixture: MemoryFixture) {
    let pipeline = MutationPipeline::new(
        NoCheapChecks,
        fixture.unit_of_work(),
        ChangeMembershipTier::new(Arc::new(fixture.users.clone())),
    );

    let error = pipeline
        .execute(ChangeMembershipTierRequest {
            user_id: UserId::new(5),
            membership_tier: MembershipTier::High,
        })
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

fn delete_pipeline(
    fixture: &MemoryFixture,
) -> MutationPipeline<NoCheapChecks, crate::outbound::memory::InMemoryStore, DeleteUser> {
    MutationPipeline::new(
        NoCheapChecks,
        fixture.unit_of_work(),
        DeleteUser::new(
            Arc::new(fixture.users.clone()),
            Arc::new(fixture.plans.clone()),
            Arc::new(fixture.sessions.clone()),
            Arc::new(fixture.body_tracks.clone()),
        ),
    )
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_removes_plans_and_measurements_and_detaches_sessions(
    fixture: MemoryFixture,
) {
    let alice = fixture
        .seed_user("alice", MembershipTier::Basic)
        .await
        .expect("seeded");
    let bob = fixture
        .seed_user("bob", MembershipTier::Basic)
        .await
        .expect("seeded");
    let plan = fixture.seed_plan(alice.id(), "legs").await.expect("plan");
    let kept_plan = fixture.seed_plan(bob.id(), "arms").await.expect("plan");
    let session = fixture
        .seed_session(date(), Some(plan.id))
        .await
        .expect("session");
    fixture
        .seed_body_track(alice.id(), 70.0)
        .await
        .expect("track");
    let kept_track = fixture.seed_body_track(bob.id(), 82.5).await.expect("track");

    delete_pipeline(&fixture)
        .execute(alice.id())
        .await
        .expect("deleted");

    assert_eq!(fixture.users.get_all().await.expect("read"), vec![bob]);
    assert_eq!(fixture.plans.get_all().await.expect("read"), vec![kept_plan]);
    assert_eq!(
        fixture.body_tracks.get_all().await.expect("read"),
        vec![kept_track]
    );
    let stored = fixture
        .sessions
        .get_one_by_id(session.id)
        .await
        .expect("read")
        .expect("session kept");
    assert_eq!(stored.plan_id, None);
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_user_is_not_found_and_changes_nothing(fixture: MemoryFixture) {
    let alice = fixture
        .seed_user("alice", MembershipTier::Basic)
        .await
        .expect("seeded");

    let error = delete_pipeline(&fixture)
        .execute(UserId::new(99))
        .await
        .expect_err("missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(fixture.users.get_all().await.expect("read"), vec![alice]);
}

#[rstest]
#[tokio::test]
async fn login_succeeds_with_the_right_password(fixture: MemoryFixture) {
    fixture
        .seed_user("alice", MembershipTier::Basic)
        .await
        .expect("seeded");

    let summary = authenticate(&fixture)
        .execute(login("alice", MemoryFixture::PASSWORD))
        .await
        .expect("authenticated");

    assert_eq!(summary.username, "alice");
}

#[rstest]
#[case(login("alice", "wrong"))]
#[case(login("mallory", "secret"))]
#[tokio::test]
async fn login_failures_are_indistinguishable(fixture: MemoryFixture, #[case] request: LoginRequest) {
    fixture
        .seed_user("alice", MembershipTier::Basic)
        .await
        .expect("seeded");

    let error = authenticate(&fixture)
        .execute(request)
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), "invalid credentials");
}

#[rstest]
#[case(login(" ", "pw"), ErrorCode::InvalidRequest)]
#[case(login("alice", ""), ErrorCode::InvalidRequest)]
#[tokio::test]
async fn blank_credentials_are_invalid(
    fixture: MemoryFixture,
    #[case] request: LoginRequest,
    #[case] expected: ErrorCode,
) {
    let error = authenticate(&fixture)
        .execute(request)
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), expected);
}
