//! Handler tests for the user endpoints over the in-memory wiring.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::test_app;

fn alice() -> Value {
    json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "secret"
    })
}

#[rstest]
#[actix_web::test]
async fn registration_returns_the_user_without_credentials() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(alice())
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "id": 1,
            "username": "alice",
            "email": "alice@example.com",
            "membershipTier": "Basic"
        })
    );
}

#[rstest]
#[case(json!({"username": " ", "email": "a@example.com", "password": "p"}), "username")]
#[case(json!({"username": "a", "email": "", "password": "p"}), "email")]
#[case(json!({"username": "a", "email": "a@example.com", "password": ""}), "password")]
#[actix_web::test]
async fn blank_registration_fields_are_rejected(#[case] body: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = actix_test::read_body_json(response).await;
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(payload["details"]["field"], field);
}

#[rstest]
#[actix_web::test]
async fn duplicate_usernames_conflict() {
    let app = actix_test::init_service(test_app()).await;
    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(alice())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }

    let request = actix_test::TestRequest::get().uri("/api/v1/users").to_request();
    let users: Vec<Value> = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(users.len(), 1);
}

#[rstest]
#[actix_web::test]
async fn membership_changes_are_visible_on_read() {
    let app = actix_test::init_service(test_app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(alice())
        .to_request();
    actix_test::call_service(&app, request).await;

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/users/1/membership")
        .set_json(json!({"membershipTier": "High"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::get().uri("/api/v1/users/1").to_request();
    let user: Value = actix_test::call_and_read_body_json(&app, request).await;
    assert_eq!(user["membershipTier"], "High");
}

#[rstest]
#[actix_web::test]
async fn unknown_users_are_not_found() {
    let app = actix_test::init_service(test_app()).await;

    for request in [
        actix_test::TestRequest::get().uri("/api/v1/users/42"),
        actix_test::TestRequest::delete().uri("/api/v1/users/42"),
    ] {
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[rstest]
#[actix_web::test]
async fn deleted_users_disappear() {
    let app = actix_test::init_service(test_app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(alice())
        .to_request();
    actix_test::call_service(&app, request).await;

    let request = actix_test::TestRequest::delete().uri("/api/v1/users/1").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = actix_test::TestRequest::get().uri("/api/v1/users/1").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case("secret", StatusCode::OK)]
#[case("wrong", StatusCode::UNAUTHORIZED)]
#[actix_web::test]
async fn login_checks_the_password(#[case] password: &str, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app()).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(alice())
        .to_request();
    actix_test::call_service(&app, request).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"username": "alice", "password": password}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn error_responses_carry_the_request_trace_id() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::get().uri("/api/v1/users/9").to_request();
    let response = actix_test::call_service(&app, request).await;

    let header = response
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace-id header");
    let payload: Value = actix_test::read_body_json(response).await;
    assert_eq!(payload["traceId"], header.as_str());
}
