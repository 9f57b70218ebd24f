//! End-to-end tests of the `/api/v1` surface over the in-memory wiring.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use fittrack::Trace;
use fittrack::composition::wire_in_memory;
use fittrack::domain::ports::FixturePasswordHasher;
use fittrack::inbound::http::api_scope;
use rstest::rstest;
use serde_json::{Value, json};

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(wire_in_memory(Arc::new(FixturePasswordHasher))))
                .wrap(Trace)
                .service(api_scope()),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn users_are_listed_in_registration_order_without_credentials() {
    let app = app!();
    for name in ["ann", "ben", "cat"] {
        let request = test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "password": "hunter2",
            }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let request = test::TestRequest::get().uri("/api/v1/users").to_request();
    let users: Vec<Value> = test::call_and_read_body_json(&app, request).await;

    let names: Vec<&str> = users
        .iter()
        .filter_map(|user| user["username"].as_str())
        .collect();
    assert_eq!(names, ["ann", "ben", "cat"]);
    assert!(users.iter().all(|user| user.get("password").is_none()));
    assert!(users.iter().all(|user| user.get("passwordHash").is_none()));
}

#[rstest]
#[actix_web::test]
async fn emails_are_unique_regardless_of_case() {
    let app = app!();
    let mut statuses = Vec::new();
    for (name, email) in [("ann", "Ann@Example.com"), ("annie", "ann@example.com")] {
        let request = test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({"username": name, "email": email, "password": "pw"}))
            .to_request();
        statuses.push(test::call_service(&app, request).await.status());
    }

    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[rstest]
#[actix_web::test]
async fn deleting_a_user_detaches_sessions_from_their_plans() {
    let app = app!();
    let request = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"username": "dee", "email": "dee@example.com", "password": "pw"}))
        .to_request();
    test::call_service(&app, request).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/users/1/plans")
        .set_json(json!({"name": "Pull day"}))
        .to_request();
    let plan: Value = test::call_and_read_body_json(&app, request).await;
    let request = test::TestRequest::post()
        .uri("/api/v1/sessions")
        .set_json(json!({"date": "2024-06-01", "planId": plan["id"]}))
        .to_request();
    let session: Value = test::call_and_read_body_json(&app, request).await;

    let request = test::TestRequest::delete().uri("/api/v1/users/1").to_request();
    assert_eq!(
        test::call_service(&app, request).await.status(),
        StatusCode::NO_CONTENT
    );

    let request = test::TestRequest::get()
        .uri(&format!("/api/v1/sessions/{}", session["id"]))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, request).await;
    assert!(detail["session"]["planId"].is_null());
}

#[rstest]
#[actix_web::test]
async fn malformed_bodies_are_invalid_requests_with_a_trace_id() {
    let app = app!();

    let request = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}
