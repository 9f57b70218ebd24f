//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::Error;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error_case() -> Error {
    Error::internal("repository invariant violated: insert returned no row")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"table": "users"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("invalid credentials"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("user 7 does not exist"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("unique constraint users_username_key violated"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("storage unavailable"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

async fn response_payload(error: Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("error JSON deserialises");
    (status, trace_id, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(internal_error_case: Error) {
    let (status, trace_id, payload) = response_payload(internal_error_case).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace_id.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn validation_errors_keep_their_details() {
    let error = Error::invalid_request("username must not be empty")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"field": "username", "code": "empty_username"}));

    let (status, trace_id, payload) = response_payload(error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(trace_id.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.message(), "username must not be empty");
    assert_eq!(
        payload.details(),
        Some(&json!({"field": "username", "code": "empty_username"}))
    );
}

#[rstest]
#[actix_web::test]
async fn errors_without_trace_id_omit_the_header() {
    let (_, trace_id, payload) = response_payload(Error::conflict("taken")).await;

    assert_eq!(trace_id, None);
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
#[actix_web::test]
async fn malformed_bodies_become_invalid_requests() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route(
                "/",
                web::post().to(|_: web::Json<serde_json::Value>| async { HttpResponse::Ok() }),
            ),
    )
    .await;

    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Error = actix_test::read_body_json(response).await;
    assert_eq!(payload.code(), ErrorCode::InvalidRequest);
    assert_eq!(payload.details(), Some(&json!({"code": "invalid_body"})));
}

#[rstest]
#[actix_web::test]
async fn non_numeric_ids_become_invalid_requests() {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .route(
                "/users/{id}",
                web::get().to(|_: web::Path<i32>| async { HttpResponse::Ok() }),
            ),
    )
    .await;

    let request = actix_test::TestRequest::get().uri("/users/abc").to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
