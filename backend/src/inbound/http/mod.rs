//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod body_tracks;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod workouts;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Every `/api/v1` route, with body and path errors mapped to
/// `invalid_request` payloads.
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::change_membership_tier)
        .service(users::delete_user)
        .service(users::login)
        .service(body_tracks::record_body_track)
        .service(body_tracks::list_body_tracks)
        .service(workouts::create_exercise)
        .service(workouts::list_exercises)
        .service(workouts::create_plan)
        .service(workouts::list_plans)
        .service(workouts::start_session)
        .service(workouts::get_session)
        .service(workouts::log_set)
}
