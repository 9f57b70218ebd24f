//! Body measurement handlers.
//!
//! ```text
//! POST /api/v1/users/{id}/body-tracks {"date":"2025-01-01","weight","height"}
//! GET  /api/v1/users/{id}/body-tracks
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{BodyTrack, Error, RecordBodyTrackRequest, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/v1/users/{id}/body-tracks`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BodyTrackBody {
    #[schema(example = "2025-01-01")]
    pub date: NaiveDate,
    /// Kilograms.
    #[schema(example = 71.1)]
    pub weight: f64,
    /// Centimetres.
    #[schema(example = 186.0)]
    pub height: f64,
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/body-tracks",
    params(("id" = i32, Path, description = "User id")),
    request_body = BodyTrackBody,
    responses(
        (status = 201, description = "Measurement recorded", body = BodyTrack),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["body-tracks"],
    operation_id = "recordBodyTrack"
)]
#[post("/users/{id}/body-tracks")]
pub async fn record_body_track(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
    payload: web::Json<BodyTrackBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = RecordBodyTrackRequest {
        user_id: id.into_inner(),
        date: body.date,
        weight: body.weight,
        height: body.height,
    };
    let track = state.users.record_body_track.execute(request).await?;
    Ok(HttpResponse::Created().json(track))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/body-tracks",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Measurements, oldest first", body = [BodyTrack]),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["body-tracks"],
    operation_id = "listBodyTracks"
)]
#[get("/users/{id}/body-tracks")]
pub async fn list_body_tracks(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<BodyTrack>>> {
    let tracks = state.users.list_body_tracks.execute(id.into_inner()).await?;
    Ok(web::Json(tracks))
}
