//! User account handlers.
//!
//! ```text
//! POST   /api/v1/users                {"username","email","password","membershipTier"?}
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! PUT    /api/v1/users/{id}/membership {"membershipTier":"High"}
//! DELETE /api/v1/users/{id}
//! POST   /api/v1/login                {"username","password"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    ChangeMembershipTierRequest, CreateUserRequest, CreateUserResponse, Error, GetUsersRequest,
    LoginRequest, MembershipTier, UserId, UserSummary,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body for `PUT /api/v1/users/{id}/membership`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTierBody {
    pub membership_tier: MembershipTier,
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already taken", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let created = state.users.create_user.execute(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List users without credentials.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users in registration order", body = [UserSummary]),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserSummary>>> {
    let users = state.users.get_users.execute(GetUsersRequest).await?;
    Ok(web::Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserSummary),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
) -> ApiResult<web::Json<UserSummary>> {
    let user = state.users.get_user.execute(id.into_inner()).await?;
    Ok(web::Json(user))
}

/// Move a user to another membership tier.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/membership",
    params(("id" = i32, Path, description = "User id")),
    request_body = MembershipTierBody,
    responses(
        (status = 200, description = "Updated user", body = UserSummary),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "changeMembershipTier"
)]
#[put("/users/{id}/membership")]
pub async fn change_membership_tier(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
    payload: web::Json<MembershipTierBody>,
) -> ApiResult<web::Json<UserSummary>> {
    let request = ChangeMembershipTierRequest {
        user_id: id.into_inner(),
        membership_tier: payload.membership_tier,
    };
    let user = state.users.change_membership_tier.execute(request).await?;
    Ok(web::Json(user))
}

/// Delete a user with their plans and body measurements. Sessions that
/// followed those plans are kept but detached.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    id: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    state.users.delete_user.execute(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Check credentials and return the matching user.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserSummary),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserSummary>> {
    let user = state.users.login.execute(payload.into_inner()).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests;
