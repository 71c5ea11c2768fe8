//! User record route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use avatar_core::Error;
use avatar_db::pool::get_conn;
use avatar_db::queries::users;

use super::{parse_user_id, UserResponse};
use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Request body for creating a user.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    /// Explicit id; assigned by the database when omitted.
    #[serde(default)]
    pub id: Option<i64>,
}

/// POST /users
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "Username taken or invalid request")
    )
)]
pub async fn create_user(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    create(&ctx, payload)
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))
}

fn create(
    ctx: &AppContext,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> avatar_core::Result<UserResponse> {
    let Json(payload) = payload.map_err(|e| Error::Validation(e.body_text()))?;
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(Error::Validation("username is required".into()));
    }

    let conn = get_conn(&ctx.db)?;
    let user = users::create_user(&conn, username, payload.id)?;
    tracing::info!(user_id = user.id, username = %user.username, "Created user");

    Ok(UserResponse::from_model(user, &ctx.store))
}

/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User record", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    fetch(&ctx, &id)
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))
}

fn fetch(ctx: &AppContext, raw_id: &str) -> avatar_core::Result<UserResponse> {
    let id = parse_user_id(raw_id)?;
    let conn = get_conn(&ctx.db)?;
    let user = users::get_user_by_id(&conn, id)?.ok_or(Error::UserNotFound(id))?;
    Ok(UserResponse::from_model(user, &ctx.store))
}
