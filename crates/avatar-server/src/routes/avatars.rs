//! Avatar upload and delete route handlers.
//!
//! Replacing an avatar runs in this order:
//!
//! 1. write the new file through [`AvatarStore::upload`];
//! 2. point the user record at the new path;
//! 3. if the record update fails, delete the new file and report
//!    [`Error::PersistenceFailure`];
//! 4. once the record is committed, delete the previous file. A previous
//!    file that is already gone is fine. Any other failure keeps the upload
//!    (the record is committed) and names the retained file in the response
//!    as `previous_avatar_retained`, so the caller knows it still exists.
//!
//! At no point does a committed record reference a missing file.
//!
//! [`AvatarStore::upload`]: avatar_store::AvatarStore::upload

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;

use avatar_core::{Error, Result};
use avatar_db::models::User;
use avatar_db::pool::get_conn;
use avatar_db::queries::users;

use super::parse_user_id;
use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";

/// Multipart form accepted by the upload endpoint.
#[derive(Debug, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct AvatarUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AvatarUploadResponse {
    pub message: String,
    pub user_id: i64,
    pub avatar_path: String,
    pub avatar_url: String,
    /// Previous avatar file that could not be deleted after the replace.
    pub previous_avatar_retained: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AvatarDeleteResponse {
    pub message: String,
    pub user_id: i64,
}

/// POST /users/{id}/avatar
#[utoipa::path(
    post,
    path = "/users/{id}/avatar",
    params(("id" = i64, Path, description = "User id")),
    request_body(content = AvatarUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Avatar stored", body = AvatarUploadResponse),
        (status = 400, description = "File too large, unsupported, or missing"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Write or persistence failure")
    )
)]
pub async fn upload_avatar(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<AvatarUploadResponse>, AppError> {
    upload(ctx, &id, multipart)
        .await
        .map(Json)
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))
}

async fn upload(
    ctx: AppContext,
    raw_id: &str,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<AvatarUploadResponse> {
    let user_id = parse_user_id(raw_id)?;
    let user = {
        let conn = get_conn(&ctx.db)?;
        users::get_user_by_id(&conn, user_id)?.ok_or(Error::UserNotFound(user_id))?
    };

    let multipart = multipart.map_err(|e| Error::Validation(e.body_text()))?;
    let data = read_file_field(multipart, ctx.store.max_size()).await?;

    let store_ctx = ctx.clone();
    let replaced = tokio::task::spawn_blocking(move || replace_avatar(&store_ctx, &user, &data))
        .await
        .map_err(|e| Error::Internal(format!("Upload task failed: {e}")))??;

    let avatar_url = ctx.store.resolve_url(&replaced.path);
    Ok(AvatarUploadResponse {
        message: "Avatar uploaded successfully".into(),
        user_id,
        avatar_path: replaced.path,
        avatar_url,
        previous_avatar_retained: replaced.retained,
    })
}

/// Pull the bytes of the [`FILE_FIELD`] part out of the form.
async fn read_file_field(mut multipart: Multipart, max_size: usize) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_size))?;
        return Ok(bytes.to_vec());
    }

    Err(Error::Validation(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

/// A body that trips the request size limit is reported like any other
/// oversized avatar.
fn multipart_error(err: MultipartError, max_size: usize) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { limit: max_size }
    } else {
        Error::Validation(err.body_text())
    }
}

/// Outcome of a committed replace.
#[derive(Debug)]
struct ReplacedAvatar {
    path: String,
    /// Previous file still on disk because deleting it failed.
    retained: Option<String>,
}

/// Store `data` as the user's avatar and retire the previous one.
fn replace_avatar(ctx: &AppContext, user: &User, data: &[u8]) -> Result<ReplacedAvatar> {
    let new_path = ctx.store.upload(user.id, data)?;

    let persisted = get_conn(&ctx.db).and_then(|conn| {
        match users::set_avatar_path(&conn, user.id, Some(&new_path))? {
            true => Ok(()),
            false => Err(Error::UserNotFound(user.id)),
        }
    });
    if let Err(e) = persisted {
        tracing::warn!(
            user_id = user.id,
            path = %new_path,
            "Failed to record avatar, removing uploaded file: {e}"
        );
        if let Err(cleanup) = ctx.store.delete(&new_path) {
            tracing::warn!(path = %new_path, "Failed to remove uploaded avatar: {cleanup}");
        }
        return Err(Error::persistence(user.id, e));
    }

    let retained = match user.avatar_path.as_deref().filter(|old| *old != new_path) {
        None => None,
        Some(old_path) => match ctx.store.delete(old_path) {
            Ok(()) | Err(Error::NotFound(_)) => None,
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    path = %old_path,
                    "Previous avatar retained: {e}"
                );
                Some(old_path.to_string())
            }
        },
    };

    tracing::info!(user_id = user.id, path = %new_path, "Avatar updated");
    Ok(ReplacedAvatar {
        path: new_path,
        retained,
    })
}

/// DELETE /users/{id}/avatar
#[utoipa::path(
    delete,
    path = "/users/{id}/avatar",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Avatar deleted", body = AvatarDeleteResponse),
        (status = 400, description = "User has no avatar"),
        (status = 404, description = "User or avatar file not found")
    )
)]
pub async fn delete_avatar(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> std::result::Result<Json<AvatarDeleteResponse>, AppError> {
    let result = match parse_user_id(&id) {
        Ok(user_id) => tokio::task::spawn_blocking(move || remove_avatar(&ctx, user_id))
            .await
            .map_err(|e| Error::Internal(format!("Delete task failed: {e}")))
            .and_then(|r| r),
        Err(e) => Err(e),
    };

    result
        .map(|user_id| {
            Json(AvatarDeleteResponse {
                message: "Avatar deleted successfully".into(),
                user_id,
            })
        })
        .map_err(|e| AppError::new(e).with_request_id(request_id.0))
}

/// Delete the user's avatar file, then clear the record.
fn remove_avatar(ctx: &AppContext, user_id: i64) -> Result<i64> {
    let conn = get_conn(&ctx.db)?;
    let user = users::get_user_by_id(&conn, user_id)?.ok_or(Error::UserNotFound(user_id))?;
    let path = user.avatar_path.ok_or(Error::NoAvatar(user_id))?;

    ctx.store.delete(&path)?;
    users::set_avatar_path(&conn, user_id, None)?;

    tracing::info!(user_id, path = %path, "Avatar deleted");
    Ok(user_id)
}
