//! Axum router construction.
//!
//! Builds the full application router with all routes, middleware layers,
//! the OpenAPI document, and static serving of the avatar tree.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use avatar_store::STATIC_PREFIX;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Room left in the request body limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::users::create_user,
        routes::users::get_user,
        routes::avatars::upload_avatar,
        routes::avatars::delete_avatar,
    ),
    components(schemas(
        routes::UserResponse,
        routes::health::HealthResponse,
        routes::users::CreateUserRequest,
        routes::avatars::AvatarUploadForm,
        routes::avatars::AvatarUploadResponse,
        routes::avatars::AvatarDeleteResponse,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = ctx.store.max_size().saturating_add(MULTIPART_OVERHEAD);
    let static_files = ServeDir::new(ctx.store.root());
    tracing::debug!(
        "Serving {} at {STATIC_PREFIX}",
        ctx.store.root().display()
    );

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/users", post(routes::users::create_user))
        .route("/users/{id}", get(routes::users::get_user))
        .route(
            "/users/{id}/avatar",
            post(routes::avatars::upload_avatar)
                .delete(routes::avatars::delete_avatar)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service(STATIC_PREFIX, static_files)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
