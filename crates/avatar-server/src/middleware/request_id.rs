//! Request correlation ids.
//!
//! Every API request gets an id that shows up in three places: the
//! `x-request-id` response header, the `request_id` field of JSON error
//! bodies (handlers read it from the [`RequestId`] extension), and the
//! tracing span around the request, so an upload that fails halfway through
//! the replace protocol can be matched to its log lines.
//!
//! A client-supplied id is reused only when it is short printable ASCII.
//! Anything else is replaced by a fresh UUID, since the value is copied
//! verbatim into logs and response bodies.

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header name used for the request identifier.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied id that is accepted.
pub const MAX_CLIENT_ID_LEN: usize = 128;

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Reuse the caller's id when it is safe to echo, otherwise mint one.
fn correlation_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_CLIENT_ID_LEN)
        .filter(|v| v.bytes().all(|b| b.is_ascii_graphic()))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let id = correlation_id(&request);
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    request.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(request).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), val);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/users/{id}",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    async fn id_for(header: Option<&str>) -> String {
        let mut builder = Request::builder().uri("/users/1");
        if let Some(value) = header {
            builder = builder.header("x-request-id", value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let echoed = response.headers()[&X_REQUEST_ID].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, echoed.as_bytes(), "handler and header disagree");
        echoed
    }

    #[tokio::test]
    async fn generates_id_when_absent() {
        let id = id_for(None).await;
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn reuses_client_id() {
        assert_eq!(id_for(Some("upload-7f3a")).await, "upload-7f3a");
    }

    #[tokio::test]
    async fn replaces_unsafe_client_ids() {
        let long = "x".repeat(MAX_CLIENT_ID_LEN + 1);
        for bad in ["", "two words", long.as_str()] {
            let id = id_for(Some(bad)).await;
            assert!(Uuid::parse_str(&id).is_ok(), "{bad:?} was kept as {id:?}");
        }
    }
}
