//! Offline fallback: requests pass straight through, but when the document
//! store cannot be reached the response is swapped for a fixed plain-text
//! notice. Nothing is cached or retried.

use axum::{
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

pub const OFFLINE_MESSAGE: &str = "오프라인 상태입니다.";

/// Response extension set by handlers whose store was unreachable.
#[derive(Debug, Clone, Copy)]
pub struct StoreUnavailable;

pub async fn offline_fallback(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.extensions().get::<StoreUnavailable>().is_none() {
        return response;
    }

    warn!(path = %path, "document store unreachable, serving offline response");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        OFFLINE_MESSAGE,
    )
        .into_response()
}
