//! One log line per inbound request.

use axum::{extract::Request, middleware::Next, response::Response};

/// Log the method and URI of every request as it arrives.
///
/// Runs before routing, so requests that end up in the static fallback or
/// answer 404 are logged too. The subscriber supplies the timestamp.
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    tracing::info!(
        method = %request.method(),
        uri = %request.uri(),
        "{} {}",
        request.method(),
        request.uri()
    );

    next.run(request).await
}
