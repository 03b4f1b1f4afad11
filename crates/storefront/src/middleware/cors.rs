//! Cross-origin policy for the browser frontends.

use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Allow any origin to call the JSON endpoints.
///
/// Credentials are not involved: the API is unauthenticated and the
/// frontends only send `Content-Type` and `Authorization` headers.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
