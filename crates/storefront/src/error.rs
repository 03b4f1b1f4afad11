//! Unified error handling with Sentry integration.
//!
//! Each endpoint answers failures with its own JSON envelope, so `AppError`
//! variants are named after the operation that failed rather than the
//! underlying cause. Server errors are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::provider::ProviderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account creation or the profile write was rejected.
    #[error("{0}")]
    Registration(#[source] ProviderError),

    /// The request body could not be read as JSON.
    #[error("{0}")]
    BadRequest(String),

    /// Login lookup failed, for whatever reason.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No profile document for the requested user.
    #[error("User not found")]
    UserNotFound,

    /// Reading the profile document failed.
    #[error("{0}")]
    UserFetch(#[source] ProviderError),

    /// Listing the product catalog failed.
    #[error("{0}")]
    ProductFetch(#[source] ProviderError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Registration(_) | Self::BadRequest(_) | Self::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UserFetch(_) | Self::ProductFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = match &self {
            Self::ProductFetch(err) => json!({
                "error": "Failed to fetch products",
                "message": err.to_string(),
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
