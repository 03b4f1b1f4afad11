//! User profile lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use super::auth::USERS_COLLECTION;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of a successful profile lookup.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub data: Map<String, Value>,
}

/// Return the stored profile document for `uid`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<UserResponse>> {
    let document = state
        .documents()
        .get_document(USERS_COLLECTION, &uid)
        .await
        .map_err(AppError::UserFetch)?
        .ok_or(AppError::UserNotFound)?;

    Ok(Json(UserResponse {
        success: true,
        data: document.into_fields(),
    }))
}
