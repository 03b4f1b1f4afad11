//! Product catalog API.

use axum::{Json, extract::State};
use shopfront_core::{Document, OrderBy};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Collection holding the product catalog.
pub const PRODUCTS_COLLECTION: &str = "products";

/// List every product, newest first.
///
/// Each item is the product's fields with its document id under `id`.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Document>>> {
    tracing::debug!("Fetching products");

    let products = state
        .documents()
        .list_documents(PRODUCTS_COLLECTION, &OrderBy::descending("createdAt"))
        .await
        .map_err(AppError::ProductFetch)?;

    if products.is_empty() {
        tracing::info!("No products found");
    } else {
        tracing::info!(count = products.len(), "Products fetched");
    }

    Ok(Json(products))
}
