//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Catalog (always mounted)
//! GET  /products               - Product showcase page
//! GET  /api/products           - Product list, newest first (JSON)
//! GET  /*                      - Static assets
//!
//! # Accounts (STOREFRONT_ACCOUNT_ROUTES)
//! GET  /                       - Landing page
//! POST /register               - Create account and profile
//! POST /login                  - Resolve username to account
//! GET  /user/{uid}             - Profile document
//! ```

pub mod auth;
pub mod pages;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route_service("/", pages::page(&config.static_dir, pages::INDEX_PAGE))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/user/{uid}", get(users::show))
}

/// Create the catalog routes router.
pub fn catalog_routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route_service(
            "/products",
            pages::page(&config.static_dir, pages::PRODUCTS_PAGE),
        )
        .route("/api/products", get(products::index))
}

/// Create all routes for the storefront.
///
/// Anything not matched here falls through to the static directory.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    let mut router = Router::new()
        .route("/health", get(health))
        .merge(catalog_routes(config));

    if config.account_routes {
        router = router.merge(account_routes(config));
    }

    router.fallback_service(pages::assets(&config.static_dir))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
