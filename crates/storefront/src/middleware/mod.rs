//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (answers preflight requests before anything else runs)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (add unique ID to each request)
//! 5. Request log (one line per request)

pub mod cors;
pub mod request_id;
pub mod request_log;

pub use cors::cors_layer;
pub use request_id::request_id_middleware;
pub use request_log::request_log_middleware;
