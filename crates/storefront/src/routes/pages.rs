//! Static HTML pages and assets.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Landing page, served at `/`.
pub const INDEX_PAGE: &str = "index.html";

/// Catalog page, served at `/products`.
pub const PRODUCTS_PAGE: &str = "product-showcase.html";

/// Serve one named page from the static directory.
#[must_use]
pub fn page(static_dir: &Path, file: &str) -> ServeFile {
    ServeFile::new(static_dir.join(file))
}

/// Serve any other file under the static directory by its path.
#[must_use]
pub fn assets(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir)
}
