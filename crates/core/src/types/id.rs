//! Provider-assigned identifiers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the identity provider.
///
/// The same value keys the user's document in the `users` collection, so it
/// is handed out to clients and accepted back verbatim from the
/// `/user/{uid}` path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap a provider identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
