//! Passthrough documents for the `users` and `products` collections.
//!
//! The storefront never models document contents: whatever fields the store
//! holds are handed to clients as-is. These types only carry the identifier,
//! the field map, and the few instructions a write or query needs.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier (last segment of the document path).
    pub id: String,
    /// Document fields, already converted to plain JSON.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from its identifier and fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Get a single field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Consume the document, keeping only its fields.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

/// Serializes as `{"id": ..., ...fields}`.
///
/// A stored field called `id` replaces the identifier, matching object-spread
/// semantics on the client side.
impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed = self.fields.contains_key("id");
        let len = self.fields.len() + usize::from(!shadowed);
        let mut map = serializer.serialize_map(Some(len))?;
        if !shadowed {
            map.serialize_entry("id", &self.id)?;
        }
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A full-document write.
///
/// `fields` replace the stored document; every name in `server_timestamps`
/// is additionally set to the store's commit time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentWrite {
    pub fields: Map<String, Value>,
    pub server_timestamps: Vec<String>,
}

impl DocumentWrite {
    /// Start a write with the given fields.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            server_timestamps: Vec::new(),
        }
    }

    /// Also set `field` to the server's commit timestamp.
    #[must_use]
    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }
}

/// Sort direction for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single-field ordering for a collection query.
///
/// As with the hosted store, documents that lack the field are left out of
/// the results entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    /// Order by `field`, newest/largest first.
    #[must_use]
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Order by `field`, oldest/smallest first.
    #[must_use]
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }
}
