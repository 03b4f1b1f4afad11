//! In-process adapters.
//!
//! Used by the `memory` backend for local development and by the router
//! tests. They apply the same account validation and ordering rules as the
//! hosted services so handler behavior does not depend on the backend.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::{Map, Value};
use shopfront_core::{Direction, Document, DocumentWrite, OrderBy, Timestamp, Uid};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    DocumentStore, IdentityProvider, NewAccount, ProviderError, UserRecord, codes, parse_email,
};

/// Length of generated user identifiers, matching the hosted provider.
const UID_LENGTH: usize = 28;

/// Identity provider backed by a map keyed on the lowercased email.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts.
    pub async fn account_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_user(&self, account: NewAccount) -> Result<UserRecord, ProviderError> {
        let email = account.validate()?;
        let key = email.as_str().to_lowercase();

        let mut users = self.users.write().await;
        if users.contains_key(&key) {
            return Err(ProviderError::rejected(codes::EMAIL_ALREADY_EXISTS));
        }

        let record = UserRecord {
            uid: generate_uid(),
            email: Some(key.clone()),
            display_name: Some(account.display_name),
        };
        users.insert(key, record.clone());
        tracing::debug!(uid = %record.uid, "created in-memory account");

        Ok(record)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, ProviderError> {
        let email = parse_email(email)?;
        self.users
            .read()
            .await
            .get(&email.as_str().to_lowercase())
            .cloned()
            .ok_or_else(|| ProviderError::rejected(codes::USER_NOT_FOUND))
    }
}

fn generate_uid() -> Uid {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(UID_LENGTH);
    Uid::new(id)
}

/// Document store backed by per-collection ordered maps.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Map<String, Value>>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document verbatim, bypassing server transforms.
    ///
    /// Seeds collections the storefront never writes to, such as `products`.
    pub async fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(document.id, document.fields);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, ProviderError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), ProviderError> {
        let mut fields = write.fields;
        let now = Timestamp::now().to_json();
        for field in write.server_timestamps {
            fields.insert(field, now.clone());
        }

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);

        Ok(())
    }

    async fn list_documents(
        &self,
        collection: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<Document>, ProviderError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matching: Vec<(&String, &Value, &Map<String, Value>)> = docs
            .iter()
            .filter_map(|(id, fields)| fields.get(&order_by.field).map(|v| (id, v, fields)))
            .collect();

        // Ties fall back to the document id, in the same direction.
        matching.sort_by(|a, b| compare_values(a.1, b.1).then_with(|| a.0.cmp(b.0)));
        if order_by.direction == Direction::Descending {
            matching.reverse();
        }

        Ok(matching
            .into_iter()
            .map(|(id, _, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }
}

/// Rank of a value's type in the store's cross-type ordering.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::Object(_) if Timestamp::from_json(value).is_some() => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order over JSON values: type rank first, then value.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(l, r)| compare_values(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(_), Value::Object(_)) => {
            match (Timestamp::from_json(a), Timestamp::from_json(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.to_string().cmp(&b.to_string()),
            }
        }
        _ => Ordering::Equal,
    }
}
