//! Cloud Firestore over the v1 REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use shopfront_core::{Direction, Document, DocumentWrite, OrderBy};
use tracing::{debug, instrument};
use url::Url;

use super::credentials::TokenSource;
use super::value::{fields_from_firestore, fields_to_firestore};
use crate::provider::{DocumentStore, ProviderError};

/// Production Firestore root.
pub const FIRESTORE_ROOT: &str = "https://firestore.googleapis.com";

/// Document store backed by Cloud Firestore's default database.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `{root}/v1/projects/{project}/databases/(default)/documents`
    documents_url: Url,
    /// `projects/{project}/databases/(default)/documents`, the prefix of every document name
    database_path: String,
    tokens: Arc<TokenSource>,
}

#[derive(Deserialize)]
struct RawDocument {
    name: String,
    fields: Option<Value>,
}

impl RawDocument {
    fn into_document(self) -> Result<Document, ProviderError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProviderError::Unexpected(format!("document name '{}'", self.name)))?
            .to_string();
        Ok(Document::new(id, fields_from_firestore(self.fields.as_ref())?))
    }
}

#[derive(Deserialize)]
struct QueryResult {
    document: Option<RawDocument>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirestoreClient {
    /// Create a client for `project_id`.
    ///
    /// `root` is [`FIRESTORE_ROOT`] in production or `http://{host}` for the
    /// emulator.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Endpoint` if `root` is not a usable base URL.
    pub fn new(
        root: &str,
        project_id: &str,
        tokens: Arc<TokenSource>,
    ) -> Result<Self, ProviderError> {
        let database_path = format!("projects/{project_id}/databases/(default)/documents");
        let documents_url = Url::parse(&format!(
            "{}/v1/{database_path}",
            root.trim_end_matches('/')
        ))
        .map_err(|e| ProviderError::Endpoint(format!("{root}: {e}")))?;
        if documents_url.cannot_be_a_base() {
            return Err(ProviderError::Endpoint(root.to_string()));
        }

        Ok(Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                database_path,
                tokens,
            }),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, ProviderError> {
        let mut url = self.inner.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| ProviderError::Endpoint(self.inner.documents_url.to_string()))?
            .push(collection)
            .push(id);
        Ok(url)
    }

    /// `{documents_url}:{method}`, for the database-level RPCs.
    fn rpc_url(&self, method: &str) -> String {
        format!("{}:{method}", self.inner.documents_url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), ProviderError> {
        let token = self.inner.tokens.access_token().await?;
        let response = request.bearer_auth(token.expose_secret()).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status, text))
    }
}

fn api_error(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| format!("Firestore returned HTTP {status}"),
        |e| e.error.message,
    );
    ProviderError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, ProviderError> {
        let url = self.document_url(collection, id)?;
        let (status, body) = self.send(self.inner.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            debug!("document not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let raw: RawDocument = serde_json::from_str(&body)?;
        raw.into_document().map(Some)
    }

    #[instrument(skip(self, write))]
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), ProviderError> {
        let name = format!("{}/{collection}/{id}", self.inner.database_path);
        let mut operation = json!({
            "update": {
                "name": name,
                "fields": fields_to_firestore(&write.fields),
            }
        });
        if !write.server_timestamps.is_empty() {
            let transforms: Vec<Value> = write
                .server_timestamps
                .iter()
                .map(|field| json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }))
                .collect();
            operation["updateTransforms"] = Value::Array(transforms);
        }

        let request = self
            .inner
            .client
            .post(self.rpc_url("commit"))
            .json(&json!({ "writes": [operation] }));
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_documents(
        &self,
        collection: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<Document>, ProviderError> {
        let direction = match order_by.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{ "field": { "fieldPath": order_by.field }, "direction": direction }],
            }
        });

        let request = self.inner.client.post(self.rpc_url("runQuery")).json(&query);
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        // Results without a document only report read time or progress.
        let results: Vec<QueryResult> = serde_json::from_str(&body)?;
        let documents = results
            .into_iter()
            .filter_map(|r| r.document)
            .map(RawDocument::into_document)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = documents.len(), "query returned documents");
        Ok(documents)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::Map;

    use super::*;

    const DOCS: &str = "/v1/projects/shop/databases/(default)/documents";

    fn client(server: &ServerGuard) -> FirestoreClient {
        FirestoreClient::new(&server.url(), "shop", Arc::new(TokenSource::fixed("owner"))).unwrap()
    }

    #[tokio::test]
    async fn test_get_document() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", format!("{DOCS}/users/uid-123").as_str())
            .match_header("authorization", "Bearer owner")
            .with_status(200)
            .with_body(
                json!({
                    "name": "projects/shop/databases/(default)/documents/users/uid-123",
                    "fields": {
                        "username": {"stringValue": "alice"},
                        "createdAt": {"timestampValue": "2024-05-01T12:00:00Z"},
                    },
                    "createTime": "2024-05-01T12:00:00Z",
                    "updateTime": "2024-05-01T12:00:00Z",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let doc = client(&server)
            .get_document("users", "uid-123")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(doc.id, "uid-123");
        assert_eq!(doc.get("username"), Some(&json!("alice")));
        assert_eq!(
            doc.get("createdAt"),
            Some(&json!({"_seconds": 1_714_564_800, "_nanoseconds": 0}))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_document() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{DOCS}/users/ghost").as_str())
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "Document not found", "status": "NOT_FOUND"}}"#)
            .create_async()
            .await;

        let doc = client(&server).get_document("users", "ghost").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_get_document_encodes_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", format!("{DOCS}/users/a%20b").as_str())
            .with_status(404)
            .create_async()
            .await;

        client(&server).get_document("users", "a b").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_document_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{DOCS}/users/uid-123").as_str())
            .with_status(403)
            .with_body(r#"{"error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .get_document("users", "uid-123")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 403, .. }));
        assert_eq!(err.to_string(), "Missing or insufficient permissions.");
    }

    #[tokio::test]
    async fn test_set_document_with_server_timestamp() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("{DOCS}:commit").as_str())
            .match_body(Matcher::Json(json!({
                "writes": [{
                    "update": {
                        "name": "projects/shop/databases/(default)/documents/users/uid-123",
                        "fields": {
                            "username": {"stringValue": "alice"},
                            "email": {"stringValue": "alice@ecommerce.com"},
                        },
                    },
                    "updateTransforms": [
                        {"fieldPath": "createdAt", "setToServerValue": "REQUEST_TIME"},
                    ],
                }],
            })))
            .with_status(200)
            .with_body(r#"{"writeResults": [{"updateTime": "2024-05-01T12:00:00Z"}], "commitTime": "2024-05-01T12:00:00Z"}"#)
            .create_async()
            .await;

        let mut fields = Map::new();
        fields.insert("username".into(), json!("alice"));
        fields.insert("email".into(), json!("alice@ecommerce.com"));
        let write = DocumentWrite::new(fields).with_server_timestamp("createdAt");

        client(&server)
            .set_document("users", "uid-123", write)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_documents() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", format!("{DOCS}:runQuery").as_str())
            .match_body(Matcher::Json(json!({
                "structuredQuery": {
                    "from": [{"collectionId": "products"}],
                    "orderBy": [{"field": {"fieldPath": "createdAt"}, "direction": "DESCENDING"}],
                },
            })))
            .with_status(200)
            .with_body(
                json!([
                    {
                        "document": {
                            "name": "projects/shop/databases/(default)/documents/products/mug",
                            "fields": {"name": {"stringValue": "Mug"}, "price": {"doubleValue": 12.5}},
                        },
                        "readTime": "2024-05-01T12:00:00Z",
                    },
                    {
                        "document": {
                            "name": "projects/shop/databases/(default)/documents/products/tee",
                            "fields": {"name": {"stringValue": "Tee"}},
                        },
                        "readTime": "2024-05-01T12:00:00Z",
                    },
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let docs = client(&server)
            .list_documents("products", &OrderBy::descending("createdAt"))
            .await
            .unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["mug", "tee"]);
        assert_eq!(docs[0].get("price"), Some(&json!(12.5)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_empty_collection() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", format!("{DOCS}:runQuery").as_str())
            .with_status(200)
            .with_body(r#"[{"readTime": "2024-05-01T12:00:00Z"}]"#)
            .create_async()
            .await;

        let docs = client(&server)
            .list_documents("products", &OrderBy::descending("createdAt"))
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_list_documents_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", format!("{DOCS}:runQuery").as_str())
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let err = client(&server)
            .list_documents("products", &OrderBy::descending("createdAt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 503, .. }));
    }

    #[test]
    fn test_invalid_root() {
        let result = FirestoreClient::new("not a url", "shop", Arc::new(TokenSource::fixed("owner")));
        assert!(matches!(result, Err(ProviderError::Endpoint(_))));
    }
}
