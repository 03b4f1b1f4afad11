//! Firebase Authentication and Cloud Firestore REST clients.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls against the Identity Toolkit and Firestore v1 APIs
//! - One [`TokenSource`] per process, shared by both clients; tokens come
//!   from `google-cloud-auth`
//! - Firebase is the source of truth: no local copies of users or products
//!
//! # Emulators
//!
//! When `FIREBASE_AUTH_EMULATOR_HOST` or `FIRESTORE_EMULATOR_HOST` is set the
//! matching client talks to the emulator over plain HTTP with the emulator's
//! `owner` token instead of a minted access token.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::firebase;
//!
//! let clients = firebase::connect(&config.firebase).await?;
//! let user = clients.auth.get_user_by_email("alice@ecommerce.com").await?;
//! ```

mod auth;
mod credentials;
mod firestore;
pub mod value;

use std::sync::Arc;

use tracing::info;

pub use auth::{FirebaseAuthClient, IDENTITY_TOOLKIT_ROOT};
pub use credentials::{ServiceAccountKey, TokenSource};
pub use firestore::{FIRESTORE_ROOT, FirestoreClient};

use crate::config::FirebaseConfig;
use crate::provider::ProviderError;

/// Token accepted by the emulator suite in place of an access token.
const EMULATOR_TOKEN: &str = "owner";

/// Both Firebase clients for one project.
#[derive(Clone)]
pub struct FirebaseClients {
    pub auth: FirebaseAuthClient,
    pub firestore: FirestoreClient,
}

/// Load the service-account key and build both clients.
///
/// Unless both services are emulated, an access token is minted before
/// returning.
///
/// # Errors
///
/// Returns `ProviderError::Credentials` if the key file is missing or
/// invalid or the first token exchange fails, or `ProviderError::Endpoint` if
/// an emulator host is malformed.
pub async fn connect(config: &FirebaseConfig) -> Result<FirebaseClients, ProviderError> {
    let key = ServiceAccountKey::from_file(&config.credentials_path).await?;
    let project_id = key.project_id().to_string();
    let emulated = Arc::new(TokenSource::fixed(EMULATOR_TOKEN));
    let minted = if config.auth_emulator_host.is_some() && config.firestore_emulator_host.is_some()
    {
        Arc::clone(&emulated)
    } else {
        Arc::new(TokenSource::service_account(&key).await?)
    };
    let emulator_tokens = || Arc::clone(&emulated);

    let auth = match &config.auth_emulator_host {
        Some(host) => {
            info!(host = %host, "Using Firebase Auth emulator");
            FirebaseAuthClient::new(
                &format!("http://{host}/identitytoolkit.googleapis.com"),
                &project_id,
                emulator_tokens(),
            )
        }
        None => FirebaseAuthClient::new(IDENTITY_TOOLKIT_ROOT, &project_id, Arc::clone(&minted)),
    };

    let firestore = match &config.firestore_emulator_host {
        Some(host) => {
            info!(host = %host, "Using Firestore emulator");
            FirestoreClient::new(&format!("http://{host}"), &project_id, emulator_tokens())?
        }
        None => FirestoreClient::new(FIRESTORE_ROOT, &project_id, minted)?,
    };

    info!(
        project_id = %project_id,
        database_url = %config.database_url,
        "Firebase initialized"
    );

    Ok(FirebaseClients { auth, firestore })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use mockito::Server;
    use serde_json::Value;
    use url::Url;

    use super::*;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/service_account.json")
    }

    fn config(credentials_path: PathBuf) -> FirebaseConfig {
        FirebaseConfig {
            credentials_path,
            database_url: Url::parse("https://shopfront-test.firebaseio.com").unwrap(),
            auth_emulator_host: None,
            firestore_emulator_host: None,
        }
    }

    #[tokio::test]
    async fn test_connect_mints_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut key: Value =
            serde_json::from_str(&std::fs::read_to_string(fixture_path()).unwrap()).unwrap();
        key["token_uri"] = Value::String(format!("{}/token", server.url()));
        let path = dir.path().join("serviceAccountKey.json");
        std::fs::write(&path, key.to_string()).unwrap();

        assert!(connect(&config(path)).await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connect_missing_key_file() {
        let err = connect(&config(PathBuf::from("/nonexistent/serviceAccountKey.json")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Credentials(_)));
    }

    #[tokio::test]
    async fn test_connect_with_emulators() {
        let mut config = config(fixture_path());
        config.auth_emulator_host = Some("localhost:9099".to_string());
        config.firestore_emulator_host = Some("localhost:8080".to_string());
        assert!(connect(&config).await.is_ok());
    }
}
