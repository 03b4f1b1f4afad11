//! Service-account credentials and OAuth access tokens.
//!
//! Key parsing, the signed jwt-bearer exchange and token reuse are handled by
//! `google-cloud-auth`; this module checks the key is usable for Firebase and
//! adds a fixed-token source for the emulator suite.

use std::path::Path;

use google_cloud_auth::credentials::CredentialsFile;
use google_cloud_auth::project::{Config, create_token_source_from_credentials};
use google_cloud_auth::token_source::TokenSource as GoogleTokenSource;
use secrecy::SecretString;
use tracing::{debug, instrument};

use crate::provider::ProviderError;

const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/datastore",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// A service-account key file checked for the fields Firebase needs.
pub struct ServiceAccountKey {
    credentials: CredentialsFile,
    project_id: String,
    client_email: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read and validate a key file.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Credentials` if the file cannot be read or is
    /// not a usable service-account key.
    pub async fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let credentials = CredentialsFile::new_from_file(path.display().to_string())
            .await
            .map_err(|e| {
                ProviderError::Credentials(format!("cannot load {}: {e}", path.display()))
            })?;
        Self::validate(credentials)
    }

    /// Parse and validate a key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Credentials` if the JSON is malformed, a
    /// required field is missing, or the key type is not `service_account`.
    pub async fn from_json(json: &str) -> Result<Self, ProviderError> {
        let credentials = CredentialsFile::new_from_str(json)
            .await
            .map_err(|e| ProviderError::Credentials(format!("malformed key file: {e}")))?;
        Self::validate(credentials)
    }

    fn validate(credentials: CredentialsFile) -> Result<Self, ProviderError> {
        if credentials.tp != "service_account" {
            return Err(ProviderError::Credentials(format!(
                "expected a service_account key, got '{}'",
                credentials.tp
            )));
        }

        let project_id = required(credentials.project_id.as_ref(), "project_id")?;
        let client_email = required(credentials.client_email.as_ref(), "client_email")?;
        required(credentials.private_key.as_ref(), "private_key")?;

        Ok(Self {
            credentials,
            project_id,
            client_email,
        })
    }

    /// Project the key belongs to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

fn required(value: Option<&String>, field: &str) -> Result<String, ProviderError> {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ProviderError::Credentials(format!("missing field '{field}'")))
}

enum Source {
    ServiceAccount(Box<dyn GoogleTokenSource>),
    Fixed(SecretString),
}

/// Supplies bearer tokens for provider requests.
pub struct TokenSource {
    source: Source,
}

impl TokenSource {
    /// Mint scoped tokens from a service-account key.
    ///
    /// The first token is fetched immediately, so a revoked key or an
    /// unreachable token endpoint fails here rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Credentials` if the private key is invalid or
    /// the initial token exchange fails.
    #[instrument(skip_all, fields(issuer = %key.client_email))]
    pub async fn service_account(key: &ServiceAccountKey) -> Result<Self, ProviderError> {
        let config = Config::default().with_scopes(&SCOPES);
        let source = create_token_source_from_credentials(&key.credentials, &config)
            .await
            .map_err(|e| ProviderError::Credentials(format!("token exchange failed: {e}")))?;
        debug!("obtained initial access token");

        Ok(Self {
            source: Source::ServiceAccount(source),
        })
    }

    /// Always hand out the same token (the emulator suite accepts `owner`).
    #[must_use]
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: Source::Fixed(SecretString::from(token.into())),
        }
    }

    /// Get a bearer token. Service-account tokens are reused until they near
    /// expiry.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Credentials` if a refresh fails.
    pub async fn access_token(&self) -> Result<SecretString, ProviderError> {
        match &self.source {
            Source::Fixed(token) => Ok(token.clone()),
            Source::ServiceAccount(source) => {
                let token = source.token().await.map_err(|e| {
                    ProviderError::Credentials(format!("token refresh failed: {e}"))
                })?;
                Ok(SecretString::from(token.access_token))
            }
        }
    }
}
