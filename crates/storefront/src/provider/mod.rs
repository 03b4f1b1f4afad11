//! Adapter traits for the identity provider and the document store.
//!
//! Handlers never talk to Firebase directly. They hold trait objects built
//! once at startup and injected through [`AppState`](crate::state::AppState):
//!
//! - [`IdentityProvider`] - create accounts and look them up by email
//! - [`DocumentStore`] - read, write, and list documents by collection
//!
//! Two implementations exist: the Firebase REST clients in
//! [`crate::firebase`] and the in-process adapters in [`memory`].
//!
//! Account validation happens on the adapter side, exactly as the hosted
//! provider does it, so both implementations reject the same input with the
//! same messages.

pub mod memory;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use shopfront_core::{Document, DocumentWrite, Email, OrderBy, Uid};
use thiserror::Error;

/// Minimum password length enforced by the identity provider, in UTF-16
/// code units.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error codes reported by the identity provider, in SDK notation.
pub mod codes {
    pub const EMAIL_ALREADY_EXISTS: &str = "auth/email-already-exists";
    pub const INVALID_DISPLAY_NAME: &str = "auth/invalid-display-name";
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const INVALID_PASSWORD: &str = "auth/invalid-password";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// Errors that can occur when calling a provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service-account credential is unusable.
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The identity provider refused the request.
    #[error("{message}")]
    Rejected { code: String, message: String },

    /// The document store returned a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A provider endpoint could not be built from configuration.
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    /// The provider responded with data we could not interpret.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl ProviderError {
    /// Build a `Rejected` error with the provider's standard message for `code`.
    #[must_use]
    pub fn rejected(code: &str) -> Self {
        let message = match code {
            codes::EMAIL_ALREADY_EXISTS => {
                "The email address is already in use by another account."
            }
            codes::INVALID_DISPLAY_NAME => "The displayName field must be a valid string.",
            codes::INVALID_EMAIL => "The email address is improperly formatted.",
            codes::INVALID_PASSWORD => {
                "The password must be a string with at least 6 characters."
            }
            codes::USER_NOT_FOUND => {
                "There is no user record corresponding to the provided identifier."
            }
            _ => "An internal error has occurred.",
        };
        Self::Rejected {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns the provider error code, if this is a rejection.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Account creation request.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: SecretString,
    pub display_name: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

impl NewAccount {
    /// Check the account against the provider's input rules.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Rejected` with `auth/invalid-email` or
    /// `auth/invalid-password`.
    pub fn validate(&self) -> Result<Email, ProviderError> {
        let email = parse_email(&self.email)?;
        if self.password.expose_secret().encode_utf16().count() < MIN_PASSWORD_LENGTH {
            return Err(ProviderError::rejected(codes::INVALID_PASSWORD));
        }
        Ok(email)
    }
}

/// Parse an email the way the identity provider does.
///
/// # Errors
///
/// Returns `ProviderError::Rejected` with `auth/invalid-email`.
pub fn parse_email(email: &str) -> Result<Email, ProviderError> {
    Email::parse(email).map_err(|_| ProviderError::rejected(codes::INVALID_EMAIL))
}

/// An account as seen by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub uid: Uid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Account operations delegated to the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. Fails if the email is already registered.
    async fn create_user(&self, account: NewAccount) -> Result<UserRecord, ProviderError>;

    /// Look up an account by email. Credentials are not checked.
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, ProviderError>;
}

/// Collection-scoped document operations delegated to the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `Ok(None)` if it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, ProviderError>;

    /// Create or fully replace a document.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), ProviderError>;

    /// List every document that has the ordering field, in order.
    async fn list_documents(
        &self,
        collection: &str,
        order_by: &OrderBy,
    ) -> Result<Vec<Document>, ProviderError>;
}
