//! Registration and login handlers.
//!
//! Accounts are keyed by a placeholder email synthesized from the username;
//! the identity provider owns validation and uniqueness.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shopfront_core::{DocumentWrite, Uid, Username};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::provider::{NewAccount, ProviderError, codes};
use crate::state::AppState;

/// Collection holding one profile document per account.
pub const USERS_COLLECTION: &str = "users";

/// Username and password, as posted by the register and login forms.
///
/// Fields are kept as raw JSON so a numeric username still names an account.
/// Missing fields are treated as empty strings and left for the identity
/// provider to reject.
#[derive(Deserialize)]
pub struct Credentials {
    pub username: Option<Value>,
    pub password: Option<Value>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    fn username(&self) -> Username {
        Username::from_json(self.username.as_ref())
    }

    /// Non-string passwords count as empty, which the provider rejects.
    fn password(&self) -> SecretString {
        match &self.password {
            Some(Value::String(password)) => SecretString::from(password.clone()),
            _ => SecretString::from(String::new()),
        }
    }

    /// The username doubles as the account display name, which the provider
    /// only accepts as a string.
    fn check_display_name(&self) -> std::result::Result<(), ProviderError> {
        match &self.username {
            Some(value) if !value.is_string() => {
                Err(ProviderError::rejected(codes::INVALID_DISPLAY_NAME))
            }
            _ => Ok(()),
        }
    }
}

/// Body of a successful register or login response.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: &'static str,
    pub uid: Uid,
}

/// Create an account and its profile document.
///
/// The profile is written after the account exists; a failed write leaves
/// the account in place.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(credentials) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    credentials.check_display_name().map_err(|e| {
        tracing::warn!("Registration failed: {}", e);
        AppError::Registration(e)
    })?;
    let username = credentials.username();

    let account = NewAccount {
        email: username.placeholder_email(&state.config().email_domain),
        password: credentials.password(),
        display_name: username.as_str().to_string(),
    };

    let user = state.identity().create_user(account).await.map_err(|e| {
        tracing::warn!("Registration failed: {}", e);
        AppError::Registration(e)
    })?;

    let mut profile = Map::new();
    profile.insert("username".to_string(), Value::String(username.into_inner()));
    let write = DocumentWrite::new(profile).with_server_timestamp("createdAt");

    state
        .documents()
        .set_document(USERS_COLLECTION, user.uid.as_str(), write)
        .await
        .map_err(|e| {
            tracing::error!(uid = %user.uid, "Failed to write user profile: {}", e);
            AppError::Registration(e)
        })?;

    tracing::info!(uid = %user.uid, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            success: true,
            message: "User registered successfully",
            uid: user.uid,
        }),
    ))
}

/// Resolve a username to its account.
///
/// Only checks that the account exists; the password is not verified.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AccountResponse>> {
    let Json(credentials) = body.map_err(|_| AppError::InvalidCredentials)?;
    let email = credentials
        .username()
        .placeholder_email(&state.config().email_domain);

    let user = state
        .identity()
        .get_user_by_email(&email)
        .await
        .map_err(|e| {
            tracing::warn!("Login failed: {}", e);
            AppError::InvalidCredentials
        })?;

    Ok(Json(AccountResponse {
        success: true,
        message: "Login successful",
        uid: user.uid,
    }))
}
