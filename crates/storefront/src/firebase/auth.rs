//! Firebase Authentication over the Identity Toolkit admin REST API.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shopfront_core::Uid;
use tracing::{debug, instrument};

use super::credentials::TokenSource;
use crate::provider::{
    IdentityProvider, NewAccount, ProviderError, UserRecord, codes, parse_email,
};

/// Production Identity Toolkit root.
pub const IDENTITY_TOOLKIT_ROOT: &str = "https://identitytoolkit.googleapis.com";

/// Identity provider backed by Firebase Authentication.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    inner: Arc<FirebaseAuthClientInner>,
}

struct FirebaseAuthClientInner {
    client: reqwest::Client,
    /// `{root}/v1/projects/{project}`
    project_endpoint: String,
    tokens: Arc<TokenSource>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    display_name: &'a str,
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    email: [&'a str; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserInfo {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
}

impl From<UserInfo> for UserRecord {
    fn from(user: UserInfo) -> Self {
        Self {
            uid: Uid::new(user.local_id),
            email: user.email,
            display_name: user.display_name,
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuthClient {
    /// Create a client for `project_id`.
    ///
    /// `root` is [`IDENTITY_TOOLKIT_ROOT`] in production or the emulator's
    /// `http://{host}/identitytoolkit.googleapis.com`.
    #[must_use]
    pub fn new(root: &str, project_id: &str, tokens: Arc<TokenSource>) -> Self {
        Self {
            inner: Arc::new(FirebaseAuthClientInner {
                client: reqwest::Client::new(),
                project_endpoint: format!(
                    "{}/v1/projects/{project_id}",
                    root.trim_end_matches('/')
                ),
                tokens,
            }),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let token = self.inner.tokens.access_token().await?;
        let response = self
            .inner
            .client
            .post(format!("{}/{path}", self.inner.project_endpoint))
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| map_error_code(&e.error.message))
                .unwrap_or(codes::INTERNAL_ERROR);
            debug!(%status, code, "identity toolkit rejected request");
            return Err(ProviderError::rejected(code));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    #[instrument(skip_all)]
    async fn create_user(&self, account: NewAccount) -> Result<UserRecord, ProviderError> {
        let email = account.validate()?;
        let request = SignUpRequest {
            email: email.as_str(),
            password: account.password.expose_secret(),
            display_name: &account.display_name,
        };
        let user: UserInfo = self.post("accounts", &request).await?;
        Ok(user.into())
    }

    #[instrument(skip_all)]
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, ProviderError> {
        let email = parse_email(email)?;
        let request = LookupRequest {
            email: [email.as_str()],
        };
        let response: LookupResponse = self.post("accounts:lookup", &request).await?;
        response
            .users
            .into_iter()
            .next()
            .map(UserRecord::from)
            .ok_or_else(|| ProviderError::rejected(codes::USER_NOT_FOUND))
    }
}

/// Translate an Identity Toolkit error message into an SDK error code.
///
/// Messages look like `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_error_code(message: &str) -> &'static str {
    let server_code = message
        .split_once(" : ")
        .map_or(message, |(code, _)| code)
        .trim();
    match server_code {
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => codes::EMAIL_ALREADY_EXISTS,
        "INVALID_EMAIL" => codes::INVALID_EMAIL,
        "WEAK_PASSWORD" | "INVALID_PASSWORD" => codes::INVALID_PASSWORD,
        "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => codes::USER_NOT_FOUND,
        _ => codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::{Matcher, Server, ServerGuard};
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    fn client(server: &ServerGuard) -> FirebaseAuthClient {
        FirebaseAuthClient::new(&server.url(), "shop", Arc::new(TokenSource::fixed("owner")))
    }

    fn account(email: &str, password: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: SecretString::from(password),
            display_name: "alice".to_string(),
        }
    }

    #[test]
    fn test_map_error_code() {
        assert_eq!(map_error_code("EMAIL_EXISTS"), codes::EMAIL_ALREADY_EXISTS);
        assert_eq!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            codes::INVALID_PASSWORD
        );
        assert_eq!(map_error_code("INVALID_EMAIL"), codes::INVALID_EMAIL);
        assert_eq!(map_error_code("QUOTA_EXCEEDED"), codes::INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_create_user() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/projects/shop/accounts")
            .match_header("authorization", "Bearer owner")
            .match_body(Matcher::Json(json!({
                "email": "alice@ecommerce.com",
                "password": "hunter22",
                "displayName": "alice",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"kind": "identitytoolkit#SignupNewUserResponse", "localId": "uid-123", "email": "alice@ecommerce.com", "displayName": "alice"}"#)
            .create_async()
            .await;

        let user = client(&server)
            .create_user(account("alice@ecommerce.com", "hunter22"))
            .await
            .unwrap();

        assert_eq!(user.uid.as_str(), "uid-123");
        assert_eq!(user.display_name.as_deref(), Some("alice"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/projects/shop/accounts")
            .with_status(400)
            .with_body(r#"{"error": {"code": 400, "message": "EMAIL_EXISTS", "errors": []}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .create_user(account("alice@ecommerce.com", "hunter22"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(codes::EMAIL_ALREADY_EXISTS));
        assert_eq!(
            err.to_string(),
            "The email address is already in use by another account."
        );
    }

    #[tokio::test]
    async fn test_create_user_validates_before_calling_out() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/projects/shop/accounts")
            .expect(0)
            .create_async()
            .await;

        let err = client(&server)
            .create_user(account("alice@ecommerce.com", "123"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(codes::INVALID_PASSWORD));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_lookup_by_email() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/projects/shop/accounts:lookup")
            .match_body(Matcher::Json(json!({"email": ["alice@ecommerce.com"]})))
            .with_status(200)
            .with_body(r#"{"kind": "identitytoolkit#GetAccountInfoResponse", "users": [{"localId": "uid-123", "email": "alice@ecommerce.com"}]}"#)
            .create_async()
            .await;

        let user = client(&server)
            .get_user_by_email("alice@ecommerce.com")
            .await
            .unwrap();
        assert_eq!(user.uid.as_str(), "uid-123");
        assert!(user.display_name.is_none());
    }

    #[tokio::test]
    async fn test_lookup_unknown_email() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/projects/shop/accounts:lookup")
            .with_status(200)
            .with_body(r#"{"kind": "identitytoolkit#GetAccountInfoResponse"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .get_user_by_email("ghost@ecommerce.com")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(codes::USER_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_unparseable_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/projects/shop/accounts:lookup")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = client(&server)
            .get_user_by_email("alice@ecommerce.com")
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(codes::INTERNAL_ERROR));
    }
}
