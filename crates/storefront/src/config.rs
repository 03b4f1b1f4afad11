//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Directory holding the HTML pages and assets (default: frontend)
//! - `STOREFRONT_ACCOUNT_ROUTES` - Mount `/register`, `/login` and `/user/{uid}` (default: true)
//! - `STOREFRONT_EMAIL_DOMAIN` - Domain for synthesized account emails (default: ecommerce.com)
//! - `STOREFRONT_BACKEND` - `firebase` or `memory` (default: firebase)
//! - `STOREFRONT_LOG_JSON` - Emit JSON logs instead of text (default: false)
//! - `FIREBASE_CREDENTIALS` - Service-account key file (default: serviceAccountKey.json)
//! - `FIREBASE_DATABASE_URL` - Database URL (default: <https://com-e-53f91.firebaseio.com>)
//! - `FIREBASE_AUTH_EMULATOR_HOST` - Auth emulator `host:port`
//! - `FIRESTORE_EMULATOR_HOST` - Firestore emulator `host:port`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use shopfront_core::DEFAULT_EMAIL_DOMAIN;
use thiserror::Error;
use url::Url;

const DEFAULT_DATABASE_URL: &str = "https://com-e-53f91.firebaseio.com";
const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which adapter implementation backs the identity and document APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Firebase Authentication and Cloud Firestore over REST.
    Firebase,
    /// In-process adapters for local development and tests.
    Memory,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory the HTML pages and static assets are served from
    pub static_dir: PathBuf,
    /// Whether the account routes (register, login, user lookup) are mounted
    pub account_routes: bool,
    /// Domain appended to usernames to form account emails
    pub email_domain: String,
    /// Adapter implementation
    pub backend: Backend,
    /// Firebase project configuration
    pub firebase: FirebaseConfig,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Firebase project configuration.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Path to the service-account JSON key
    pub credentials_path: PathBuf,
    /// Project database URL
    pub database_url: Url,
    /// Auth emulator `host:port`, if running against the emulator suite
    pub auth_emulator_host: Option<String>,
    /// Firestore emulator `host:port`, if running against the emulator suite
    pub firestore_emulator_host: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let static_dir = PathBuf::from(env.or_default("STOREFRONT_STATIC_DIR", "frontend"));
        let account_routes = env.flag("STOREFRONT_ACCOUNT_ROUTES", true)?;
        let email_domain = env.or_default("STOREFRONT_EMAIL_DOMAIN", DEFAULT_EMAIL_DOMAIN);
        let backend = parse_backend(&env.or_default("STOREFRONT_BACKEND", "firebase"))?;
        let log_json = env.flag("STOREFRONT_LOG_JSON", false)?;

        let firebase = FirebaseConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            static_dir,
            account_routes,
            email_domain,
            backend,
            firebase,
            log_json,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FirebaseConfig {
    fn from_env<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = Url::parse(&env.or_default("FIREBASE_DATABASE_URL", DEFAULT_DATABASE_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("FIREBASE_DATABASE_URL".to_string(), e.to_string())
            })?;

        Ok(Self {
            credentials_path: PathBuf::from(
                env.or_default("FIREBASE_CREDENTIALS", DEFAULT_CREDENTIALS_PATH),
            ),
            database_url,
            auth_emulator_host: env.optional("FIREBASE_AUTH_EMULATOR_HOST"),
            firestore_emulator_host: env.optional("FIRESTORE_EMULATOR_HOST"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the defaulting rules shared by every setting.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a boolean flag.
    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            parse_flag(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(key.to_string(), format!("expected a boolean, got '{value}'"))
            })
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_backend(value: &str) -> Result<Backend, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "firebase" => Ok(Backend::Firebase),
        "memory" => Ok(Backend::Memory),
        other => Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_BACKEND".to_string(),
            format!("expected 'firebase' or 'memory', got '{other}'"),
        )),
    }
}
