//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{Backend, StorefrontConfig};
use crate::firebase;
use crate::provider::memory::{MemoryDocumentStore, MemoryIdentityProvider};
use crate::provider::{DocumentStore, IdentityProvider, ProviderError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the provider adapters chosen at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `identity` - Account creation and lookup
    /// * `documents` - Document reads and writes
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                documents,
            }),
        }
    }

    /// Build the adapters selected by `config.backend`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Firebase service-account key cannot be loaded
    /// or no access token can be minted with it.
    pub async fn from_config(config: StorefrontConfig) -> Result<Self, ProviderError> {
        let (identity, documents): (Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>) =
            match config.backend {
                Backend::Firebase => {
                    let clients = firebase::connect(&config.firebase).await?;
                    (Arc::new(clients.auth), Arc::new(clients.firestore))
                }
                Backend::Memory => {
                    tracing::warn!("Using in-memory backend; data is lost on exit");
                    (
                        Arc::new(MemoryIdentityProvider::new()),
                        Arc::new(MemoryDocumentStore::new()),
                    )
                }
            };

        Ok(Self::new(config, identity, documents))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get the document store.
    #[must_use]
    pub fn documents(&self) -> &dyn DocumentStore {
        self.inner.documents.as_ref()
    }
}
