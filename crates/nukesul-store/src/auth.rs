//! Admin token lifecycle: login stores it, logout removes it.
//!
//! The token is opaque and never refreshed. A rejected token is only noticed
//! by the admin console's startup check.

use std::sync::Arc;

use nukesul_api::ApiClient;

use crate::error::StoreError;
use crate::persistence::{keys, KeyValueStore};

pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
}

impl AuthSession {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Exchanges credentials for a token and persists it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] when the login request fails, or a store
    /// error if the token cannot be saved.
    pub async fn login(
        &self,
        api: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<String, StoreError> {
        let token = api.login(username, password).await?;
        self.store.set(keys::ADMIN_TOKEN, &token)?;
        tracing::info!(username, "admin token stored");
        Ok(token)
    }

    /// Forgets the stored token.
    ///
    /// # Errors
    ///
    /// Returns a store error if the token cannot be removed.
    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(keys::ADMIN_TOKEN)?;
        tracing::info!("admin token removed");
        Ok(())
    }

    /// The stored token, ignoring an empty value.
    ///
    /// # Errors
    ///
    /// Returns a store error if the token cannot be read.
    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(keys::ADMIN_TOKEN)?
            .filter(|t| !t.trim().is_empty()))
    }
}
