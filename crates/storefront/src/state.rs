//! Application state shared across views.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::coordinator::{CartCoordinator, CoordinatorOptions, WishlistCoordinator};
use crate::session::Session;
use crate::store::StoreError;

/// Handles every view needs: configuration, the API client and the session.
///
/// Cheap to clone via `Arc`. Coordinators are not part of the state; each
/// mounted page creates its own, matching the page-scoped lifetime of a
/// cart snapshot.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    client: ApiClient,
    session: Session,
}

impl AppState {
    /// Create the state for `config` with an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StoreError> {
        Self::with_session(config, Session::new())
    }

    /// Create the state around an existing session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_session(config: StorefrontConfig, session: Session) -> Result<Self, StoreError> {
        let client = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                client,
                session,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions::from(&self.inner.config)
    }

    /// A fresh cart coordinator over the API client.
    #[must_use]
    pub fn cart(&self) -> CartCoordinator<ApiClient> {
        CartCoordinator::new(self.inner.client.clone(), self.coordinator_options())
    }

    /// A fresh wishlist coordinator over the API client.
    #[must_use]
    pub fn wishlist(&self) -> WishlistCoordinator<ApiClient> {
        WishlistCoordinator::new(self.inner.client.clone(), self.coordinator_options())
    }
}
