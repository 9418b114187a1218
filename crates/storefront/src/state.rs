//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use shopfront_core::fixtures::{Catalog, FixtureError};

use crate::config::ServerConfig;
use crate::services::{AccountError, AccountRegistry, Accounts};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("account registry error: {0}")]
    Accounts(#[from] AccountError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog is read-only;
/// the account registry is the only mutable part.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Catalog,
    accounts: Accounts,
    latency: Duration,
}

impl AppState {
    /// Create the state from the embedded fixtures and a seeded registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixtures fail to decode or the demo account
    /// cannot be created.
    pub fn new(config: &ServerConfig) -> Result<Self, StateError> {
        Ok(Self::with_parts(
            Catalog::embedded()?,
            AccountRegistry::seeded()?,
            config.latency,
        ))
    }

    /// Create the state from explicit parts.
    #[must_use]
    pub fn with_parts(catalog: Catalog, accounts: AccountRegistry, latency: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                accounts: Accounts::new(accounts),
                latency,
            }),
        }
    }

    /// Get a reference to the fixture catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the account service.
    #[must_use]
    pub fn accounts(&self) -> &Accounts {
        &self.inner.accounts
    }

    /// Delay added before every API response.
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.inner.latency
    }
}
