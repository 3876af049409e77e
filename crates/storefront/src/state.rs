//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::db::ContactRecords;
use crate::middleware::SessionLocks;
use crate::services::ContactService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Per-visitor state lives in
/// the session; only the per-session locks change after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    contact: ContactService,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Product catalog served by the listing routes
    /// * `records` - Record store the contact form writes to
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        records: Arc<dyn ContactRecords>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                contact: ContactService::new(records),
                session_locks: SessionLocks::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the contact form service.
    #[must_use]
    pub fn contact(&self) -> &ContactService {
        &self.inner.contact
    }

    /// Locks serializing requests that share a session.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }
}
