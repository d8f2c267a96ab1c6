//! Application state shared across handlers.

use std::sync::Arc;

use farmstand_core::catalog::Catalog;

use crate::config::StorefrontConfig;
use crate::services::ShopperStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the shopper store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    shoppers: ShopperStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let shoppers = ShopperStore::new(config.shopper_idle, config.timing.checkout_close_delay);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                shoppers,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The product and farm catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Per-session cart and checkout state.
    #[must_use]
    pub fn shoppers(&self) -> &ShopperStore {
        &self.inner.shoppers
    }
}
