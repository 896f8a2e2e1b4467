//! Application state shared across handlers.

use std::sync::Arc;

use threadline_core::Cart;

use crate::cart::{CartBus, CartError, CartStateManager, read_cart};
use crate::catalog::ProductCatalog;
use crate::config::StorefrontConfig;
use crate::content::ContentStore;
use crate::store::{DurableStore, Namespaced};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart store, the cart bus, policy pages and the product catalog.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: Arc<dyn DurableStore>,
    bus: CartBus,
    content: ContentStore,
    catalog: ProductCatalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `carts` - Durable store holding every session's cart
    /// * `content` - Loaded policy pages
    /// * `catalog` - Product catalog
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        carts: Arc<dyn DurableStore>,
        content: ContentStore,
        catalog: ProductCatalog,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts,
                bus: CartBus::new(),
                content,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the process-wide cart bus.
    #[must_use]
    pub fn cart_bus(&self) -> &CartBus {
        &self.inner.bus
    }

    /// Get the shared cart store (all sessions).
    #[must_use]
    pub fn cart_store(&self) -> &Arc<dyn DurableStore> {
        &self.inner.carts
    }

    /// Get the loaded policy pages.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }

    /// Get the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Load the cart belonging to `owner` from the durable store.
    ///
    /// A stored cart that no longer decodes is logged and replaced by an empty
    /// cart; the next mutation overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the durable store cannot be read.
    pub fn cart_for(&self, owner: &str) -> Result<CartStateManager<Namespaced>, CartError> {
        let store = Namespaced::new(Arc::clone(&self.inner.carts), owner);
        let snapshot = match read_cart(&store) {
            Ok(cart) => cart,
            Err(CartError::Decode(e)) => {
                tracing::warn!(owner, error = %e, "Discarding malformed stored cart");
                Cart::default()
            }
            Err(e) => return Err(e),
        };
        Ok(CartStateManager::new(snapshot, store, self.inner.bus.clone()))
    }
}
