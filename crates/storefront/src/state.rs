//! Application state shared across handlers.

use std::sync::Arc;

use cartwheel_core::CartState;

use crate::config::StorefrontConfig;
use crate::services::CartService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart and configuration. It is built once in `main` and handed to the
/// router; nothing reaches the cart except through it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: CartService,
}

impl AppState {
    /// Create application state with an empty cart.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_cart(config, CartState::new())
    }

    /// Create application state starting from an existing cart.
    #[must_use]
    pub fn with_cart(config: StorefrontConfig, cart: CartState) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                cart: CartService::with_state(cart),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }
}
