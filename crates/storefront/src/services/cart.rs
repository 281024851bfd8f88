//! Cart service.
//!
//! Owns the storefront's single [`CartState`] and applies commands to it one
//! at a time. The write lock is held for the whole of each command, so readers
//! only ever see the state before or after a command, never in between.

use std::sync::RwLock;

use cartwheel_core::{CartCommand, CartOutcome, CartState, NewCartEntry, ProductId};
use tracing::instrument;

use crate::error::add_breadcrumb;

/// Errors from the cart service.
#[derive(Debug, thiserror::Error)]
pub enum CartServiceError {
    /// A thread panicked while holding the cart lock.
    #[error("cart lock poisoned")]
    LockPoisoned,
}

/// The result of applying a command.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    /// What the command did.
    pub outcome: CartOutcome,
    /// The cart after the command.
    pub cart: CartState,
}

/// Shared cart state.
#[derive(Debug, Default)]
pub struct CartService {
    state: RwLock<CartState>,
}

impl CartService {
    /// Create a service holding an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service starting from an existing cart.
    #[must_use]
    pub const fn with_state(state: CartState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Copy of the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn snapshot(&self) -> Result<CartState, CartServiceError> {
        self.state
            .read()
            .map(|cart| cart.clone())
            .map_err(|_| CartServiceError::LockPoisoned)
    }

    /// Apply `command` and return the outcome with the resulting cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    #[instrument(skip_all, fields(command = command.name()))]
    pub fn dispatch(&self, command: CartCommand) -> Result<CartUpdate, CartServiceError> {
        let name = command.name();
        let (outcome, cart) = {
            let mut state = self
                .state
                .write()
                .map_err(|_| CartServiceError::LockPoisoned)?;
            let outcome = state.apply(command);
            (outcome, state.clone())
        };

        if outcome.is_change() {
            tracing::info!(
                ?outcome,
                entries = cart.len(),
                total_quantity = cart.total_quantity(),
                "Cart updated"
            );
            add_breadcrumb("cart", name, None);
        } else {
            tracing::debug!("Cart command left cart unchanged");
        }

        Ok(CartUpdate { outcome, cart })
    }

    /// Add one unit of a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn add_item(&self, item: NewCartEntry) -> Result<CartUpdate, CartServiceError> {
        self.dispatch(CartCommand::AddItem(item))
    }

    /// Delete a product's entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn remove_item(&self, id: ProductId) -> Result<CartUpdate, CartServiceError> {
        self.dispatch(CartCommand::RemoveItem { id })
    }

    /// Set a product's quantity. Values below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn update_quantity(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<CartUpdate, CartServiceError> {
        self.dispatch(CartCommand::UpdateQuantity { id, quantity })
    }

    /// One more unit of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn increment(&self, id: ProductId) -> Result<CartUpdate, CartServiceError> {
        self.dispatch(CartCommand::AdjustQuantity { id, delta: 1 })
    }

    /// One fewer unit of a product, dropping the entry at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartServiceError::LockPoisoned`] if the lock is poisoned.
    pub fn decrement(&self, id: ProductId) -> Result<CartUpdate, CartServiceError> {
        self.dispatch(CartCommand::AdjustQuantity { id, delta: -1 })
    }
}
