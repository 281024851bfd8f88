//! JSON API routes.
//!
//! Lets catalog services and scripts read the cart and issue commands
//! without going through the HTML view.

use axum::{Json, extract::State};
use cartwheel_core::{CartCommand, CartOutcome, CartState, Money, NewCartEntry};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::services::CartUpdate;
use crate::state::AppState;

/// Cart snapshot with its derived totals.
#[derive(Debug, Serialize)]
pub struct CartSummary {
    #[serde(flatten)]
    pub cart: CartState,
    /// Unrounded sum of every line subtotal.
    pub grand_total: Money,
    /// Grand total rounded for display (e.g., "25.00").
    pub grand_total_display: String,
}

impl From<CartState> for CartSummary {
    fn from(cart: CartState) -> Self {
        let grand_total = cart.grand_total();
        Self {
            cart,
            grand_total,
            grand_total_display: grand_total.amount_string(),
        }
    }
}

/// Response to a cart command.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub outcome: CartOutcome,
    pub cart: CartSummary,
}

impl From<CartUpdate> for CommandResponse {
    fn from(update: CartUpdate) -> Self {
        Self {
            outcome: update.outcome,
            cart: CartSummary::from(update.cart),
        }
    }
}

/// Current cart.
///
/// GET /api/cart
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartSummary>> {
    let cart = state.cart().snapshot()?;
    Ok(Json(CartSummary::from(cart)))
}

/// Add one unit of a catalog product.
///
/// POST /api/cart/items
#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    Json(item): Json<NewCartEntry>,
) -> Result<Json<CommandResponse>> {
    let update = state.cart().add_item(item)?;
    Ok(Json(CommandResponse::from(update)))
}

/// Apply any cart command.
///
/// POST /api/cart/commands
#[instrument(skip(state))]
pub async fn command(
    State(state): State<AppState>,
    Json(command): Json<CartCommand>,
) -> Result<Json<CommandResponse>> {
    let update = state.cart().dispatch(command)?;
    Ok(Json(CommandResponse::from(update)))
}
