//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutating handler re-renders the cart from the state the command
//! produced and sends an `HX-Trigger: cart-updated` header so the count badge
//! refreshes too.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use cartwheel_core::{CartEntry, CartState, NewCartEntry, Price, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::CartUpdate;
use crate::state::AppState;

/// Event name sent to HTMX after the cart changes.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Notice shown by the checkout placeholder.
pub const CHECKOUT_NOT_IMPLEMENTED: &str = "Functionality to be added for future reference";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub unit_cost: String,
    pub subtotal: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Whether the empty-cart placeholder should be shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart.entries().iter().map(CartItemView::from).collect(),
            total: cart.grand_total().to_string(),
            item_count: cart.total_quantity(),
        }
    }
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.id(),
            name: entry.name().to_string(),
            image: entry.image().to_string(),
            quantity: entry.quantity(),
            unit_cost: entry.unit_cost().to_string(),
            subtotal: entry.subtotal().to_string(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data, posted by the catalog.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: ProductId,
    pub name: String,
    pub unit_cost: String,
    pub image: String,
}

impl TryFrom<AddToCartForm> for NewCartEntry {
    type Error = AppError;

    fn try_from(form: AddToCartForm) -> Result<Self> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".to_string()));
        }
        let unit_cost =
            Price::parse(&form.unit_cost).map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(Self {
            id: form.id,
            name: name.to_string(),
            unit_cost,
            image: form.image.trim().to_string(),
        })
    }
}

/// Set quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: ProductId,
    pub quantity: i64,
}

/// Form data for controls that act on a single entry.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Checkout placeholder fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_notice.html")]
pub struct CheckoutNoticeTemplate {
    pub message: &'static str,
}

/// Re-render the cart items with the update trigger header.
fn items_fragment(update: &CartUpdate) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartItemsTemplate {
            cart: CartView::from(&update.cart),
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CartShowTemplate> {
    let cart = state.cart().snapshot()?;
    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
    })
}

/// Add item to cart (HTMX).
///
/// Returns the refreshed count badge with an HTMX trigger so the cart list
/// re-renders wherever it is shown.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let item = NewCartEntry::try_from(form)?;
    let update = state.cart().add_item(item)?;

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        CartCountTemplate {
            count: update.cart.total_quantity(),
        },
    )
        .into_response())
}

/// Set an item's quantity (HTMX).
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let update = state.cart().update_quantity(form.id, form.quantity)?;
    Ok(items_fragment(&update))
}

/// Increment control (HTMX).
#[instrument(skip(state))]
pub async fn increment(
    State(state): State<AppState>,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let update = state.cart().increment(form.id)?;
    Ok(items_fragment(&update))
}

/// Decrement control (HTMX).
///
/// Decrementing an item with quantity 1 removes it.
#[instrument(skip(state))]
pub async fn decrement(
    State(state): State<AppState>,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let update = state.cart().decrement(form.id)?;
    Ok(items_fragment(&update))
}

/// Delete control (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<CartLineForm>,
) -> Result<Response> {
    let update = state.cart().remove_item(form.id)?;
    Ok(items_fragment(&update))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<CartCountTemplate> {
    let cart = state.cart().snapshot()?;
    Ok(CartCountTemplate {
        count: cart.total_quantity(),
    })
}

/// Checkout placeholder (HTMX).
///
/// Checkout is not built yet; this tells the shopper so and leaves the cart
/// untouched.
#[instrument]
pub async fn checkout() -> CheckoutNoticeTemplate {
    tracing::info!("Checkout requested before it is available");
    CheckoutNoticeTemplate {
        message: CHECKOUT_NOT_IMPLEMENTED,
    }
}

/// Continue shopping: hand navigation back to the configured target.
#[instrument(skip(state))]
pub async fn continue_shopping(State(state): State<AppState>) -> Redirect {
    Redirect::to(&state.config().continue_shopping_url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::CartCommand;

    use super::*;

    fn form(unit_cost: &str) -> AddToCartForm {
        AddToCartForm {
            id: ProductId::new(1),
            name: " Snake Plant ".to_string(),
            unit_cost: unit_cost.to_string(),
            image: "https://cdn.example.com/snake.jpg".to_string(),
        }
    }

    #[test]
    fn test_add_form_converts() {
        let item = NewCartEntry::try_from(form("15.00")).unwrap();
        assert_eq!(item.name, "Snake Plant");
        assert_eq!(item.unit_cost.to_string(), "$15.00");
    }

    #[test]
    fn test_add_form_rejects_negative_price() {
        assert!(matches!(
            NewCartEntry::try_from(form("-1")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_add_form_rejects_blank_name() {
        let mut blank = form("1");
        blank.name = "   ".to_string();
        assert!(matches!(
            NewCartEntry::try_from(blank),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_cart_view_formats_totals() {
        let cart = CartState::new()
            .reduce(CartCommand::AddItem(NewCartEntry::try_from(form("5.00")).unwrap()))
            .reduce(CartCommand::UpdateQuantity {
                id: ProductId::new(1),
                quantity: 5,
            });

        let view = CartView::from(&cart);

        assert_eq!(view.item_count, 5);
        assert_eq!(view.total, "$25.00");
        assert_eq!(view.items.first().unwrap().subtotal, "$25.00");
        assert_eq!(view.items.first().unwrap().unit_cost, "$5.00");
    }

    #[test]
    fn test_empty_cart_renders_placeholder() {
        let html = CartItemsTemplate {
            cart: CartView::from(&CartState::new()),
        }
        .render()
        .unwrap();

        assert!(html.contains("Your cart is empty."));
        assert!(!html.contains("Checkout"));
    }

    #[test]
    fn test_cart_items_render_controls() {
        let cart = CartState::new()
            .reduce(CartCommand::AddItem(NewCartEntry::try_from(form("2.555")).unwrap()))
            .reduce(CartCommand::AdjustQuantity {
                id: ProductId::new(1),
                delta: 1,
            });

        let html = CartItemsTemplate {
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();

        assert!(html.contains("Snake Plant"));
        assert!(html.contains("Total: $5.11"));
        assert!(html.contains("/cart/increment"));
        assert!(html.contains("/cart/decrement"));
        assert!(html.contains("/cart/remove"));
        assert!(html.contains("Continue Shopping"));
    }

    #[test]
    fn test_cart_page_shows_item_count() {
        let cart = CartState::new()
            .reduce(CartCommand::AddItem(NewCartEntry::try_from(form("1")).unwrap()));

        let html = CartShowTemplate {
            cart: CartView::from(&cart),
        }
        .render()
        .unwrap();

        assert!(html.contains("Your Cart (1 items)"));
    }

    #[test]
    fn test_cart_page_loads_pinned_htmx_with_integrity() {
        let html = CartShowTemplate {
            cart: CartView::from(&CartState::new()),
        }
        .render()
        .unwrap();

        assert!(html.contains(&format!(
            "src=\"{}\"",
            crate::middleware::security_headers::HTMX_SCRIPT_URL
        )));
        assert!(html.contains("integrity=\"sha384-"));
    }
}
