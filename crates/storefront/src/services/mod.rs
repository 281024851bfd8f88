//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - The shared cart and the commands the view issues against it

pub mod cart;

pub use cart::{CartService, CartServiceError, CartUpdate};
