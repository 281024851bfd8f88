//! Cartwheel Core - Cart state container and shared types.
//!
//! This crate provides the pieces every Cartwheel component shares:
//! - `storefront` - HTTP server rendering the cart view
//! - `cli` - Command-line replay of cart command scripts
//!
//! # Architecture
//!
//! The core crate contains only types and the cart reducer - no I/O, no HTTP,
//! no locking. Callers own a [`CartState`] and decide how it is shared.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices and money amounts
//! - [`cart`] - Cart entries, commands and the reducer that applies them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{CartCommand, CartEntry, CartOutcome, CartState, NewCartEntry};
pub use types::*;
