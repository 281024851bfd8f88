//! Cart state and the reducer that mutates it.
//!
//! A [`CartState`] is an ordered list of [`CartEntry`] values, unique by
//! product, plus a running total of units. Every mutation goes through one of
//! the methods below (or [`CartState::apply`] with a [`CartCommand`]) and runs
//! to completion before returning, so the state is never observed half
//! updated.
//!
//! # Invariants
//!
//! - `total_quantity` equals the sum of every entry's quantity.
//! - No two entries share a product id.
//! - Every entry has a quantity of at least 1. An entry that would drop below
//!   1 is removed.

use serde::{Deserialize, Serialize};

use crate::types::{Money, Price, ProductId};

/// Catalog data for a product being added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartEntry {
    /// Catalog product id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price of a single unit.
    pub unit_cost: Price,
    /// Product image URL.
    pub image: String,
}

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartEntry {
    id: ProductId,
    name: String,
    unit_cost: Price,
    image: String,
    quantity: u32,
}

impl CartEntry {
    fn new(item: NewCartEntry) -> Self {
        Self {
            id: item.id,
            name: item.name,
            unit_cost: item.unit_cost,
            image: item.image,
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn unit_cost(&self) -> Price {
        self.unit_cost
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Units of this product in the cart. Always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `quantity × unit_cost`, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.unit_cost.times(self.quantity)
    }
}

/// A cart mutation.
///
/// Commands serialize with a `command` tag so they can be scripted:
///
/// ```
/// use cartwheel_core::{CartCommand, ProductId};
///
/// let json = r#"{"command":"update_quantity","id":1,"quantity":5}"#;
/// let command: CartCommand = serde_json::from_str(json).unwrap();
/// assert_eq!(
///     command,
///     CartCommand::UpdateQuantity { id: ProductId::new(1), quantity: 5 }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CartCommand {
    /// Add one unit of a product, creating its entry if needed.
    AddItem(NewCartEntry),
    /// Drop a product's entry entirely.
    RemoveItem { id: ProductId },
    /// Set a product's quantity. Values below 1 are ignored.
    UpdateQuantity { id: ProductId, quantity: i64 },
    /// Change a product's quantity by `delta`, removing it if the result is
    /// below 1.
    AdjustQuantity { id: ProductId, delta: i64 },
    /// Empty the cart.
    Clear,
}

impl CartCommand {
    /// Short name for logs and breadcrumbs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddItem(_) => "add_item",
            Self::RemoveItem { .. } => "remove_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::AdjustQuantity { .. } => "adjust_quantity",
            Self::Clear => "clear",
        }
    }
}

/// What applying a command did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CartOutcome {
    /// A new entry was appended with quantity 1.
    Added,
    /// An existing entry gained one unit.
    Incremented { quantity: u32 },
    /// An entry's quantity was set to a new value.
    QuantityChanged { from: u32, to: u32 },
    /// An entry was deleted along with its units.
    Removed { quantity: u32 },
    /// Every entry was deleted.
    Cleared { entries: usize },
    /// Nothing changed.
    Unchanged,
}

impl CartOutcome {
    /// Whether the cart differs from before the command.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged | Self::Cleared { entries: 0 })
    }
}

/// The cart: ordered entries plus a running unit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    entries: Vec<CartEntry>,
    total_quantity: u64,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            total_quantity: 0,
        }
    }

    /// Entries in the order they were first added.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Sum of every entry's quantity.
    #[must_use]
    pub const fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Look up an entry by product id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry's subtotal. Computed on each call.
    #[must_use]
    pub fn grand_total(&self) -> Money {
        self.entries.iter().map(CartEntry::subtotal).sum()
    }

    /// Apply a command in place.
    pub fn apply(&mut self, command: CartCommand) -> CartOutcome {
        let outcome = match command {
            CartCommand::AddItem(item) => self.add_item(item),
            CartCommand::RemoveItem { id } => self.remove_item(id),
            CartCommand::UpdateQuantity { id, quantity } => self.update_quantity(id, quantity),
            CartCommand::AdjustQuantity { id, delta } => self.adjust_quantity(id, delta),
            CartCommand::Clear => self.clear(),
        };
        debug_assert_eq!(self.total_quantity, self.recount());
        outcome
    }

    /// Return the state that results from applying `command` to `self`.
    #[must_use]
    pub fn reduce(mut self, command: CartCommand) -> Self {
        self.apply(command);
        self
    }

    /// Add one unit of `item`.
    ///
    /// An existing entry with the same id gains a unit; its name, price and
    /// image are left as they were. Otherwise a new entry is appended with
    /// quantity 1. An entry already at `u32::MAX` is left alone.
    pub fn add_item(&mut self, item: NewCartEntry) -> CartOutcome {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == item.id) {
            let Some(quantity) = entry.quantity.checked_add(1) else {
                return CartOutcome::Unchanged;
            };
            entry.quantity = quantity;
            self.total_quantity += 1;
            return CartOutcome::Incremented { quantity };
        }

        self.entries.push(CartEntry::new(item));
        self.total_quantity += 1;
        CartOutcome::Added
    }

    /// Remove the entry for `id`, if any.
    pub fn remove_item(&mut self, id: ProductId) -> CartOutcome {
        let Some(index) = self.position(id) else {
            return CartOutcome::Unchanged;
        };
        let entry = self.entries.remove(index);
        self.total_quantity -= u64::from(entry.quantity);
        CartOutcome::Removed {
            quantity: entry.quantity,
        }
    }

    /// Set the quantity for `id`.
    ///
    /// Quantities below 1 leave the cart unchanged; use
    /// [`remove_item`](Self::remove_item) or
    /// [`adjust_quantity`](Self::adjust_quantity) to drop an entry. Values
    /// above `u32::MAX` are clamped.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> CartOutcome {
        if quantity < 1 {
            return CartOutcome::Unchanged;
        }
        match self.position(id) {
            Some(index) => self.set_quantity(index, clamp_quantity(quantity)),
            None => CartOutcome::Unchanged,
        }
    }

    /// Change the quantity for `id` by `delta`.
    ///
    /// If the result would be below 1 the entry is removed.
    pub fn adjust_quantity(&mut self, id: ProductId, delta: i64) -> CartOutcome {
        let Some(index) = self.position(id) else {
            return CartOutcome::Unchanged;
        };
        let Some(entry) = self.entries.get(index) else {
            return CartOutcome::Unchanged;
        };
        let target = i64::from(entry.quantity).saturating_add(delta);
        if target < 1 {
            return self.remove_item(id);
        }
        self.set_quantity(index, clamp_quantity(target))
    }

    /// Remove every entry.
    pub fn clear(&mut self) -> CartOutcome {
        let entries = self.entries.len();
        self.entries.clear();
        self.total_quantity = 0;
        CartOutcome::Cleared { entries }
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn set_quantity(&mut self, index: usize, quantity: u32) -> CartOutcome {
        let Some(entry) = self.entries.get_mut(index) else {
            return CartOutcome::Unchanged;
        };
        let from = entry.quantity;
        if from == quantity {
            return CartOutcome::Unchanged;
        }
        entry.quantity = quantity;
        self.total_quantity = self.total_quantity - u64::from(from) + u64::from(quantity);
        CartOutcome::QuantityChanged { from, to: quantity }
    }

    fn recount(&self) -> u64 {
        self.entries.iter().map(|entry| u64::from(entry.quantity)).sum()
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn item(id: i32, name: &str, unit_cost: &str) -> NewCartEntry {
        NewCartEntry {
            id: ProductId::new(id),
            name: name.to_string(),
            unit_cost: Price::parse(unit_cost).unwrap(),
            image: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn cart_with(id: i32, unit_cost: &str, quantity: i64) -> CartState {
        let mut cart = CartState::new();
        cart.add_item(item(id, "Fern", unit_cost));
        cart.update_quantity(ProductId::new(id), quantity);
        cart
    }

    #[test]
    fn test_add_to_empty_cart() {
        let cart = CartState::new().reduce(CartCommand::AddItem(item(1, "A", "10")));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 1);
        let entry = &cart.entries()[0];
        assert_eq!(entry.id(), ProductId::new(1));
        assert_eq!(entry.name(), "A");
        assert_eq!(entry.quantity(), 1);
    }

    #[test]
    fn test_add_existing_increments_without_new_entry() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "A", "10"));
        cart.add_item(item(2, "B", "3"));

        let outcome = cart.add_item(item(1, "A", "10"));

        assert_eq!(outcome, CartOutcome::Incremented { quantity: 2 });
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = CartState::new();
        for id in [3, 1, 2, 1, 3] {
            cart.add_item(item(id, "P", "1"));
        }
        let ids: Vec<i32> = cart.entries().iter().map(|e| e.id().as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_keeps_first_catalog_data() {
        let mut cart = CartState::new();
        cart.add_item(item(1, "Old name", "4"));
        cart.add_item(item(1, "New name", "9"));

        let entry = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(entry.name(), "Old name");
        assert_eq!(entry.unit_cost(), Price::parse("4").unwrap());
    }

    #[test]
    fn test_total_matches_sum_for_many_adds() {
        let mut cart = CartState::new();
        for i in 0..200 {
            cart.add_item(item(i % 7, "P", "1.25"));
            assert_eq!(cart.total_quantity(), cart.recount());
        }
        assert_eq!(cart.total_quantity(), 200);
        assert_eq!(cart.len(), 7);
    }

    fn id_strategy() -> impl Strategy<Value = ProductId> {
        (1..=5i32).prop_map(ProductId::new)
    }

    fn command_strategy() -> impl Strategy<Value = CartCommand> {
        prop_oneof![
            4 => (1..=5i32, 0..10_000i64).prop_map(|(id, cents)| {
                CartCommand::AddItem(NewCartEntry {
                    id: ProductId::new(id),
                    name: format!("Product {id}"),
                    unit_cost: Price::from_cents(cents).unwrap(),
                    image: String::new(),
                })
            }),
            1 => id_strategy().prop_map(|id| CartCommand::RemoveItem { id }),
            2 => (id_strategy(), -3..10i64)
                .prop_map(|(id, quantity)| CartCommand::UpdateQuantity { id, quantity }),
            3 => (id_strategy(), -4..4i64)
                .prop_map(|(id, delta)| CartCommand::AdjustQuantity { id, delta }),
            1 => Just(CartCommand::Clear),
        ]
    }

    proptest! {
        #[test]
        fn test_invariants_hold_for_any_command_sequence(
            commands in prop::collection::vec(command_strategy(), 0..200)
        ) {
            let mut cart = CartState::new();
            for command in commands {
                let before = cart.clone();
                let outcome = cart.apply(command);

                prop_assert_eq!(cart.total_quantity(), cart.recount());
                prop_assert!(cart.entries().iter().all(|entry| entry.quantity() >= 1));

                let mut ids: Vec<ProductId> = cart.entries().iter().map(CartEntry::id).collect();
                ids.sort_unstable();
                ids.dedup();
                prop_assert_eq!(ids.len(), cart.len());

                if !outcome.is_change() {
                    prop_assert_eq!(&cart, &before);
                }
            }
        }

        #[test]
        fn test_any_add_sequence_counts_every_unit(
            ids in prop::collection::vec(1..=5i32, 1..100)
        ) {
            let mut cart = CartState::new();
            for id in ids {
                let existed = cart.get(ProductId::new(id)).is_some();
                let len = cart.len();
                let total = cart.total_quantity();

                cart.add_item(item(id, "P", "1"));

                prop_assert_eq!(cart.total_quantity(), total + 1);
                prop_assert_eq!(cart.len(), if existed { len } else { len + 1 });
            }
        }
    }

    #[test]
    fn test_add_at_max_quantity_is_noop() {
        let mut cart = cart_with(1, "1", i64::from(u32::MAX));
        let before = cart.clone();

        assert_eq!(cart.add_item(item(1, "Fern", "1")), CartOutcome::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = cart_with(1, "2", 4);
        cart.add_item(item(2, "B", "1"));

        let outcome = cart.remove_item(ProductId::new(1));

        assert_eq!(outcome, CartOutcome::Removed { quantity: 4 });
        assert_eq!(cart.total_quantity(), 1);
        assert!(cart.get(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = cart_with(1, "2", 3);
        let before = cart.clone();

        assert_eq!(cart.remove_item(ProductId::new(99)), CartOutcome::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_adjusts_total() {
        let mut cart = cart_with(1, "5.00", 3);
        assert_eq!(cart.total_quantity(), 3);

        let outcome = cart.update_quantity(ProductId::new(1), 5);

        assert_eq!(outcome, CartOutcome::QuantityChanged { from: 3, to: 5 });
        assert_eq!(cart.total_quantity(), 5);
        let entry = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(entry.subtotal().amount_string(), "25.00");
    }

    #[test]
    fn test_update_quantity_below_one_is_noop() {
        let mut cart = cart_with(1, "5.00", 3);
        let before = cart.clone();

        assert_eq!(cart.update_quantity(ProductId::new(1), 0), CartOutcome::Unchanged);
        assert_eq!(cart.update_quantity(ProductId::new(1), -4), CartOutcome::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let mut cart = cart_with(1, "5.00", 3);
        let before = cart.clone();

        assert_eq!(cart.update_quantity(ProductId::new(2), 8), CartOutcome::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_quantity_clamps_huge_values() {
        let mut cart = cart_with(1, "1", 1);
        cart.update_quantity(ProductId::new(1), i64::MAX);

        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity(), u32::MAX);
        assert_eq!(cart.total_quantity(), u64::from(u32::MAX));
    }

    #[test]
    fn test_adjust_quantity_up_and_down() {
        let mut cart = cart_with(1, "1", 2);

        assert_eq!(
            cart.adjust_quantity(ProductId::new(1), 1),
            CartOutcome::QuantityChanged { from: 2, to: 3 }
        );
        assert_eq!(
            cart.adjust_quantity(ProductId::new(1), -1),
            CartOutcome::QuantityChanged { from: 3, to: 2 }
        );
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_adjust_below_one_removes_entry() {
        let mut cart = cart_with(1, "1", 1);

        let outcome = cart.adjust_quantity(ProductId::new(1), -1);

        assert_eq!(outcome, CartOutcome::Removed { quantity: 1 });
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_adjust_large_negative_delta_removes_entry() {
        let mut cart = cart_with(1, "1", 6);
        cart.add_item(item(2, "B", "1"));

        cart.adjust_quantity(ProductId::new(1), i64::MIN);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_adjust_absent_is_noop() {
        let mut cart = CartState::new();
        assert_eq!(cart.adjust_quantity(ProductId::new(1), 1), CartOutcome::Unchanged);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cart = cart_with(1, "1", 6);
        cart.add_item(item(2, "B", "1"));

        assert_eq!(cart.clear(), CartOutcome::Cleared { entries: 2 });
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert!(!cart.clear().is_change());
    }

    #[test]
    fn test_grand_total_rounds_for_display() {
        let cart = cart_with(1, "2.555", 2);
        assert_eq!(cart.grand_total().amount_string(), "5.11");
    }

    #[test]
    fn test_grand_total_sums_entries() {
        let mut cart = cart_with(1, "5.00", 3);
        cart.add_item(item(2, "B", "0.99"));
        cart.add_item(item(2, "B", "0.99"));

        assert_eq!(cart.grand_total().to_string(), "$16.98");
        assert_eq!(CartState::new().grand_total().to_string(), "$0.00");
    }

    #[test]
    fn test_commands_deserialize_from_tagged_json() {
        let json = r#"[
            {"command":"add_item","id":1,"name":"A","unit_cost":"10","image":"a.jpg"},
            {"command":"adjust_quantity","id":1,"delta":2},
            {"command":"remove_item","id":4},
            {"command":"clear"}
        ]"#;
        let commands: Vec<CartCommand> = serde_json::from_str(json).unwrap();

        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].name(), "add_item");
        assert_eq!(
            commands[1],
            CartCommand::AdjustQuantity {
                id: ProductId::new(1),
                delta: 2
            }
        );
        assert_eq!(commands[3], CartCommand::Clear);
    }

    #[test]
    fn test_state_serializes_entries_and_total() {
        let cart = cart_with(1, "5.00", 2);
        let value = serde_json::to_value(&cart).unwrap();

        assert_eq!(value["total_quantity"], 2);
        assert_eq!(value["entries"][0]["quantity"], 2);
        assert_eq!(value["entries"][0]["unit_cost"], "5.00");
    }
}
