//! Type-safe price representation using decimal arithmetic.
//!
//! A [`Price`] is what a catalog charges for one unit of a product. Multiplying
//! it by a quantity produces [`Money`], the type used for subtotals and grand
//! totals. Only [`Money`] is ever rounded, and only when it is displayed.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places shown for monetary amounts.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Symbol prefixed to formatted amounts. The store trades in a single currency.
pub const CURRENCY_SYMBOL: &str = "$";

/// Largest accepted unit cost (one million).
///
/// At this bound a full cart of `u32::MAX` units per product still fits in a
/// [`Decimal`] with room for two decimal places, so totals never saturate and
/// always display as `X.XX`.
pub const MAX_UNIT_COST: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount is above [`MAX_UNIT_COST`].
    #[error("price cannot exceed 1000000 (got {0})")]
    TooLarge(Decimal),
    /// The input is not a decimal number.
    #[error("price is not a valid decimal: {0}")]
    Invalid(String),
}

/// The cost of a single unit of a product.
///
/// ## Constraints
///
/// - Amount is `>= 0`
/// - Amount is `<= MAX_UNIT_COST`
///
/// ## Examples
///
/// ```
/// use cartwheel_core::Price;
///
/// assert!(Price::parse("19.99").is_ok());
/// assert!(Price::parse("0").is_ok());
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("1000000.01").is_err());
/// assert!(Price::parse("free").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero and
    /// [`PriceError::TooLarge`] if it is above [`MAX_UNIT_COST`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Decimal::ZERO {
            return Err(PriceError::Negative(amount));
        }
        if amount > MAX_UNIT_COST {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero and
    /// [`PriceError::TooLarge`] if the amount is above [`MAX_UNIT_COST`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// Parse a price from a string such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a decimal number,
    /// otherwise the errors of [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(format!("{s:?}: {e}")))?;
        Self::new(amount)
    }

    /// Get the unrounded decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Cost of `quantity` units at this price.
    ///
    /// Exact for every `u32` quantity because the unit cost is bounded by
    /// [`MAX_UNIT_COST`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Mul<u32> for Price {
    type Output = Money;

    fn mul(self, quantity: u32) -> Money {
        self.times(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Money(self.0), f)
    }
}

/// A derived monetary amount such as a line subtotal or cart total.
///
/// Arithmetic keeps full precision. Rounding to two decimal places happens
/// only when formatting, using half-away-from-zero rounding, so `5.115`
/// displays as `5.12` and `0.125` as `0.13`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the unrounded decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded for display, always carrying two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        let mut rounded = self
            .0
            .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(DISPLAY_DECIMAL_PLACES);
        rounded
    }

    /// Format without the currency symbol (e.g., `"25.00"`).
    #[must_use]
    pub fn amount_string(&self) -> String {
        self.rounded().to_string()
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{}", self.rounded())
    }
}
