//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  12 × 8 sq.ft × ₹45.10 in floating point:                               │
//! │    4329.599999999999  ❌ WRONG!                                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    Catalog rates arrive as decimals ("45.10") and are converted ONCE    │
//! │    to 4510 paise. Quantities stay exact decimals until they meet a      │
//! │    price, and the product is rounded to the paisa exactly once.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use seeb_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let rate = Money::from_minor(5000);                  // ₹50.00 per sq.ft
//! let amount = rate.multiply_decimal(Decimal::from(96)); // 96 sq.ft
//! assert_eq!(amount.to_string(), "4800.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

use crate::MINOR_PER_MAJOR;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for credits and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Service.rate ──► base amount = total area × rate ──┐                  │
/// │                                                      ├──► grand total  │
/// │  Addon.price  ──► addon charge = qty × price ───────┘                  │
/// │                                                                         │
/// │  Every total shown on the update-cart sheet flows through this type    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise).
    ///
    /// ## Example
    /// ```rust
    /// use seeb_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // Represents ₹10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units (rupees and paise).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -₹5.50, not -₹4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Converts a decimal amount in major units into Money.
    ///
    /// Rounds half away from zero to the nearest paisa, which is how the
    /// catalog's "x.xx" strings are meant to be read. Values outside the
    /// `i64` range saturate.
    ///
    /// ## Example
    /// ```rust
    /// use seeb_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let rate = Money::from_decimal(Decimal::new(45105, 3)); // 45.105
    /// assert_eq!(rate.minor(), 4511);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Self {
        let minor = amount
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .map(|d| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|d| d.to_i64());

        match minor {
            Some(minor) => Money(minor),
            None if amount.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Returns the value as a decimal in major units (4800.00).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in minor units (paise).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a whole quantity.
    ///
    /// ## Example
    /// ```rust
    /// use seeb_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(2000); // ₹20.00
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 6000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a measured (possibly fractional) quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Rate: ₹50.00 / sq.ft
    /// Area: 12.5 × 8 = 100 sq.ft
    ///      │
    ///      ▼
    /// multiply_decimal(100) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Base amount: ₹5000.00
    /// ```
    pub fn multiply_decimal(&self, qty: Decimal) -> Money {
        match self.to_decimal().checked_mul(qty) {
            Some(product) => Money::from_decimal(product),
            None if self.is_negative() != qty.is_sign_negative() => Money(i64::MIN),
            None => Money(i64::MAX),
        }
    }

    /// Formats the value with exactly two decimals and no symbol ("4800.00").
    ///
    /// This is the representation the cart API expects for `amount`,
    /// `rate` and add-on `total` fields.
    pub fn to_fixed_2(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display renders two decimals without a currency symbol.
///
/// ## Note
/// Localised formatting (₹, digit grouping) is done by the front end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed_2())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition saturates at the `i64` bounds, like the multiply helpers.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

/// Multiplication by a whole quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Multiplication by a measured quantity.
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: Decimal) -> Self {
        self.multiply_decimal(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::from_minor(480000).to_string(), "4800.00");
        assert_eq!(Money::from_minor(500).to_string(), "5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::from_minor(0).to_string(), "0.00");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(Decimal::new(45105, 3)).minor(), 4511);
        assert_eq!(Money::from_decimal(Decimal::new(45104, 3)).minor(), 4510);
        assert_eq!(Money::from_decimal(Decimal::new(-45105, 3)).minor(), -4511);
        assert_eq!(Money::from_decimal(Decimal::from(50)).minor(), 5000);
    }

    #[test]
    fn test_multiply_decimal_area() {
        let rate = Money::from_minor(5000);
        assert_eq!(rate.multiply_decimal(Decimal::from(96)).minor(), 480000);

        // 45.10 × 96 = 4329.60 exactly, no float drift
        let rate = Money::from_minor(4510);
        assert_eq!(rate.multiply_decimal(Decimal::from(96)).to_string(), "4329.60");

        // 33.33 × 2.5 = 83.325 → 83.33
        let rate = Money::from_minor(3333);
        assert_eq!(rate.multiply_decimal(Decimal::new(25, 1)).minor(), 8333);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a * 3_i64).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_addition_saturates() {
        let max = Money::from_minor(i64::MAX);
        assert_eq!((max + Money::from_minor(1)).minor(), i64::MAX);

        let mut total = Money::from_minor(i64::MAX - 5);
        total += Money::from_minor(100);
        assert_eq!(total.minor(), i64::MAX);

        let total: Money = vec![max, max, Money::from_minor(1)].into_iter().sum();
        assert_eq!(total.minor(), i64::MAX);

        let min = Money::from_minor(i64::MIN);
        assert_eq!((min + Money::from_minor(-1)).minor(), i64::MIN);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(Money::from_minor(-1).is_negative());
    }
}
