//! # Pricing Module
//!
//! Derives the billable quantity and the line totals from what the user has
//! typed into the dimension fields.
//!
//! ## Computation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  width "12" ──┐                                                         │
//! │               ├─► total_area = 12 × 8 = 96   (square_feet)              │
//! │  height "8" ──┘          │                                              │
//! │                          │        value "15" ─► total_area = 15 (other) │
//! │                          ▼                                              │
//! │            base_amount = total_area × rate                              │
//! │                          │                                              │
//! │  add-on selection ──► addon_amount = Σ qty × price (selected only)      │
//! │                          │                                              │
//! │                          ▼                                              │
//! │            grand_total = base_amount + addon_amount                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is a pure function of its inputs; the session simply
//! calls them again after each keystroke.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::addons::AddonSelection;
use crate::money::Money;
use crate::types::RateType;

/// Separator between width and height in a persisted area value.
pub const DIMENSION_SEPARATOR: char = 'X';

// =============================================================================
// Number Parsing
// =============================================================================

/// Parses the leading number of a text field.
///
/// Mirrors how a numeric text input is read on the device: surrounding
/// whitespace is ignored and trailing garbage after the number is dropped
/// ("12ft" → 12). Returns `None` when no digits lead the text.
///
/// ## Example
/// ```rust
/// use seeb_core::pricing::parse_measure;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_measure("12.5"), Some(Decimal::new(125, 1)));
/// assert_eq!(parse_measure(" 8ft"), Some(Decimal::from(8)));
/// assert_eq!(parse_measure(""), None);
/// assert_eq!(parse_measure("abc"), None);
/// ```
pub fn parse_measure(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in text.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    let number = text[..end].trim_start_matches('+').trim_end_matches('.');
    let number = match number.strip_prefix('-') {
        Some(rest) if rest.starts_with('.') => format!("-0{}", rest),
        _ if number.starts_with('.') => format!("0{}", number),
        _ => number.to_string(),
    };

    Decimal::from_str(&number).ok()
}

/// Parses a measure, treating empty or non-numeric text as zero.
#[inline]
pub fn measure_or_zero(text: &str) -> Decimal {
    parse_measure(text).unwrap_or(Decimal::ZERO)
}

/// Formats a quantity without trailing zeros ("12", "12.5").
pub fn format_measure(value: Decimal) -> String {
    value.normalize().to_string()
}

// =============================================================================
// Dimension Input
// =============================================================================

/// Raw text of the dimension fields, exactly as typed.
///
/// Area rate types use `width`/`height`; every other rate type uses `value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DimensionInput {
    pub width: String,
    pub height: String,
    pub value: String,
}

impl DimensionInput {
    /// Input for an area rate type.
    pub fn area(width: impl Into<String>, height: impl Into<String>) -> Self {
        DimensionInput {
            width: width.into(),
            height: height.into(),
            value: String::new(),
        }
    }

    /// Input for a single-value rate type.
    pub fn single(value: impl Into<String>) -> Self {
        DimensionInput {
            width: String::new(),
            height: String::new(),
            value: value.into(),
        }
    }

    /// Restores the fields from a persisted line-item value.
    ///
    /// Area values are stored as `"<width>X<height>"`; the separator is
    /// matched case-insensitively. A value without a separator fills only
    /// the width so the user sees what was stored and can complete it.
    pub fn from_persisted(rate_type: RateType, value: &str) -> Self {
        if !rate_type.is_area() {
            return DimensionInput::single(value.trim());
        }

        match value.split_once(['X', 'x']) {
            Some((width, height)) => DimensionInput::area(width.trim(), height.trim()),
            None => DimensionInput::area(value.trim(), ""),
        }
    }

    /// Effective billable quantity.
    ///
    /// - square_feet: `width × height`
    /// - everything else: the leading number of `value`
    ///
    /// Empty or non-numeric fields count as zero.
    pub fn total_area(&self, rate_type: RateType) -> Decimal {
        if rate_type.is_area() {
            let width = measure_or_zero(&self.width);
            let height = measure_or_zero(&self.height);
            width.checked_mul(height).unwrap_or(Decimal::MAX)
        } else {
            measure_or_zero(&self.value)
        }
    }

    /// The `value` string persisted on the cart line item.
    ///
    /// ## Example
    /// ```rust
    /// use seeb_core::pricing::DimensionInput;
    /// use seeb_core::types::RateType;
    ///
    /// let input = DimensionInput::area("12", "8.0");
    /// assert_eq!(input.persisted_value(RateType::SquareFeet), "12X8");
    /// ```
    pub fn persisted_value(&self, rate_type: RateType) -> String {
        if rate_type.is_area() {
            format!(
                "{}{}{}",
                format_measure(measure_or_zero(&self.width)),
                DIMENSION_SEPARATOR,
                format_measure(measure_or_zero(&self.height))
            )
        } else {
            format_measure(measure_or_zero(&self.value))
        }
    }
}

// =============================================================================
// Line Quote
// =============================================================================

/// Priced summary of one line item.
///
/// ## Invariant
/// `grand_total == base_amount + addon_amount`, exactly, in paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineQuote {
    /// Billable quantity in units of the rate type.
    #[ts(type = "string")]
    pub total_area: Decimal,

    /// total_area × rate.
    pub base_amount: Money,

    /// Σ qty × price over selected add-ons.
    pub addon_amount: Money,

    /// base_amount + addon_amount.
    pub grand_total: Money,
}

impl LineQuote {
    /// Prices a line from its rate, measured quantity and add-on selection.
    pub fn compute(
        rate_type: RateType,
        rate: Money,
        input: &DimensionInput,
        addons: &AddonSelection,
    ) -> Self {
        let total_area = input.total_area(rate_type);
        let base_amount = base_amount(total_area, rate);
        let addon_amount = addons.total();

        LineQuote {
            total_area,
            base_amount,
            addon_amount,
            grand_total: base_amount + addon_amount,
        }
    }

    /// Grand total rendered to two decimal places.
    pub fn grand_total_display(&self) -> String {
        self.grand_total.to_fixed_2()
    }
}

/// `total_area × rate`, rounded once to the paisa.
#[inline]
pub fn base_amount(total_area: Decimal, rate: Money) -> Money {
    rate.multiply_decimal(total_area)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Addon, AddonId, PriceType};

    #[test]
    fn test_parse_measure_leading_number() {
        assert_eq!(parse_measure("12"), Some(Decimal::from(12)));
        assert_eq!(parse_measure("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_measure("12ft"), Some(Decimal::from(12)));
        assert_eq!(parse_measure("12."), Some(Decimal::from(12)));
        assert_eq!(parse_measure(".5"), Some(Decimal::new(5, 1)));
        assert_eq!(parse_measure("-3"), Some(Decimal::from(-3)));
        assert_eq!(parse_measure("+4"), Some(Decimal::from(4)));
        assert_eq!(parse_measure("   "), None);
        assert_eq!(parse_measure("."), None);
        assert_eq!(parse_measure("x12"), None);
    }

    #[test]
    fn test_square_feet_area_and_value() {
        let input = DimensionInput::area("12", "8");
        assert_eq!(input.total_area(RateType::SquareFeet), Decimal::from(96));
        assert_eq!(input.persisted_value(RateType::SquareFeet), "12X8");

        let quote = LineQuote::compute(
            RateType::SquareFeet,
            Money::from_minor(5000),
            &input,
            &AddonSelection::default(),
        );
        assert_eq!(quote.base_amount.to_string(), "4800.00");
        assert_eq!(quote.grand_total_display(), "4800.00");
    }

    #[test]
    fn test_empty_dimension_counts_as_zero() {
        let input = DimensionInput::area("12", "");
        assert_eq!(input.total_area(RateType::SquareFeet), Decimal::ZERO);
        assert_eq!(input.persisted_value(RateType::SquareFeet), "12X0");

        let input = DimensionInput::single("abc");
        assert_eq!(input.total_area(RateType::RunningFeet), Decimal::ZERO);
    }

    #[test]
    fn test_single_value_rate_types() {
        let input = DimensionInput::single("15.5");
        assert_eq!(input.total_area(RateType::RunningFeet), Decimal::new(155, 1));
        assert_eq!(input.persisted_value(RateType::RunningFeet), "15.5");

        let quote = LineQuote::compute(
            RateType::Points,
            Money::from_minor(35000),
            &DimensionInput::single("4"),
            &AddonSelection::default(),
        );
        assert_eq!(quote.base_amount.minor(), 140000);
    }

    #[test]
    fn test_from_persisted_value() {
        let input = DimensionInput::from_persisted(RateType::SquareFeet, "12X8");
        assert_eq!(input, DimensionInput::area("12", "8"));

        let input = DimensionInput::from_persisted(RateType::SquareFeet, "10.5x4");
        assert_eq!(input, DimensionInput::area("10.5", "4"));

        let input = DimensionInput::from_persisted(RateType::SquareFeet, "10");
        assert_eq!(input, DimensionInput::area("10", ""));

        let input = DimensionInput::from_persisted(RateType::Unit, " 3 ");
        assert_eq!(input, DimensionInput::single("3"));
    }

    #[test]
    fn test_width_times_height_is_commutative_in_amount() {
        let rate = Money::from_minor(4510);
        let a = base_amount(DimensionInput::area("12.5", "8").total_area(RateType::SquareFeet), rate);
        let b = base_amount(DimensionInput::area("8", "12.5").total_area(RateType::SquareFeet), rate);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "4510.00");
    }

    fn addon(id: u64, price_type: PriceType, price: Decimal, qty: i64, required: bool) -> Addon {
        Addon {
            id: AddonId::new(id),
            name: format!("Addon {}", id),
            group_name: None,
            price_type,
            price,
            qty: Decimal::from(qty),
            is_required: required,
            description: None,
        }
    }

    fn assert_consistent(input: &DimensionInput, rate: Money, selection: &AddonSelection) -> LineQuote {
        let first = LineQuote::compute(RateType::SquareFeet, rate, input, selection);
        let second = LineQuote::compute(RateType::SquareFeet, rate, input, selection);
        assert_eq!(first, second);

        assert_eq!(
            first.grand_total.minor(),
            first.base_amount.minor() + first.addon_amount.minor()
        );
        let charged: Money = selection.charges().iter().map(|c| c.total).sum();
        assert_eq!(first.addon_amount, charged);
        first
    }

    #[test]
    fn test_quote_is_stable_and_sums_across_selections() {
        let catalog = vec![
            addon(1, PriceType::Unit, Decimal::from(100), 1, false),
            addon(2, PriceType::Percentage, Decimal::from(10), 20, true),
            addon(3, PriceType::Unit, Decimal::new(4550, 2), 1, false),
            addon(4, PriceType::Percentage, Decimal::new(3333, 2), 12, false),
        ];
        let input = DimensionInput::area("12.5", "8");
        let area = input.total_area(RateType::SquareFeet);
        let rate = Money::from_minor(5000);
        let mut selection = AddonSelection::from_catalog(&catalog, area);

        let quote = assert_consistent(&input, rate, &selection);
        assert_eq!(quote.grand_total_display(), "5200.00");

        let mut totals = vec![quote.grand_total];
        selection.toggle(AddonId::new(1), area).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);
        selection.toggle(AddonId::new(4), area).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);
        selection.increment(AddonId::new(3)).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);
        selection.toggle(AddonId::new(1), area).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);
        selection.decrement(AddonId::new(3)).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);
        selection.toggle(AddonId::new(2), area).unwrap();
        totals.push(assert_consistent(&input, rate, &selection).grand_total);

        let shown: Vec<String> = totals.iter().map(Money::to_fixed_2).collect();
        assert_eq!(
            shown,
            vec!["5200.00", "5300.00", "5699.96", "5790.96", "5690.96", "5645.46", "5645.46"]
        );
    }

    #[test]
    fn test_huge_dimensions_saturate_instead_of_overflowing() {
        let catalog = vec![addon(1, PriceType::Percentage, Decimal::from(10), 20, true)];
        let input = DimensionInput::area("9999999999", "9999999999");
        let area = input.total_area(RateType::SquareFeet);
        let selection = AddonSelection::from_catalog(&catalog, area);

        let quote = LineQuote::compute(RateType::SquareFeet, Money::from_minor(5000), &input, &selection);
        assert_eq!(quote.base_amount.minor(), i64::MAX);
        assert_eq!(quote.grand_total.minor(), i64::MAX);
        assert!(!quote.grand_total_display().starts_with('-'));
    }
}
