//! # Money Module
//!
//! Cent-rounded amounts for display and for summing sale lines.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRICE MATH vs. MONEY                                                   │
//! │                                                                         │
//! │  Sale price and conversion math is done in f64: the exchange rate is a │
//! │  real number (36.5217 Bs/$) and products are sold by weight and area.  │
//! │                                                                         │
//! │  The moment a number is SHOWN or ADDED to a total it becomes Money:    │
//! │    36.52 × 1.3 = 47.476  ──►  Money::from_amount  ──►  4748 cents      │
//! │                                                                         │
//! │  Totals are sums of rounded lines, so the receipt adds up exactly.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::money::Money;
//!
//! let price = Money::from_amount(47.476);
//! assert_eq!(price.cents(), 4748);
//!
//! let total = price + Money::from_cents(252);
//! assert_eq!(total.cents(), 5000);
//! assert_eq!(total.format_with(',', '.'), "50,00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in hundredths of the currency unit.
///
/// The type is currency-agnostic; [`crate::convert::Currency`] decides how it
/// is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Largest representable value. Arithmetic saturates here.
    pub const MAX: Money = Money(i64::MAX);

    /// Rounds a real amount to the nearest cent (half away from zero).
    ///
    /// Non-finite input and amounts too large to hold in cents become zero
    /// rather than poisoning a total.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(10.125).cents(), 1013);
    /// assert_eq!(Money::from_amount(-2.5).cents(), -250);
    /// assert_eq!(Money::from_amount(f64::NAN), Money::zero());
    /// assert_eq!(Money::from_amount(1e17), Money::zero());
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        Money::try_from_amount(amount).unwrap_or_default()
    }

    /// Like [`Money::from_amount`], but `None` when the amount is non-finite
    /// or does not fit in cents.
    pub fn try_from_amount(amount: f64) -> Option<Self> {
        let cents = (amount * 100.0).round();
        // i64::MAX as f64 is 2^63, the first value the cast would saturate on
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a real amount (for feeding back into f64 math).
    #[inline]
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Formats with exactly two decimals, the given decimal separator, and
    /// thousands grouped by `group_sep`.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::money::Money;
    ///
    /// let m = Money::from_cents(123_456_789);
    /// assert_eq!(m.format_with('.', ','), "1,234,567.89");
    /// assert_eq!(m.format_with(',', '.'), "1.234.567,89");
    /// ```
    pub fn format_with(&self, decimal_sep: char, group_sep: char) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let whole = group_thousands(self.whole_units().unsigned_abs(), group_sep);
        format!("{}{}{}{:02}", sign, whole, decimal_sep, self.cents_part())
    }
}

/// Inserts `sep` every three digits from the right.
fn group_thousands(value: u64, sep: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }

    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `1234.56` rendering for logs. Use [`crate::convert`] for UI text.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02}",
            sign,
            self.whole_units().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl std::iter::Sum for Money {
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
    fn test_from_amount_rounding() {
        assert_eq!(Money::from_amount(47.476).cents(), 4748);
        assert_eq!(Money::from_amount(47.474).cents(), 4747);
        assert_eq!(Money::from_amount(0.005).cents(), 1);
        assert_eq!(Money::from_amount(-0.005).cents(), -1);
        assert_eq!(Money::from_amount(f64::INFINITY), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_format_with_grouping() {
        assert_eq!(Money::from_cents(0).format_with(',', '.'), "0,00");
        assert_eq!(Money::from_cents(99_999).format_with('.', ','), "999.99");
        assert_eq!(Money::from_cents(100_000).format_with('.', ','), "1,000.00");
        assert_eq!(Money::from_cents(-123_456).format_with(',', '.'), "-1.234,56");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 3).cents(), 750);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_out_of_range_amounts() {
        assert_eq!(Money::try_from_amount(1e17), None);
        assert_eq!(Money::try_from_amount(-1e17), None);
        assert_eq!(Money::try_from_amount(f64::NAN), None);
        assert_eq!(Money::from_amount(1e17), Money::zero());

        // Just inside the range still converts exactly
        assert_eq!(
            Money::try_from_amount(90_000_000_000_000_000.0).map(|m| m.cents()),
            Some(9_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_arithmetic_saturates() {
        let big = Money::from_cents(i64::MAX - 10);
        assert_eq!(big + Money::from_cents(100), Money::MAX);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(big * 2, Money::MAX);

        let mut acc = big;
        acc += Money::from_cents(100);
        assert_eq!(acc, Money::MAX);

        let total: Money = vec![big, big, big].into_iter().sum();
        assert_eq!(total, Money::MAX);
    }

    #[test]
    fn test_amount_round_trip() {
        assert_eq!(Money::from_cents(4748).amount(), 47.48);
    }
}
