//! # Currency Conversion
//!
//! Foreign ↔ local conversion and the two display locales.
//!
//! ## Fail-Closed Conversion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   to_local(amount, rate)   = amount × rate                              │
//! │   to_foreign(amount, rate) = amount ÷ rate                              │
//! │                                                                         │
//! │   rate == 0 (sentinel) ─┐                                               │
//! │   rate NaN / ∞ / < 0   ─┼──► None   (never Infinity, never NaN)        │
//! │   amount <= 0 / NaN    ─┘                                               │
//! │                                                                         │
//! │   None renders as "0,00" / "0.00", never blank                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locales
//! | Currency | Example      | Decimal | Grouping |
//! |----------|--------------|---------|----------|
//! | Local    | `1.234,56`   | `,`     | `.`      |
//! | Foreign  | `1,234.56`   | `.`     | `,`      |

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Conversion
// =============================================================================

#[inline]
fn usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

#[inline]
fn usable_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Converts a foreign amount to local currency.
///
/// ## Example
/// ```rust
/// use bodega_core::convert::to_local;
///
/// assert_eq!(to_local(10.0, 36.5), Some(365.0));
/// assert_eq!(to_local(10.0, 0.0), None);
/// assert_eq!(to_local(0.0, 36.5), None);
/// ```
pub fn to_local(amount_foreign: f64, rate: f64) -> Option<f64> {
    if !usable_rate(rate) || !usable_amount(amount_foreign) {
        return None;
    }
    Some(amount_foreign * rate).filter(|v| v.is_finite())
}

/// Converts a local amount to foreign currency.
///
/// ## Example
/// ```rust
/// use bodega_core::convert::to_foreign;
///
/// assert_eq!(to_foreign(365.0, 36.5), Some(10.0));
/// assert_eq!(to_foreign(365.0, 0.0), None);
/// ```
pub fn to_foreign(amount_local: f64, rate: f64) -> Option<f64> {
    if !usable_rate(rate) || !usable_amount(amount_local) {
        return None;
    }
    Some(amount_local / rate).filter(|v| v.is_finite())
}

// =============================================================================
// Direction
// =============================================================================

/// Which way the converter is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum ConversionDirection {
    /// Dollars in, bolívares out.
    #[default]
    ForeignToLocal,
    /// Bolívares in, dollars out.
    LocalToForeign,
}

impl ConversionDirection {
    /// Applies the formula for this direction.
    pub fn convert(&self, amount: f64, rate: f64) -> Option<f64> {
        match self {
            ConversionDirection::ForeignToLocal => to_local(amount, rate),
            ConversionDirection::LocalToForeign => to_foreign(amount, rate),
        }
    }

    /// The opposite direction.
    pub const fn flipped(&self) -> Self {
        match self {
            ConversionDirection::ForeignToLocal => ConversionDirection::LocalToForeign,
            ConversionDirection::LocalToForeign => ConversionDirection::ForeignToLocal,
        }
    }

    /// Currency of the amount typed in.
    pub const fn input_currency(&self) -> Currency {
        match self {
            ConversionDirection::ForeignToLocal => Currency::Foreign,
            ConversionDirection::LocalToForeign => Currency::Local,
        }
    }

    /// Currency of the converted result.
    pub const fn output_currency(&self) -> Currency {
        self.flipped().input_currency()
    }
}

// =============================================================================
// Converter State
// =============================================================================

/// State behind the quick-conversion widget.
///
/// ## Toggle Behaviour
/// ```text
/// input 10 ($)  ──result──►  365 (Bs)
///      │ toggle
///      ▼
/// input 365 (Bs) ──result──► 10 ($)      valid result seeds the new input
///
/// input 10 ($), rate 0  ──result──► None
///      │ toggle
///      ▼
/// input 10 (Bs)                          no result: input kept as-is
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConverterState {
    pub direction: ConversionDirection,
    pub input: f64,
}

impl ConverterState {
    pub fn new(direction: ConversionDirection, input: f64) -> Self {
        ConverterState { direction, input }
    }

    /// The converted amount at `rate`, if any.
    pub fn result(&self, rate: f64) -> Option<f64> {
        self.direction.convert(self.input, rate)
    }

    /// Switches direction, seeding the input with the prior result.
    pub fn toggle(&mut self, rate: f64) {
        if let Some(prior) = self.result(rate) {
            self.input = prior;
        }
        self.direction = self.direction.flipped();
    }

    /// Formatted result in the output currency.
    pub fn formatted_result(&self, rate: f64) -> String {
        self.direction.output_currency().format(self.result(rate))
    }
}

// =============================================================================
// Currency & Formatting
// =============================================================================

/// The two currencies the store deals in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// US dollars, `en-US` style.
    Foreign,
    /// Bolívares, `es-VE` style.
    Local,
}

impl Currency {
    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Foreign => "USD",
            Currency::Local => "VES",
        }
    }

    /// Display symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Foreign => "$",
            Currency::Local => "Bs.",
        }
    }

    const fn separators(&self) -> (char, char) {
        match self {
            Currency::Foreign => ('.', ','),
            Currency::Local => (',', '.'),
        }
    }

    /// Formats a rounded amount with two decimals.
    pub fn format_money(&self, money: Money) -> String {
        let (decimal, group) = self.separators();
        money.format_with(decimal, group)
    }

    /// Formats an amount; `None` and amounts too large to hold in cents render
    /// as the locale's zero.
    pub fn format(&self, amount: Option<f64>) -> String {
        self.format_money(amount.and_then(Money::try_from_amount).unwrap_or_default())
    }

    /// Formats with the currency symbol in front (`$ 1,234.56`, `Bs. 1.234,56`).
    pub fn format_with_symbol(&self, amount: Option<f64>) -> String {
        format!("{} {}", self.symbol(), self.format(amount))
    }
}

/// Local amount with comma decimals (`1.234,56`); `None` → `"0,00"`.
pub fn format_local(amount: Option<f64>) -> String {
    Currency::Local.format(amount)
}

/// Foreign amount with period decimals (`1,234.56`); `None` → `"0.00"`.
pub fn format_foreign(amount: Option<f64>) -> String {
    Currency::Foreign.format(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
