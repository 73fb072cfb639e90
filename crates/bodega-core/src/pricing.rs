//! # Pricing Module
//!
//! Derives sale prices from cost and markup. Nothing here is persisted: every
//! screen recomputes prices from the product's cost, its profit setting and
//! the current rate, so a rate change is reflected everywhere at once.
//!
//! ## The Profit Setting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One field, two spellings of the same markup                            │
//! │                                                                         │
//! │   operator types   normalized fraction   sale price for cost 100        │
//! │   ─────────────    ───────────────────   ───────────────────────        │
//! │      0.30                0.30                    130                    │
//! │      30                  0.30                    130                    │
//! │      1                   1.00  (100%)            200                    │
//! │      1.5                 0.015 (1.5%)            101.5                  │
//! │      -5 / NaN            0                       100                    │
//! │                                                                         │
//! │   Rule: value > 1 is a whole percentage, anything else a fraction.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::convert::to_local;
use crate::types::SaleUnit;
use crate::validation::{validate_cost, validate_profit_setting, ValidationResult};

// =============================================================================
// Markup
// =============================================================================

/// Turns a profit setting into a fractional markup.
///
/// Values above `1` are percentages and are divided by 100; values up to and
/// including `1` are already fractions. Negative or non-finite results clamp
/// to `0`.
pub fn normalize_profit(profit_setting: f64) -> f64 {
    let fraction = if profit_setting > 1.0 {
        profit_setting / 100.0
    } else {
        profit_setting
    };

    if fraction.is_finite() && fraction > 0.0 {
        fraction
    } else {
        0.0
    }
}

/// Computes the sale price in foreign currency.
///
/// ## Example
/// ```rust
/// use bodega_core::pricing::compute_sale_price;
///
/// assert!((compute_sale_price(100.0, 0.3) - 130.0).abs() < 1e-9);
/// assert!((compute_sale_price(100.0, 30.0) - 130.0).abs() < 1e-9);
/// assert_eq!(compute_sale_price(100.0, -5.0), 100.0);
/// assert_eq!(compute_sale_price(f64::NAN, 30.0), 0.0);
/// ```
pub fn compute_sale_price(cost_foreign: f64, profit_setting: f64) -> f64 {
    let price = cost_foreign * (1.0 + normalize_profit(profit_setting));
    if price.is_finite() {
        price
    } else {
        0.0
    }
}

/// Markup as a percentage for display (`30.0` for both `0.3` and `30`).
pub fn profit_percentage(profit_setting: f64) -> f64 {
    normalize_profit(profit_setting) * 100.0
}

/// A profit setting as the operator typed it.
///
/// Lets a screen echo back how the value was read ("1.5 → 1.5 %").
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct ProfitSetting(pub f64);

impl ProfitSetting {
    #[inline]
    pub fn normalized_fraction(&self) -> f64 {
        normalize_profit(self.0)
    }

    #[inline]
    pub fn as_percentage(&self) -> f64 {
        profit_percentage(self.0)
    }

    /// Whether the raw value was read as a whole percentage.
    pub fn is_percentage(&self) -> bool {
        self.0 > 1.0
    }
}

impl From<f64> for ProfitSetting {
    fn from(value: f64) -> Self {
        ProfitSetting(value)
    }
}

// =============================================================================
// Product Pricing
// =============================================================================

/// The pricing attributes of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPricing {
    /// Cost per unit/kg/m² in foreign currency.
    pub cost_foreign: f64,
    /// Markup as a fraction (≤ 1) or a percentage (> 1).
    pub profit_setting: f64,
    /// How the product is sold.
    #[serde(default)]
    pub sale_unit: SaleUnit,
}

/// Sale price of one unit in both currencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalePrices {
    pub foreign: f64,
    /// `None` while the rate is unknown.
    pub local: Option<f64>,
}

impl ProductPricing {
    pub fn new(cost_foreign: f64, profit_setting: f64, sale_unit: SaleUnit) -> Self {
        ProductPricing {
            cost_foreign,
            profit_setting,
            sale_unit,
        }
    }

    /// Creates pricing from operator input, rejecting a negative or
    /// non-finite cost or profit setting instead of clamping it.
    ///
    /// ## Example
    /// ```rust
    /// use bodega_core::{ProductPricing, SaleUnit};
    ///
    /// assert!(ProductPricing::try_new(4.0, 30.0, SaleUnit::Unit).is_ok());
    /// assert!(ProductPricing::try_new(-4.0, 30.0, SaleUnit::Unit).is_err());
    /// ```
    pub fn try_new(
        cost_foreign: f64,
        profit_setting: f64,
        sale_unit: SaleUnit,
    ) -> ValidationResult<Self> {
        validate_cost(cost_foreign)?;
        validate_profit_setting(profit_setting)?;
        Ok(ProductPricing::new(cost_foreign, profit_setting, sale_unit))
    }

    /// Sale price in foreign currency.
    #[inline]
    pub fn sale_price_foreign(&self) -> f64 {
        compute_sale_price(self.cost_foreign, self.profit_setting)
    }

    /// Sale price in both currencies at `rate`.
    pub fn sale_prices(&self, rate: f64) -> SalePrices {
        let foreign = self.sale_price_foreign();
        SalePrices {
            foreign,
            local: to_local(foreign, rate),
        }
    }

    /// How the stored profit setting is interpreted.
    pub fn profit(&self) -> ProfitSetting {
        ProfitSetting(self.profit_setting)
    }

    /// Profit per unit in foreign currency (sale price minus cost).
    ///
    /// Zero when the cost itself is unusable.
    pub fn margin_foreign(&self) -> f64 {
        let margin = self.sale_price_foreign() - self.cost_foreign;
        if margin.is_finite() {
            margin
        } else {
            0.0
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
