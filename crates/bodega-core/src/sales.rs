//! # Sale Lines & Summaries
//!
//! The point-of-sale, statistics and report views all total the same lines
//! in both currencies. Each line is rounded to cents first and totals are sums
//! of rounded lines, so a printed list always adds up to its footer.
//!
//! ```text
//! SaleLine { pricing, quantity }
//!     │ line_total_foreign  = Money(sale_price × qty)
//!     │ line_total_local    = Money(to_local(line_total_foreign, rate))
//!     ▼
//! SalesSummary::from_lines(lines, rate)
//!     items, total_foreign, total_cost_foreign, profit_foreign,
//!     total_local  (None while the rate is the sentinel)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::convert::to_local;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::ProductPricing;
use crate::validation::validate_quantity;

// =============================================================================
// Sale Line
// =============================================================================

/// One product on a sale, with a quantity valid for its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub pricing: ProductPricing,
    pub quantity: f64,
}

impl SaleLine {
    /// Creates a line, rejecting quantities the sale unit does not allow.
    pub fn new(pricing: ProductPricing, quantity: f64) -> CoreResult<Self> {
        validate_quantity(pricing.sale_unit, quantity).map_err(|_| {
            CoreError::InvalidQuantity {
                unit: pricing.sale_unit.to_string(),
                quantity,
            }
        })?;
        Ok(SaleLine { pricing, quantity })
    }

    /// Line total in foreign currency.
    pub fn line_total_foreign(&self) -> Money {
        Money::from_amount(self.pricing.sale_price_foreign() * self.quantity)
    }

    /// Line cost in foreign currency.
    pub fn line_cost_foreign(&self) -> Money {
        Money::from_amount(self.pricing.cost_foreign * self.quantity)
    }

    /// Line total in local currency, from the rounded foreign total.
    pub fn line_total_local(&self, rate: f64) -> Option<Money> {
        to_local(self.line_total_foreign().amount(), rate).map(Money::from_amount)
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Totals for a set of sale lines.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Number of lines.
    pub items: usize,
    pub total_foreign: Money,
    pub total_cost_foreign: Money,
    /// `total_foreign - total_cost_foreign`.
    pub profit_foreign: Money,
    /// Sum of rounded local line totals; `None` while the rate is unknown.
    pub total_local: Option<Money>,
}

impl SalesSummary {
    pub fn from_lines(lines: &[SaleLine], rate: f64) -> Self {
        let total_foreign: Money = lines.iter().map(SaleLine::line_total_foreign).sum();
        let total_cost_foreign: Money = lines.iter().map(SaleLine::line_cost_foreign).sum();

        // Zero-valued lines have no local amount; they contribute nothing.
        let total_local = (rate.is_finite() && rate > 0.0).then(|| {
            lines
                .iter()
                .filter_map(|line| line.line_total_local(rate))
                .sum::<Money>()
        });

        SalesSummary {
            items: lines.len(),
            total_foreign,
            total_cost_foreign,
            profit_foreign: total_foreign - total_cost_foreign,
            total_local,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleUnit;

    fn soda() -> ProductPricing {
        ProductPricing::new(1.0, 30.0, SaleUnit::Unit)
    }

    fn cheese() -> ProductPricing {
        ProductPricing::new(8.0, 0.25, SaleUnit::Weight)
    }

    #[test]
    fn test_line_quantity_rules() {
        assert!(SaleLine::new(soda(), 2.0).is_ok());
        assert!(SaleLine::new(cheese(), 0.35).is_ok());
        assert!(matches!(
            SaleLine::new(soda(), 1.5),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(SaleLine::new(cheese(), 0.0).is_err());
    }

    #[test]
    fn test_line_totals() {
        let line = SaleLine::new(cheese(), 0.35).unwrap();
        // 8 × 1.25 × 0.35 = 3.50
        assert_eq!(line.line_total_foreign().cents(), 350);
        assert_eq!(line.line_cost_foreign().cents(), 280);
        assert_eq!(line.line_total_local(40.0).unwrap().cents(), 14_000);
        assert_eq!(line.line_total_local(0.0), None);
    }

    #[test]
    fn test_summary_with_rate() {
        let lines = vec![
            SaleLine::new(soda(), 3.0).unwrap(),
            SaleLine::new(cheese(), 0.35).unwrap(),
        ];
        let summary = SalesSummary::from_lines(&lines, 40.0);

        assert_eq!(summary.items, 2);
        // 3 × 1.30 + 3.50
        assert_eq!(summary.total_foreign.cents(), 740);
        assert_eq!(summary.total_cost_foreign.cents(), 580);
        assert_eq!(summary.profit_foreign.cents(), 160);
        assert_eq!(summary.total_local.unwrap().cents(), 29_600);
    }

    #[test]
    fn test_summary_without_rate() {
        let lines = vec![SaleLine::new(soda(), 1.0).unwrap()];
        let summary = SalesSummary::from_lines(&lines, 0.0);
        assert_eq!(summary.total_foreign.cents(), 130);
        assert_eq!(summary.total_local, None);
    }

    #[test]
    fn test_empty_summary() {
        let summary = SalesSummary::from_lines(&[], 36.5);
        assert_eq!(summary.items, 0);
        assert_eq!(summary.total_local, Some(Money::zero()));
    }

    #[test]
    fn test_huge_lines_do_not_overflow() {
        // Each line fits in cents; their sum does not
        let crate_of_gold = ProductPricing::new(5e16, 0.0, SaleUnit::Unit);
        let lines = vec![
            SaleLine::new(crate_of_gold, 1.0).unwrap(),
            SaleLine::new(crate_of_gold, 1.0).unwrap(),
        ];
        let summary = SalesSummary::from_lines(&lines, 40.0);
        assert_eq!(summary.total_foreign, Money::MAX);
        assert_eq!(summary.total_cost_foreign, Money::MAX);
        assert_eq!(summary.profit_foreign, Money::zero());

        // Lines too large for cents at all count as zero
        let lines = vec![
            SaleLine::new(ProductPricing::new(1e17, 0.0, SaleUnit::Unit), 1.0).unwrap(),
            SaleLine::new(ProductPricing::new(1e17, 0.0, SaleUnit::Unit), 1.0).unwrap(),
        ];
        let summary = SalesSummary::from_lines(&lines, 40.0);
        assert_eq!(summary.total_foreign, Money::zero());
        assert_eq!(summary.total_local, Some(Money::zero()));
    }
}
