//! # Validation Module
//!
//! Input validation for rates, costs, markups and quantities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web UI                                                       │
//! │  ├── Input masks, immediate feedback                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Manual rate text → positive finite f64                            │
//! │  └── Quantities per SaleUnit, non-negative costs                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store read                                                   │
//! │  └── Corrupt or ill-formed slot → sentinel                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bodega_core::validation::{parse_decimal_input, validate_rate};
//!
//! // Operators type rates with either decimal separator
//! assert_eq!(parse_decimal_input("rate", " 36,52 ").unwrap(), 36.52);
//! assert_eq!(parse_decimal_input("rate", "36.52").unwrap(), 36.52);
//!
//! assert!(validate_rate(36.52).is_ok());
//! assert!(validate_rate(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::SaleUnit;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an exchange rate entered or fetched.
///
/// ## Rules
/// - Must be finite (no NaN, no infinity)
/// - Must be strictly positive; `0` is reserved for the "unknown" sentinel
pub fn validate_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "rate".to_string(),
        });
    }

    if rate <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "rate".to_string(),
        });
    }

    Ok(())
}

/// Validates a product cost in foreign currency.
///
/// ## Rules
/// - Must be finite
/// - Zero is allowed (free items, samples)
pub fn validate_cost(cost: f64) -> ValidationResult<()> {
    if !cost.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "cost".to_string(),
        });
    }

    if cost < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "cost".to_string(),
        });
    }

    Ok(())
}

/// Validates a profit setting as stored on a product.
///
/// The calculator itself clamps bad values to zero markup; this is for
/// rejecting them at entry time.
pub fn validate_profit_setting(profit: f64) -> ValidationResult<()> {
    if !profit.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "profit".to_string(),
        });
    }

    if profit < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "profit".to_string(),
        });
    }

    Ok(())
}

/// Validates a sale quantity for the product's unit.
///
/// ## Rules
/// - Must be finite and strictly positive
/// - [`SaleUnit::Unit`] quantities must be whole numbers
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POS: Add Item                                                          │
/// │                                                                         │
/// │  Cheese (weight) qty 0.35  ──► ok                                       │
/// │  Soda   (unit)   qty 2     ──► ok                                       │
/// │  Soda   (unit)   qty 1.5   ──► NotWholeNumber                           │
/// │  any             qty 0     ──► MustBePositive                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(unit: SaleUnit, quantity: f64) -> ValidationResult<()> {
    if !quantity.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "quantity".to_string(),
        });
    }

    if quantity <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if !unit.allows_fractional() && quantity.fract() != 0.0 {
        return Err(ValidationError::NotWholeNumber {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Text Input
// =============================================================================

/// Parses operator-typed decimal text.
///
/// Accepts either `.` or `,` as the decimal separator (one of them, once).
/// Grouping separators are not accepted: `"1.234,56"` is ambiguous input
/// from a rate field and is rejected.
///
/// ## Example
/// ```rust
/// use bodega_core::validation::parse_decimal_input;
///
/// assert_eq!(parse_decimal_input("rate", "40").unwrap(), 40.0);
/// assert!(parse_decimal_input("rate", "").is_err());
/// assert!(parse_decimal_input("rate", "abc").is_err());
/// assert!(parse_decimal_input("rate", "1.234,56").is_err());
/// ```
pub fn parse_decimal_input(field: &str, input: &str) -> ValidationResult<f64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let separators = input.chars().filter(|c| *c == '.' || *c == ',').count();
    if separators > 1 {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "use a single decimal separator".to_string(),
        });
    }

    let normalized = input.replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "not a number".to_string(),
        })?;

    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    Ok(value)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a tenant UUID string.
///
/// ## Example
/// ```rust
/// use bodega_core::validation::validate_tenant_id;
///
/// assert!(validate_tenant_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_tenant_id("not-a-uuid").is_err());
/// ```
pub fn validate_tenant_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "tenant_id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "tenant_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(36.52).is_ok());
        assert!(validate_rate(0.0001).is_ok());

        assert_eq!(
            validate_rate(0.0),
            Err(ValidationError::MustBePositive {
                field: "rate".to_string()
            })
        );
        assert!(validate_rate(-1.0).is_err());
        assert!(matches!(
            validate_rate(f64::NAN),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(validate_rate(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_cost_and_profit() {
        assert!(validate_cost(0.0).is_ok());
        assert!(validate_cost(12.5).is_ok());
        assert!(validate_cost(-0.01).is_err());
        assert!(validate_profit_setting(30.0).is_ok());
        assert!(validate_profit_setting(-5.0).is_err());
        assert!(validate_profit_setting(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(SaleUnit::Unit, 3.0).is_ok());
        assert!(validate_quantity(SaleUnit::Weight, 0.35).is_ok());
        assert!(validate_quantity(SaleUnit::Area, 2.75).is_ok());

        assert!(matches!(
            validate_quantity(SaleUnit::Unit, 1.5),
            Err(ValidationError::NotWholeNumber { .. })
        ));
        assert!(validate_quantity(SaleUnit::Weight, 0.0).is_err());
        assert!(validate_quantity(SaleUnit::Weight, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_decimal_input() {
        assert_eq!(parse_decimal_input("rate", "36,52").unwrap(), 36.52);
        assert_eq!(parse_decimal_input("rate", " 36.52\n").unwrap(), 36.52);
        assert_eq!(parse_decimal_input("rate", "-1").unwrap(), -1.0);

        assert!(matches!(
            parse_decimal_input("rate", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_decimal_input("rate", "36,5,2"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_decimal_input("rate", "inf").is_err());
        assert!(parse_decimal_input("rate", "NaN").is_err());
    }

    #[test]
    fn test_validate_tenant_id() {
        assert!(validate_tenant_id(crate::DEFAULT_TENANT_ID).is_ok());
        assert!(validate_tenant_id("").is_err());
        assert!(validate_tenant_id("123").is_err());
    }
}
