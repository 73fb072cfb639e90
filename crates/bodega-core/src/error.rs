//! # Error Types
//!
//! Domain-specific error types for bodega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bodega-core errors (this file)                                        │
//! │  ├── CoreError        - Pricing/conversion domain errors               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bodega-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bodega-rates errors (separate crate)                                  │
//! │  └── RateError        - Fetch / store / config failures                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError / RateError → UI message            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, value)
//! 3. Errors are enum variants, never String
//! 4. A missing rate is not a failure of the conversion functions: they
//!    return `None`. [`CoreError::ConversionUnavailable`] is only raised by
//!    callers that *require* a rate to proceed.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The exchange rate is still the zero sentinel.
    ///
    /// ## When This Occurs
    /// - First launch before any fetch or manual entry
    /// - Slot was corrupt and read back as "absent"
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout in bolívares
    ///      │
    ///      ▼
    /// ExchangeRate::require_known() → rate == 0
    ///      │
    ///      ▼
    /// ConversionUnavailable
    ///      │
    ///      ▼
    /// UI shows "rate pending" and disables the local-currency action
    /// ```
    #[error("Exchange rate not available yet")]
    ConversionUnavailable,

    /// Sale line quantity is not acceptable for its unit.
    #[error("Invalid quantity {quantity} for {unit} sale")]
    InvalidQuantity { unit: String, quantity: f64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything is written; the previous state is never touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Value must be a whole number (e.g. per-unit quantities).
    #[error("{field} must be a whole number")]
    NotWholeNumber { field: String },

    /// Invalid format (e.g. non-numeric rate text, invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: u64, max: u64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::ConversionUnavailable.to_string(),
            "Exchange rate not available yet"
        );

        let err = CoreError::InvalidQuantity {
            unit: "unit".to_string(),
            quantity: 1.5,
        };
        assert_eq!(err.to_string(), "Invalid quantity 1.5 for unit sale");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "rate".to_string(),
        };
        assert_eq!(err.to_string(), "rate must be positive");

        let err = ValidationError::InvalidFormat {
            field: "rate".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "rate has invalid format: not a number");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NotFinite {
            field: "cost".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
