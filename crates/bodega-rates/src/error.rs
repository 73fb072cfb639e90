//! # Rate Service Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rate Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Provider     │  │   Operator      │  │     Storage             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Fetch          │  │  Validation     │  │  Store                  │ │
//! │  │  (network, bad  │  │  (rate ≤ 0,     │  │  (sqlite, file I/O,     │ │
//! │  │   JSON, no rate)│  │   not a number) │  │   serialization)        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Configuration  │   A failed fetch or a rejected value never       │
//! │  │                 │   touches the cached rate.                       │
//! │  │  InvalidConfig  │                                                   │
//! │  │  ConfigLoad/Save│                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bodega_core::ValidationError;
use bodega_db::DbError;
use thiserror::Error;

/// Result type alias for rate operations.
pub type RateResult<T> = Result<T, RateError>;

/// Errors surfaced by the rate service and its adapters.
#[derive(Debug, Error)]
pub enum RateError {
    // =========================================================================
    // Provider Errors
    // =========================================================================
    /// The upstream call failed or returned no usable rate.
    #[error("Could not fetch exchange rate: {0}")]
    Fetch(String),

    // =========================================================================
    // Operator Errors
    // =========================================================================
    /// A rate typed by the operator was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Writing the rate slot failed.
    #[error("Rate store error: {0}")]
    Store(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for RateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RateError::Fetch("provider timed out".to_string())
        } else {
            RateError::Fetch(err.to_string())
        }
    }
}

impl From<DbError> for RateError {
    fn from(err: DbError) -> Self {
        RateError::Store(err.to_string())
    }
}

impl From<std::io::Error> for RateError {
    fn from(err: std::io::Error) -> Self {
        RateError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for RateError {
    fn from(err: serde_json::Error) -> Self {
        RateError::Store(err.to_string())
    }
}

impl From<toml::de::Error> for RateError {
    fn from(err: toml::de::Error) -> Self {
        RateError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for RateError {
    fn from(err: toml::ser::Error) -> Self {
        RateError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RateError {
    /// Machine-readable code for the UI layer.
    pub fn code(&self) -> &'static str {
        match self {
            RateError::Fetch(_) => "FETCH_ERROR",
            RateError::Validation(_) => "VALIDATION_ERROR",
            RateError::Store(_) => "STORE_ERROR",
            RateError::InvalidConfig(_)
            | RateError::ConfigLoadFailed(_)
            | RateError::ConfigSaveFailed(_) => "CONFIG_ERROR",
        }
    }

    /// Returns true if the message is meant for the operator as-is.
    ///
    /// Fetch failures and rejected input are shown on screen; storage and
    /// configuration failures are logged and replaced with a generic notice.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, RateError::Fetch(_) | RateError::Validation(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        self.code() == "CONFIG_ERROR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_transparently() {
        let err: RateError = ValidationError::MustBePositive {
            field: "rate".into(),
        }
        .into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.is_user_visible());
        assert_eq!(
            err.to_string(),
            ValidationError::MustBePositive {
                field: "rate".into()
            }
            .to_string()
        );
    }

    #[test]
    fn test_categories() {
        assert!(RateError::Fetch("offline".into()).is_user_visible());
        assert!(!RateError::Store("disk full".into()).is_user_visible());
        assert!(RateError::ConfigLoadFailed("bad toml".into()).is_config_error());
        assert!(!RateError::Fetch("offline".into()).is_config_error());
    }

    #[test]
    fn test_db_error_becomes_store_error() {
        let err: RateError = DbError::PoolExhausted.into();
        assert!(matches!(err, RateError::Store(_)));
    }
}
