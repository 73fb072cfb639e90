//! # Domain Types
//!
//! Core domain types shared by the rate service and the pricing math.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │   ExchangeRate      │   │   RateSource    │   │    SaleUnit     │   │
//! │  │  ─────────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  rate (f64, 0=none) │   │  Fetched        │   │  Unit  (und)    │   │
//! │  │  source             │   │  Manual         │   │  Weight (kg)    │   │
//! │  │  captured_at        │   └─────────────────┘   │  Area  (m²)     │   │
//! │  └─────────────────────┘                         └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Rate Sentinel
//! A rate of exactly `0` means "no rate known yet". It is a real value of the
//! type (not an `Option`) because it is persisted and shown as-is; every
//! conversion treats it as "unavailable".

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::{validate_rate, ValidationResult};

// =============================================================================
// Rate Source
// =============================================================================

/// Where the current exchange rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Pulled from the external rate provider.
    #[default]
    Fetched,
    /// Typed in by an operator.
    Manual,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Fetched => write!(f, "fetched"),
            RateSource::Manual => write!(f, "manual"),
        }
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// The single current foreign → local exchange rate.
///
/// ## Lifecycle
/// ```text
/// (nothing stored) ──► sentinel { rate: 0 }
///        │
///        ├── refresh() succeeds ──► { rate, Fetched, now }
///        └── set_manual(rate)   ──► { rate, Manual,  now }
///                                       │
///                 overwritten in place by every later write
/// ```
///
/// ## Serialization
/// ```json
/// { "rate": 36.52, "source": "fetched", "capturedAt": "2024-05-01T13:00:00Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// Local currency units per one foreign unit. `0` = unknown.
    pub rate: f64,

    /// Fetched from the provider or entered manually.
    pub source: RateSource,

    /// When this value was written.
    #[ts(as = "String")]
    pub captured_at: DateTime<Utc>,
}

impl ExchangeRate {
    /// The "not yet known" value returned when nothing usable is stored.
    pub fn sentinel() -> Self {
        ExchangeRate {
            rate: 0.0,
            source: RateSource::Fetched,
            captured_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Creates a rate obtained from the provider.
    ///
    /// Fails unless `rate` is finite and strictly positive.
    pub fn fetched(rate: f64, captured_at: DateTime<Utc>) -> ValidationResult<Self> {
        validate_rate(rate)?;
        Ok(ExchangeRate {
            rate,
            source: RateSource::Fetched,
            captured_at,
        })
    }

    /// Creates a rate entered by an operator.
    ///
    /// Fails unless `rate` is finite and strictly positive.
    pub fn manual(rate: f64, captured_at: DateTime<Utc>) -> ValidationResult<Self> {
        validate_rate(rate)?;
        Ok(ExchangeRate {
            rate,
            source: RateSource::Manual,
            captured_at,
        })
    }

    /// True when a real (positive) rate is present.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0
    }

    /// True when the value satisfies the type invariant: either the sentinel
    /// or a finite positive rate. Stores use this to reject corrupt slots.
    pub fn is_well_formed(&self) -> bool {
        self.rate == 0.0 || self.is_known()
    }

    /// Returns the rate, or [`CoreError::ConversionUnavailable`] for the
    /// sentinel.
    pub fn require_known(&self) -> CoreResult<f64> {
        if self.is_known() {
            Ok(self.rate)
        } else {
            Err(CoreError::ConversionUnavailable)
        }
    }

    /// How long ago this rate was captured.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.captured_at
    }

    /// True when the rate is unknown or older than `max_age`.
    ///
    /// Staleness is informational; conversion still uses the value.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        !self.is_known() || self.age(now) > max_age
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        ExchangeRate::sentinel()
    }
}

// =============================================================================
// Sale Unit
// =============================================================================

/// How a product is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleUnit {
    /// Per piece. Quantities are whole numbers.
    #[default]
    Unit,
    /// By weight (kilograms).
    Weight,
    /// By area (square meters).
    Area,
}

impl SaleUnit {
    /// Short suffix shown next to quantities and unit prices.
    pub const fn suffix(&self) -> &'static str {
        match self {
            SaleUnit::Unit => "und",
            SaleUnit::Weight => "kg",
            SaleUnit::Area => "m²",
        }
    }

    /// Whether quantities may have a fractional part.
    #[inline]
    pub const fn allows_fractional(&self) -> bool {
        !matches!(self, SaleUnit::Unit)
    }
}

impl fmt::Display for SaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleUnit::Unit => write!(f, "unit"),
            SaleUnit::Weight => write!(f, "weight"),
            SaleUnit::Area => write!(f, "area"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
