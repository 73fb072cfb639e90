//! # bodega-core: Pure Pricing Logic for Bodega
//!
//! This crate holds the math every screen of the store shares: sale prices
//! derived from cost and markup, foreign/local currency conversion, amount
//! formatting, and the keystroke decoder that recognizes barcode scanners.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega Pricing Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web UI (catalog, POS, stats)                 │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │ current rate / refresh        │ key-down events      │
//! │  ┌──────────────▼──────────────────┐  ┌─────────▼──────────────────┐   │
//! │  │   bodega-rates                  │  │  bodega-rates::scanner     │   │
//! │  │   RateService, RateFetcher      │  │  attach / detach           │   │
//! │  └──────────────┬──────────────────┘  └─────────┬──────────────────┘   │
//! │                 │ ExchangeRate                  │ KeyEvent             │
//! │  ┌──────────────▼───────────────────────────────▼──────────────────┐   │
//! │  │               ★ bodega-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │  convert  │  │  barcode  │  │   sales   │  │   │
//! │  │   │ markup    │  │ to_local  │  │ decoder   │  │ line totals│  │   │
//! │  │   │ SalePrices│  │ formatting│  │ ScannerCfg│  │ summary   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - ExchangeRate, RateSource, SaleUnit
//! - [`money`] - Cent-rounded amounts used for display and totals
//! - [`pricing`] - Markup normalization and sale price derivation
//! - [`convert`] - Bidirectional conversion and per-locale formatting
//! - [`barcode`] - Keystroke-timing barcode decoder
//! - [`sales`] - Sale lines and summary totals in both currencies
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bodega_core::convert::{format_local, to_local};
//! use bodega_core::pricing::compute_sale_price;
//!
//! // "30" and "0.30" both mean a 30% markup
//! let sale = compute_sale_price(100.0, 30.0);
//! assert!((sale - 130.0).abs() < 1e-9);
//!
//! // Rate 0 means "not known yet": no conversion happens
//! assert_eq!(to_local(sale, 0.0), None);
//! assert_eq!(format_local(to_local(sale, 0.0)), "0,00");
//! assert_eq!(format_local(to_local(sale, 40.0)), "5.200,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod convert;
pub mod error;
pub mod money;
pub mod pricing;
pub mod sales;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use barcode::{BarcodeDecoder, BarcodeScanned, KeyEvent, ScannerConfig};
pub use convert::{ConversionDirection, ConverterState, Currency};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_sale_price, ProductPricing, ProfitSetting, SalePrices};
pub use sales::{SaleLine, SalesSummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for single-store installs.
///
/// The rate slot is keyed by tenant so a multi-tenant deployment keeps one
/// rate per store.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Name of the key-value slot holding the serialized [`ExchangeRate`].
pub const RATE_SLOT_KEY: &str = "exchange_rate";

/// Default maximum gap between scanner keystrokes, in milliseconds.
///
/// Scanners "type" a whole code in a few milliseconds per character; people
/// leave longer, irregular gaps.
pub const DEFAULT_INTER_KEY_TIMEOUT_MS: u64 = 250;

/// Default buffer length a code must exceed to count as a scan.
pub const DEFAULT_MIN_BARCODE_LENGTH: usize = 3;

/// Default key that terminates a scanned code.
pub const DEFAULT_TERMINATOR_KEY: &str = "Enter";
