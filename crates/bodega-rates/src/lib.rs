//! # bodega-rates: Exchange Rate Service for Bodega
//!
//! Owns the exchange rate every pricing screen converts with, and wires the
//! barcode decoder to keyboard input.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Inventory / Sales / Statistics / Calculator screens                  │
//! │            │ current()            │ refresh() / set_manual()           │
//! │            ▼                      ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bodega-rates (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   RateService ──► dyn RateFetcher (HttpRateFetcher, reqwest)   │   │
//! │  │        │                                                        │   │
//! │  │        └───────► dyn RateStore  (Sqlite | JsonFile | Memory)   │   │
//! │  │                                                                 │   │
//! │  │   BarcodeScanner ◄── dyn KeyboardSource (KeyboardHub)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │            │                                                            │
//! │            ▼                                                            │
//! │   bodega-core (ExchangeRate, pricing, conversion, BarcodeDecoder)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`service`] - `RateService`: current / refresh / set_manual
//! - [`fetcher`] - Provider port and HTTP implementation
//! - [`store`] - Persistent slot port and its backends
//! - [`scanner`] - Keyboard source port, hub and scanner attach/detach
//! - [`config`] - TOML + environment configuration
//! - [`error`] - `RateError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bodega_rates::{open_store, HttpRateFetcher, RateService, RatesConfig};
//!
//! let config = RatesConfig::load_or_default(None);
//! let store = open_store(&config.store).await?;
//! let fetcher = Arc::new(HttpRateFetcher::new(config.provider.clone())?);
//! let rates = RateService::new(store, fetcher);
//!
//! let rate = rates.current().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod fetcher;
pub mod scanner;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DisplaySettings, ProviderSettings, RatesConfig, StoreBackend, StoreSettings};
pub use error::{RateError, RateResult};
pub use fetcher::{FetchedRate, HttpRateFetcher, RateFetcher};
pub use scanner::{BarcodeScanner, KeyListener, KeyboardHub, KeyboardSource, ListenerId};
pub use service::RateService;
pub use store::{open_store, JsonFileRateStore, MemoryRateStore, RateStore, SqliteRateStore};
