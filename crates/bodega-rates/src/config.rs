//! # Rate Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BODEGA_PROVIDER_URL=https://...                                    │
//! │     BODEGA_STORE_BACKEND=file                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/bodega/bodega.toml (Linux)                               │
//! │     ~/Library/Application Support/com.bodega.pos/bodega.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bodega.toml
//! [provider]
//! url = "https://ve.dolarapi.com/v1/dolares/oficial"
//! rate_field = "promedio"
//! timestamp_field = "fechaActualizacion"
//! timeout_secs = 10
//!
//! [store]
//! backend = "sqlite"   # sqlite | file | memory
//! path = "/var/lib/bodega/bodega.db"
//! tenant_id = "00000000-0000-0000-0000-000000000001"
//!
//! [scanner]
//! inter_key_timeout_ms = 250
//! min_length = 3
//! terminator = "Enter"
//!
//! [display]
//! stale_after_hours = 24
//! ```

use bodega_core::validation::validate_tenant_id;
use bodega_core::{ScannerConfig, DEFAULT_TENANT_ID};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{RateError, RateResult};

/// Default provider endpoint (official average USD/VES rate).
pub const DEFAULT_PROVIDER_URL: &str = "https://ve.dolarapi.com/v1/dolares/oficial";

// =============================================================================
// Provider
// =============================================================================

/// Where and how to fetch the rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// HTTP(S) endpoint answering a GET with a JSON object.
    #[serde(default = "default_provider_url")]
    pub url: String,

    /// JSON field holding the rate. Dotted paths (`data.rate`) are followed.
    #[serde(default = "default_rate_field")]
    pub rate_field: String,

    /// JSON field holding the provider's publication time.
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_rate_field() -> String {
    "promedio".to_string()
}

fn default_timestamp_field() -> String {
    "fechaActualizacion".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings {
            url: default_provider_url(),
            rate_field: default_rate_field(),
            timestamp_field: default_timestamp_field(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Which persistent slot backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `kv_slots` table in the local SQLite database.
    #[default]
    Sqlite,
    /// A single JSON file.
    File,
    /// Process memory only (nothing survives a restart).
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::File => write!(f, "file"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "db" => Ok(StoreBackend::Sqlite),
            "file" | "json" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(RateError::InvalidConfig(format!(
                "Unknown store backend: {}",
                other
            ))),
        }
    }
}

/// Where the rate slot lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database or JSON file path. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: StoreBackend::default(),
            path: None,
            tenant_id: default_tenant_id(),
        }
    }
}

impl StoreSettings {
    /// Configured path, or the backend's default file in the data directory.
    ///
    /// `None` for the memory backend, or when no home directory exists.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        let file_name = match self.backend {
            StoreBackend::Memory => return None,
            StoreBackend::Sqlite => "bodega.db",
            StoreBackend::File => "exchange_rate.json",
        };

        self.path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "bodega", "pos")
                .map(|dirs| dirs.data_dir().join(file_name))
        })
    }
}

// =============================================================================
// Display
// =============================================================================

/// Presentation hints for rate screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// A rate older than this is flagged as stale.
    #[serde(default = "default_stale_after_hours")]
    pub stale_after_hours: u32,
}

fn default_stale_after_hours() -> u32 {
    24
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            stale_after_hours: default_stale_after_hours(),
        }
    }
}

impl DisplaySettings {
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.stale_after_hours))
    }
}

// =============================================================================
// Root Config
// =============================================================================

/// Complete configuration for the rate service and scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl RatesConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bodega.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> RateResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| RateError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> RateResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| RateError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RateError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| RateError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> RateResult<()> {
        let url = self.provider.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RateError::InvalidConfig(format!(
                "Provider URL must start with http:// or https://, got: {}",
                url
            )));
        }

        if self.provider.rate_field.trim().is_empty() {
            return Err(RateError::InvalidConfig("rate_field must not be empty".into()));
        }

        if self.provider.timeout_secs == 0 {
            return Err(RateError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        validate_tenant_id(&self.store.tenant_id)
            .map_err(|e| RateError::InvalidConfig(e.to_string()))?;

        if self.scanner.inter_key_timeout_ms == 0 {
            return Err(RateError::InvalidConfig(
                "inter_key_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.scanner.terminator.is_empty() {
            return Err(RateError::InvalidConfig("terminator must not be empty".into()));
        }

        if self.display.stale_after_hours == 0 {
            return Err(RateError::InvalidConfig(
                "stale_after_hours must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `BODEGA_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric values are ignored with a warning.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BODEGA_PROVIDER_URL") {
            debug!(url = %url, "Overriding provider URL from environment");
            self.provider.url = url;
        }

        if let Some(field) = lookup("BODEGA_RATE_FIELD") {
            self.provider.rate_field = field;
        }

        if let Some(field) = lookup("BODEGA_TIMESTAMP_FIELD") {
            self.provider.timestamp_field = field;
        }

        if let Some(secs) = lookup("BODEGA_PROVIDER_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.provider.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring BODEGA_PROVIDER_TIMEOUT_SECS"),
            }
        }

        if let Some(backend) = lookup("BODEGA_STORE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown store backend in environment"),
            }
        }

        if let Some(path) = lookup("BODEGA_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }

        if let Some(id) = lookup("BODEGA_TENANT_ID") {
            self.store.tenant_id = id;
        }

        if let Some(ms) = lookup("BODEGA_SCAN_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.scanner.inter_key_timeout_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring BODEGA_SCAN_TIMEOUT_MS"),
            }
        }

        if let Some(hours) = lookup("BODEGA_STALE_AFTER_HOURS") {
            match hours.parse::<u32>() {
                Ok(h) => self.display.stale_after_hours = h,
                Err(_) => warn!(value = %hours, "Ignoring BODEGA_STALE_AFTER_HOURS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bodega", "pos")
            .map(|dirs| dirs.config_dir().join("bodega.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RatesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.rate_field, "promedio");
        assert_eq!(config.provider.timestamp_field, "fechaActualizacion");
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.scanner.inter_key_timeout_ms, 250);
        assert_eq!(config.display.stale_after(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RatesConfig = toml::from_str(
            r#"
            [provider]
            rate_field = "data.rate"

            [store]
            backend = "file"
            path = "/tmp/rate.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.rate_field, "data.rate");
        assert_eq!(config.provider.url, DEFAULT_PROVIDER_URL);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(
            config.store.resolved_path(),
            Some(PathBuf::from("/tmp/rate.json"))
        );
        assert_eq!(config.scanner.terminator, "Enter");
    }

    #[test]
    fn test_validation() {
        let mut config = RatesConfig::default();

        config.provider.url = "ftp://example.com".into();
        assert!(config.validate().is_err());

        config.provider.url = "https://example.com/rate".into();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.provider.timeout_secs = 5;
        config.store.tenant_id = "store-1".into();
        assert!(matches!(
            config.validate(),
            Err(RateError::InvalidConfig(_))
        ));

        config.store.tenant_id = DEFAULT_TENANT_ID.into();
        config.display.stale_after_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("BODEGA_PROVIDER_URL", "http://localhost:9000/rate"),
            ("BODEGA_STORE_BACKEND", "memory"),
            ("BODEGA_SCAN_TIMEOUT_MS", "120"),
            ("BODEGA_STALE_AFTER_HOURS", "not-a-number"),
        ]);

        let mut config = RatesConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.provider.url, "http://localhost:9000/rate");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.resolved_path(), None);
        assert_eq!(config.scanner.inter_key_timeout_ms, 120);
        assert_eq!(config.display.stale_after_hours, 24);
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("json".parse::<StoreBackend>().unwrap(), StoreBackend::File);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bodega.toml");

        let mut config = RatesConfig::default();
        config.provider.rate_field = "price".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[provider]"));
        assert!(contents.contains("[scanner]"));

        let loaded: RatesConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bad_toml_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bodega.toml");
        std::fs::write(&path, "[provider\nurl = 3").unwrap();

        assert!(matches!(
            RatesConfig::load(Some(path.clone())),
            Err(RateError::ConfigLoadFailed(_))
        ));
        assert_eq!(
            RatesConfig::load_or_default(Some(path)).provider.rate_field,
            "promedio"
        );
    }
}
