//! # Rate Store
//!
//! The persistent `exchange_rate` slot behind [`RateService`](crate::RateService).
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          dyn RateStore                                  │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │ SqliteRateStore  │  │ JsonFileRateStore│  │ MemoryRateStore      │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │ kv_slots row     │  │ one JSON file,   │  │ RwLock<Option<..>>   │  │
//! │  │ (tenant, key)    │  │ replaced via     │  │ tests / kiosk mode   │  │
//! │  │                  │  │ temp + rename    │  │                      │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  read():  absent, unreadable, corrupt or ill-formed  →  None           │
//! │  write(): errors propagate (the caller decides what the user sees)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All backends store the same JSON shape:
//! `{"rate":36.5,"source":"manual","capturedAt":"2024-05-01T13:00:00Z"}`.

use async_trait::async_trait;
use bodega_core::{ExchangeRate, RATE_SLOT_KEY};
use bodega_db::Database;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{StoreBackend, StoreSettings};
use crate::error::{RateError, RateResult};

// =============================================================================
// Port
// =============================================================================

/// Persistent home of the cached exchange rate.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Reads the stored rate.
    ///
    /// Never fails: anything that isn't a well-formed rate reads as `None`.
    async fn read(&self) -> Option<ExchangeRate>;

    /// Replaces the stored rate.
    async fn write(&self, rate: &ExchangeRate) -> RateResult<()>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Decodes slot text, treating anything unusable as absent.
pub fn decode_slot(raw: &str) -> Option<ExchangeRate> {
    match serde_json::from_str::<ExchangeRate>(raw) {
        Ok(rate) if rate.is_well_formed() => Some(rate),
        Ok(rate) => {
            warn!(rate = rate.rate, "Stored exchange rate is out of range, ignoring");
            None
        }
        Err(e) => {
            warn!(error = %e, "Stored exchange rate is corrupt, ignoring");
            None
        }
    }
}

/// Opens the backend selected in configuration.
pub async fn open_store(settings: &StoreSettings) -> RateResult<Arc<dyn RateStore>> {
    let store: Arc<dyn RateStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(MemoryRateStore::new()),
        StoreBackend::File => {
            let path = settings.resolved_path().ok_or_else(|| {
                RateError::InvalidConfig("No path available for the file store".into())
            })?;
            Arc::new(JsonFileRateStore::new(path))
        }
        StoreBackend::Sqlite => {
            let path = settings.resolved_path().ok_or_else(|| {
                RateError::InvalidConfig("No path available for the database".into())
            })?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let db = Database::new(bodega_db::DbConfig::new(path)).await?;
            Arc::new(SqliteRateStore::new(db, settings.tenant_id.clone()))
        }
    };

    info!(backend = store.name(), "Rate store opened");
    Ok(store)
}

// =============================================================================
// Memory
// =============================================================================

/// In-process store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    slot: RwLock<Option<ExchangeRate>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `rate`.
    pub fn with_rate(rate: ExchangeRate) -> Self {
        MemoryRateStore {
            slot: RwLock::new(Some(rate)),
        }
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn read(&self) -> Option<ExchangeRate> {
        self.slot
            .read()
            .await
            .clone()
            .filter(ExchangeRate::is_well_formed)
    }

    async fn write(&self, rate: &ExchangeRate) -> RateResult<()> {
        *self.slot.write().await = Some(rate.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// JSON File
// =============================================================================

/// Stores the rate as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRateStore {
    path: PathBuf,
}

impl JsonFileRateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileRateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RateStore for JsonFileRateStore {
    async fn read(&self) -> Option<ExchangeRate> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => decode_slot(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "Rate file not found");
                None
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Could not read rate file");
                None
            }
        }
    }

    async fn write(&self, rate: &ExchangeRate) -> RateResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(rate)?;

        // Readers must never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = ?self.path, "Rate file written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// SQLite
// =============================================================================

/// Stores the rate in the `kv_slots` table under [`RATE_SLOT_KEY`].
#[derive(Debug, Clone)]
pub struct SqliteRateStore {
    db: Database,
    tenant_id: String,
}

impl SqliteRateStore {
    pub fn new(db: Database, tenant_id: impl Into<String>) -> Self {
        SqliteRateStore {
            db,
            tenant_id: tenant_id.into(),
        }
    }
}

#[async_trait]
impl RateStore for SqliteRateStore {
    async fn read(&self) -> Option<ExchangeRate> {
        match self.db.slots().get(&self.tenant_id, RATE_SLOT_KEY).await {
            Ok(Some(raw)) => decode_slot(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read rate slot");
                None
            }
        }
    }

    async fn write(&self, rate: &ExchangeRate) -> RateResult<()> {
        let json = serde_json::to_string(rate)?;
        self.db
            .slots()
            .put(&self.tenant_id, RATE_SLOT_KEY, &json)
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bodega_core::DEFAULT_TENANT_ID;
    use bodega_db::DbConfig;
    use chrono::{TimeZone, Utc};

    fn sample() -> ExchangeRate {
        ExchangeRate::manual(36.5, Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_decode_slot() {
        let ok = r#"{"rate":36.5,"source":"manual","capturedAt":"2024-05-01T13:00:00Z"}"#;
        assert_eq!(decode_slot(ok), Some(sample()));

        assert_eq!(decode_slot("not json"), None);
        assert_eq!(decode_slot(r#"{"rate":"36.5"}"#), None);
        assert_eq!(
            decode_slot(r#"{"rate":-3,"source":"manual","capturedAt":"2024-05-01T13:00:00Z"}"#),
            None
        );
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryRateStore::new();
        assert_eq!(store.read().await, None);

        store.write(&sample()).await.unwrap();
        assert_eq!(store.read().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRateStore::new(dir.path().join("state").join("rate.json"));

        assert_eq!(store.read().await, None);
        store.write(&sample()).await.unwrap();
        assert_eq!(store.read().await, Some(sample()));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rate.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let store = JsonFileRateStore::new(path);
        assert_eq!(store.read().await, None);
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteRateStore::new(db.clone(), DEFAULT_TENANT_ID);

        assert_eq!(store.read().await, None);
        store.write(&sample()).await.unwrap();
        assert_eq!(store.read().await, Some(sample()));

        db.slots()
            .put(DEFAULT_TENANT_ID, RATE_SLOT_KEY, "garbage")
            .await
            .unwrap();
        assert_eq!(store.read().await, None);
    }

    #[tokio::test]
    async fn test_open_memory_store() {
        let settings = StoreSettings {
            backend: StoreBackend::Memory,
            ..StoreSettings::default()
        };
        let store = open_store(&settings).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_open_sqlite_store_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StoreSettings {
            backend: StoreBackend::Sqlite,
            path: Some(dir.path().join("data").join("bodega.db")),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
        };

        let store = open_store(&settings).await.unwrap();
        store.write(&sample()).await.unwrap();
        assert_eq!(store.read().await, Some(sample()));
    }
}
