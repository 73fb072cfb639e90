//! # Key-Value Slot Repository
//!
//! Small named values that must survive restarts, one row per
//! `(tenant_id, slot_key)`.
//!
//! ## Slot Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  put(tenant, "exchange_rate", "{...}")                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ... ON CONFLICT (tenant_id, slot_key) DO UPDATE                │
//! │       │         value      = excluded.value                            │
//! │       │         updated_at = excluded.updated_at                       │
//! │       ▼                                                                 │
//! │  get(tenant, "exchange_rate") → Some("{...}")                          │
//! │                                                                         │
//! │  A slot that was never written reads as None.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository over the `kv_slots` table.
#[derive(Debug, Clone)]
pub struct SlotRepository {
    pool: SqlitePool,
}

impl SlotRepository {
    /// Creates a new SlotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SlotRepository { pool }
    }

    /// Reads the raw text stored in a slot.
    pub async fn get(&self, tenant_id: &str, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value
            FROM kv_slots
            WHERE tenant_id = ?1 AND slot_key = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Writes a slot, replacing any previous value.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let json = serde_json::to_string(&rate)?;
    /// repo.put(DEFAULT_TENANT_ID, RATE_SLOT_KEY, &json).await?;
    /// ```
    pub async fn put(&self, tenant_id: &str, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(tenant_id = %tenant_id, key = %key, "Writing slot");

        sqlx::query(
            r#"
            INSERT INTO kv_slots (tenant_id, slot_key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (tenant_id, slot_key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use bodega_core::DEFAULT_TENANT_ID as TENANT;

    #[tokio::test]
    async fn test_missing_slot_reads_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.slots().get(TENANT, "exchange_rate").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slots = db.slots();

        slots.put(TENANT, "exchange_rate", "{\"rate\":36.5}").await.unwrap();

        assert_eq!(
            slots.get(TENANT, "exchange_rate").await.unwrap().as_deref(),
            Some("{\"rate\":36.5}")
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slots = db.slots();

        slots.put(TENANT, "exchange_rate", "first").await.unwrap();
        slots.put(TENANT, "exchange_rate", "second").await.unwrap();

        assert_eq!(
            slots.get(TENANT, "exchange_rate").await.unwrap().as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_slots_are_scoped_by_tenant() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slots = db.slots();
        let other = "00000000-0000-0000-0000-000000000002";

        slots.put(TENANT, "exchange_rate", "mine").await.unwrap();

        assert_eq!(slots.get(other, "exchange_rate").await.unwrap(), None);
        assert_eq!(
            slots.get(TENANT, "exchange_rate").await.unwrap().as_deref(),
            Some("mine")
        );
    }
}
