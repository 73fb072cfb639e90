//! # Rate Service
//!
//! The single source of truth for the exchange rate.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  current()         store.read() ──► rate, or the zero sentinel         │
//! │                                                                         │
//! │  refresh()         token = next()                                      │
//! │                    fetcher.fetch() ──✗──► Err(Fetch), store untouched  │
//! │                         │                                               │
//! │                         ▼                                               │
//! │                    lock(applied)                                       │
//! │                    token > applied ? write {rate, fetched, now}        │
//! │                                    : drop result, return current()     │
//! │                                                                         │
//! │  set_manual(r)     validate r ──✗──► Err(Validation), store untouched  │
//! │                    lock(applied); token = next(); write {r, manual}    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Tokens
//! Every write attempt carries a token from one increasing counter. A refresh
//! takes its token before the network call; a manual override takes its token
//! while holding the write lock, so it is always the newest. A fetch whose
//! token is older than the last applied write is discarded. The slow response
//! of an early refresh can therefore never replace a newer fetch or an
//! operator's override.

use bodega_core::validation::parse_decimal_input;
use bodega_core::{ConversionDirection, ExchangeRate};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::{RateError, RateResult};
use crate::fetcher::RateFetcher;
use crate::store::RateStore;

/// Reads, refreshes and overrides the cached exchange rate.
pub struct RateService {
    store: Arc<dyn RateStore>,
    fetcher: Arc<dyn RateFetcher>,
    next_token: AtomicU64,
    /// Token of the last write that reached the store.
    applied: Mutex<u64>,
}

impl RateService {
    pub fn new(store: Arc<dyn RateStore>, fetcher: Arc<dyn RateFetcher>) -> Self {
        RateService {
            store,
            fetcher,
            next_token: AtomicU64::new(1),
            applied: Mutex::new(0),
        }
    }

    fn issue_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::SeqCst)
    }

    /// The cached rate, without network I/O.
    ///
    /// Returns the zero sentinel if nothing usable is stored.
    pub async fn current(&self) -> ExchangeRate {
        self.store
            .read()
            .await
            .unwrap_or_else(ExchangeRate::sentinel)
    }

    /// Fetches a fresh rate and caches it.
    ///
    /// On failure the cached rate is left as it was. If a newer write landed
    /// while this fetch was in flight, the fetched value is discarded and the
    /// newer cached value is returned instead.
    pub async fn refresh(&self) -> RateResult<ExchangeRate> {
        let token = self.issue_token();

        let fetched = match self.fetcher.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(token, error = %e, "Exchange rate refresh failed");
                return Err(e);
            }
        };

        let rate = ExchangeRate::fetched(fetched.rate, Utc::now())
            .map_err(|e| RateError::Fetch(e.to_string()))?;

        let mut applied = self.applied.lock().await;
        if token < *applied {
            info!(
                token,
                applied = *applied,
                rate = rate.rate,
                "Discarding out-of-order refresh result"
            );
            drop(applied);
            return Ok(self.current().await);
        }

        self.store.write(&rate).await?;
        *applied = token;

        info!(
            rate = rate.rate,
            source = %rate.source,
            published_at = ?fetched.published_at,
            token,
            "Exchange rate refreshed"
        );

        Ok(rate)
    }

    /// Stores an operator-entered rate.
    ///
    /// Rejects non-finite and non-positive values without touching the store.
    pub async fn set_manual(&self, rate: f64) -> RateResult<ExchangeRate> {
        let rate = ExchangeRate::manual(rate, Utc::now())?;

        let mut applied = self.applied.lock().await;
        let token = self.issue_token();

        self.store.write(&rate).await?;
        *applied = token;

        info!(rate = rate.rate, source = %rate.source, token, "Manual exchange rate set");

        Ok(rate)
    }

    /// Parses operator text (`"36,52"` or `"36.52"`) and stores it.
    pub async fn parse_manual(&self, input: &str) -> RateResult<ExchangeRate> {
        let value = parse_decimal_input("rate", input)?;
        self.set_manual(value).await
    }

    /// Converts `amount` at the current rate.
    ///
    /// `None` while the rate is unknown or for non-positive amounts.
    pub async fn quote(&self, amount: f64, direction: ConversionDirection) -> Option<f64> {
        direction.convert(amount, self.current().await.rate)
    }
}

impl std::fmt::Debug for RateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateService")
            .field("store", &self.store.name())
            .field("next_token", &self.next_token.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{parse_rate_payload, FetchedRate};
    use crate::store::{MemoryRateStore, SqliteRateStore};
    use async_trait::async_trait;
    use bodega_core::{RateSource, ValidationError, DEFAULT_TENANT_ID};
    use bodega_db::{Database, DbConfig};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use tokio::sync::{mpsc, oneshot};

    /// Answers every fetch with the same canned payload.
    struct PayloadFetcher(Value);

    #[async_trait]
    impl RateFetcher for PayloadFetcher {
        async fn fetch(&self) -> RateResult<FetchedRate> {
            parse_rate_payload(&self.0, "promedio", "fechaActualizacion")
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl RateFetcher for FailingFetcher {
        async fn fetch(&self) -> RateResult<FetchedRate> {
            Err(RateError::Fetch("connection refused".into()))
        }
    }

    /// Each fetch announces itself, then waits for the test to release it.
    struct GatedFetcher {
        gates: std::sync::Mutex<VecDeque<oneshot::Receiver<f64>>>,
        started: mpsc::UnboundedSender<()>,
    }

    impl GatedFetcher {
        fn new(
            gates: Vec<oneshot::Receiver<f64>>,
        ) -> (Self, mpsc::UnboundedReceiver<()>) {
            let (started, started_rx) = mpsc::unbounded_channel();
            let fetcher = GatedFetcher {
                gates: std::sync::Mutex::new(gates.into()),
                started,
            };
            (fetcher, started_rx)
        }
    }

    #[async_trait]
    impl RateFetcher for GatedFetcher {
        async fn fetch(&self) -> RateResult<FetchedRate> {
            let gate = self
                .gates
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch");
            self.started.send(()).unwrap();
            let rate = gate.await.map_err(|_| RateError::Fetch("gate dropped".into()))?;
            Ok(FetchedRate {
                rate,
                published_at: None,
            })
        }
    }

    fn service_with(store: Arc<dyn RateStore>, fetcher: impl RateFetcher + 'static) -> RateService {
        RateService::new(store, Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_current_defaults_to_sentinel() {
        let service = service_with(Arc::new(MemoryRateStore::new()), FailingFetcher);
        let current = service.current().await;
        assert_eq!(current, ExchangeRate::sentinel());
        assert!(!current.is_known());
    }

    #[tokio::test]
    async fn test_refresh_stores_fetched_rate() {
        let store = Arc::new(MemoryRateStore::new());
        let service = service_with(
            store.clone(),
            PayloadFetcher(json!({
                "promedio": 36.52,
                "fechaActualizacion": "2024-05-01T13:00:00Z"
            })),
        );

        let rate = service.refresh().await.unwrap();
        assert_eq!(rate.rate, 36.52);
        assert_eq!(rate.source, RateSource::Fetched);
        assert_eq!(store.read().await, Some(rate.clone()));
        assert_eq!(service.current().await, rate);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cache() {
        let cached = ExchangeRate::manual(35.0, Utc::now()).unwrap();
        let service = service_with(
            Arc::new(MemoryRateStore::with_rate(cached.clone())),
            FailingFetcher,
        );

        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)));
        assert_eq!(service.current().await, cached);
    }

    #[tokio::test]
    async fn test_response_without_rate_keeps_cache() {
        let cached = ExchangeRate::fetched(35.0, Utc::now()).unwrap();
        let service = service_with(
            Arc::new(MemoryRateStore::with_rate(cached.clone())),
            PayloadFetcher(json!({ "fechaActualizacion": "2024-05-01T13:00:00Z" })),
        );

        assert!(matches!(service.refresh().await, Err(RateError::Fetch(_))));
        assert_eq!(service.current().await, cached);
    }

    #[tokio::test]
    async fn test_set_manual_rejects_bad_rates() {
        let service = service_with(Arc::new(MemoryRateStore::new()), FailingFetcher);
        let before = service.set_manual(40.0).await.unwrap();

        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = service.set_manual(bad).await.unwrap_err();
            assert!(matches!(err, RateError::Validation(_)));
            assert_eq!(service.current().await, before);
        }
    }

    #[tokio::test]
    async fn test_set_manual() {
        let service = service_with(Arc::new(MemoryRateStore::new()), FailingFetcher);
        let rate = service.set_manual(40.0).await.unwrap();
        assert_eq!(rate.rate, 40.0);
        assert_eq!(rate.source, RateSource::Manual);
        assert_eq!(service.current().await, rate);
    }

    #[tokio::test]
    async fn test_parse_manual() {
        let service = service_with(Arc::new(MemoryRateStore::new()), FailingFetcher);

        assert_eq!(service.parse_manual(" 36,52 ").await.unwrap().rate, 36.52);
        assert_eq!(service.parse_manual("37.1").await.unwrap().rate, 37.1);

        let err = service.parse_manual("abc").await.unwrap_err();
        assert!(matches!(
            err,
            RateError::Validation(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(service.current().await.rate, 37.1);
    }

    #[tokio::test]
    async fn test_quote() {
        let service = service_with(Arc::new(MemoryRateStore::new()), FailingFetcher);
        assert_eq!(
            service.quote(10.0, ConversionDirection::ForeignToLocal).await,
            None
        );

        service.set_manual(40.0).await.unwrap();
        assert_eq!(
            service.quote(10.0, ConversionDirection::ForeignToLocal).await,
            Some(400.0)
        );
        assert_eq!(
            service.quote(400.0, ConversionDirection::LocalToForeign).await,
            Some(10.0)
        );
    }

    #[tokio::test]
    async fn test_out_of_order_refresh_does_not_overwrite() {
        let (release_old, old_gate) = oneshot::channel();
        let (release_new, new_gate) = oneshot::channel();
        let (fetcher, mut started) = GatedFetcher::new(vec![old_gate, new_gate]);
        let service = Arc::new(service_with(Arc::new(MemoryRateStore::new()), fetcher));

        let s = service.clone();
        let old = tokio::spawn(async move { s.refresh().await });
        started.recv().await.unwrap();

        let s = service.clone();
        let new = tokio::spawn(async move { s.refresh().await });
        started.recv().await.unwrap();

        release_new.send(40.0).unwrap();
        assert_eq!(new.await.unwrap().unwrap().rate, 40.0);

        release_old.send(35.0).unwrap();
        let stale = old.await.unwrap().unwrap();
        assert_eq!(stale.rate, 40.0);
        assert_eq!(service.current().await.rate, 40.0);
    }

    #[tokio::test]
    async fn test_refresh_in_flight_does_not_clobber_manual() {
        let (release, gate) = oneshot::channel();
        let (fetcher, mut started) = GatedFetcher::new(vec![gate]);
        let service = Arc::new(service_with(Arc::new(MemoryRateStore::new()), fetcher));

        let s = service.clone();
        let refresh = tokio::spawn(async move { s.refresh().await });
        started.recv().await.unwrap();

        service.set_manual(50.0).await.unwrap();

        release.send(35.0).unwrap();
        let returned = refresh.await.unwrap().unwrap();
        assert_eq!(returned.rate, 50.0);
        assert_eq!(returned.source, RateSource::Manual);
        assert_eq!(service.current().await.source, RateSource::Manual);
    }

    #[tokio::test]
    async fn test_rate_survives_restart_in_sqlite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = service_with(
            Arc::new(SqliteRateStore::new(db.clone(), DEFAULT_TENANT_ID)),
            FailingFetcher,
        );
        let written = first.set_manual(38.75).await.unwrap();
        drop(first);

        let second = service_with(
            Arc::new(SqliteRateStore::new(db, DEFAULT_TENANT_ID)),
            FailingFetcher,
        );
        assert_eq!(second.current().await, written);
    }
}
