//! # Rate Fetcher
//!
//! Pulls the current rate from the upstream HTTP provider.
//!
//! ## Provider Payload
//! ```text
//! GET https://ve.dolarapi.com/v1/dolares/oficial
//!
//! {
//!   "fuente": "oficial",
//!   "promedio": 36.52,                          ← rate_field
//!   "fechaActualizacion": "2024-05-01T13:00:00Z" ← timestamp_field
//! }
//! ```
//!
//! Field names come from configuration. The rate may be a JSON number or a
//! numeric string, and either field may be a dotted path (`data.rate`).
//!
//! ## Failure Modes
//! Transport error, timeout, non-2xx status, unparseable body, missing rate,
//! non-numeric rate, rate ≤ 0: all are [`RateError::Fetch`].

use async_trait::async_trait;
use bodega_core::validation::validate_rate;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::error::{RateError, RateResult};

/// A rate as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRate {
    pub rate: f64,
    /// The provider's own publication time, when it sent a parseable one.
    pub published_at: Option<DateTime<Utc>>,
}

/// Source of fresh rates.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self) -> RateResult<FetchedRate>;
}

// =============================================================================
// Payload Parsing
// =============================================================================

/// Extracts the rate (and publication time) from a provider payload.
pub fn parse_rate_payload(
    payload: &Value,
    rate_field: &str,
    timestamp_field: &str,
) -> RateResult<FetchedRate> {
    let raw = lookup(payload, rate_field)
        .ok_or_else(|| RateError::Fetch(format!("response has no '{}' field", rate_field)))?;

    let rate = coerce_number(raw).ok_or_else(|| {
        RateError::Fetch(format!("'{}' is not a number: {}", rate_field, raw))
    })?;

    validate_rate(rate).map_err(|e| RateError::Fetch(e.to_string()))?;

    let published_at = match lookup(payload, timestamp_field) {
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(s.trim()) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                debug!(value = %s, error = %e, "Ignoring unparseable provider timestamp");
                None
            }
        },
        _ => None,
    };

    Ok(FetchedRate { rate, published_at })
}

/// Follows a dotted path through nested objects.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
        .filter(|v| !v.is_null())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

// =============================================================================
// HTTP Fetcher
// =============================================================================

/// Fetches the rate with a single JSON GET.
#[derive(Debug, Clone)]
pub struct HttpRateFetcher {
    client: Client,
    settings: ProviderSettings,
}

impl HttpRateFetcher {
    pub fn new(settings: ProviderSettings) -> RateResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(HttpRateFetcher { client, settings })
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch(&self) -> RateResult<FetchedRate> {
        debug!(url = %self.settings.url, "Requesting exchange rate");

        let response = self
            .client
            .get(&self.settings.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Rate provider returned an error status");
            return Err(RateError::Fetch(format!(
                "provider responded {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await?;

        parse_rate_payload(
            &payload,
            &self.settings.rate_field,
            &self.settings.timestamp_field,
        )
    }
}
