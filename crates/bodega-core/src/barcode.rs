//! # Barcode Keystroke Decoder
//!
//! USB barcode scanners present themselves as keyboards: a scan arrives as a
//! burst of key-down events followed by `Enter`. This module tells such a
//! burst apart from a person typing by looking only at the gaps between keys.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 single state: ACCUMULATING                              │
//! │                                                                         │
//! │  key event ──► gap > inter_key_timeout? ──yes──► buffer.clear()         │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │            ┌────────┴─────────┬──────────────────────┐                  │
//! │            │ printable char,  │ terminator ("Enter") │ anything else    │
//! │            │ no ctrl/alt/meta │                      │ (Shift, arrows)  │
//! │            ▼                  ▼                      ▼                  │
//! │       buffer.push(c)   len > min_length?          ignored               │
//! │                          yes: emit trimmed code                         │
//! │                          both: buffer.clear()                           │
//! │                                                                         │
//! │  last_event_ms = event.timestamp_ms   (on EVERY event)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Heuristic, Not Proof
//! A fast typist can trip a false scan and a slow scanner (gaps above the
//! timeout) will never register. Both thresholds are [`ScannerConfig`]
//! values so a store can tune them to its hardware.
//!
//! ## Example
//! ```rust
//! use bodega_core::barcode::{BarcodeDecoder, KeyEvent, ScannerConfig};
//!
//! let mut decoder = BarcodeDecoder::new(ScannerConfig::default());
//! let mut scanned = None;
//! for (i, key) in ["7", "5", "9", "1", "Enter"].iter().enumerate() {
//!     scanned = decoder.on_key(&KeyEvent::new(*key, 1_000 + i as u64 * 8));
//! }
//! assert_eq!(scanned.unwrap().code, "7591");
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DEFAULT_INTER_KEY_TIMEOUT_MS, DEFAULT_MIN_BARCODE_LENGTH, DEFAULT_TERMINATOR_KEY};

// =============================================================================
// Configuration
// =============================================================================

/// Tunable thresholds for scan detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Maximum gap between keys of one scan (milliseconds).
    #[serde(default = "default_inter_key_timeout")]
    pub inter_key_timeout_ms: u64,

    /// A code must be LONGER than this to be emitted.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Key name that ends a scan.
    #[serde(default = "default_terminator")]
    pub terminator: String,
}

fn default_inter_key_timeout() -> u64 {
    DEFAULT_INTER_KEY_TIMEOUT_MS
}

fn default_min_length() -> usize {
    DEFAULT_MIN_BARCODE_LENGTH
}

fn default_terminator() -> String {
    DEFAULT_TERMINATOR_KEY.to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            inter_key_timeout_ms: default_inter_key_timeout(),
            min_length: default_min_length(),
            terminator: default_terminator(),
        }
    }
}

// =============================================================================
// Events
// =============================================================================

/// A raw key-down event as delivered by the UI.
///
/// `key` follows the DOM `KeyboardEvent.key` naming: a single character for
/// printable keys, a name such as `"Enter"` or `"Shift"` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
    /// Monotonic event time in milliseconds.
    pub timestamp_ms: u64,
}

impl KeyEvent {
    /// An unmodified key press.
    pub fn new(key: impl Into<String>, timestamp_ms: u64) -> Self {
        KeyEvent {
            key: key.into(),
            timestamp_ms,
            ..Default::default()
        }
    }

    /// The same press with Ctrl held.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// The same press with Alt held.
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// The same press with Meta (Cmd/Win) held.
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[inline]
    fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// The character this key types, if it is a single printable one.
    fn printable_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Emitted once per recognized scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeScanned {
    /// The scanned code, whitespace-trimmed.
    pub code: String,
    /// Timestamp of the terminator key.
    pub timestamp_ms: u64,
}

// =============================================================================
// Decoder
// =============================================================================

/// Keystroke-stream segmenter.
///
/// One instance per listener registration; instances never share state.
#[derive(Debug, Clone)]
pub struct BarcodeDecoder {
    config: ScannerConfig,
    buffer: String,
    last_event_ms: Option<u64>,
}

impl BarcodeDecoder {
    pub fn new(config: ScannerConfig) -> Self {
        BarcodeDecoder {
            config,
            buffer: String::new(),
            last_event_ms: None,
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Characters accumulated so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Feeds one key-down event; returns a scan when this event completes one.
    pub fn on_key(&mut self, event: &KeyEvent) -> Option<BarcodeScanned> {
        if let Some(last) = self.last_event_ms {
            let elapsed = event.timestamp_ms.saturating_sub(last);
            if elapsed > self.config.inter_key_timeout_ms {
                self.buffer.clear();
            }
        }
        self.last_event_ms = Some(event.timestamp_ms);

        if event.key == self.config.terminator {
            let scanned = (self.buffer.chars().count() > self.config.min_length).then(|| {
                BarcodeScanned {
                    code: self.buffer.trim().to_string(),
                    timestamp_ms: event.timestamp_ms,
                }
            });
            self.buffer.clear();
            return scanned;
        }

        if !event.has_command_modifier() {
            if let Some(c) = event.printable_char() {
                self.buffer.push(c);
            }
        }

        None
    }

    /// Drops any partial code and timing history.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_event_ms = None;
    }
}

impl Default for BarcodeDecoder {
    fn default() -> Self {
        BarcodeDecoder::new(ScannerConfig::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
