//! # Barcode Scanner Wiring
//!
//! Connects a [`BarcodeDecoder`] to a stream of raw key presses.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  BarcodeScanner::new(source, config) ──► (scanner, rx)                 │
//! │                                                                         │
//! │  attach()   source.subscribe(listener)                                 │
//! │             listener owns a fresh BarcodeDecoder                       │
//! │                                                                         │
//! │  key press ──► KeyboardHub::dispatch ──► listener ──► decoder.on_key   │
//! │                                                          │              │
//! │                                                Some(scan)│              │
//! │                                                          ▼              │
//! │                                              tx.send(scan) ──► rx       │
//! │                                                                         │
//! │  detach()   source.unsubscribe(id)   (idempotent; also run on Drop)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bodega_core::{BarcodeDecoder, BarcodeScanned, KeyEvent, ScannerConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Callback invoked for every key press.
pub type KeyListener = Box<dyn FnMut(&KeyEvent) + Send>;

/// Handle returned by [`KeyboardSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Anything that can deliver key presses to registered listeners.
pub trait KeyboardSource: Send + Sync {
    fn subscribe(&self, listener: KeyListener) -> ListenerId;

    /// Returns false if `id` was not registered.
    fn unsubscribe(&self, id: ListenerId) -> bool;
}

// =============================================================================
// In-process hub
// =============================================================================

/// Fans key events out to every subscribed listener.
///
/// Listeners run on the dispatching thread while the hub is locked and must
/// not subscribe or unsubscribe from inside the callback.
#[derive(Default)]
pub struct KeyboardHub {
    listeners: Mutex<Vec<(ListenerId, KeyListener)>>,
    next_id: AtomicU64,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(ListenerId, KeyListener)>> {
        // A panicking listener must not take the keyboard down with it
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Delivers one key press to every listener.
    pub fn dispatch(&self, event: &KeyEvent) {
        trace!(key = %event.key, ts = event.timestamp_ms, "Key event");
        for (_, listener) in self.listeners().iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }
}

impl KeyboardSource for KeyboardHub {
    fn subscribe(&self, listener: KeyListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl std::fmt::Debug for KeyboardHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// =============================================================================
// Scanner
// =============================================================================

/// Turns a keyboard source into a stream of [`BarcodeScanned`] events.
pub struct BarcodeScanner {
    source: Arc<dyn KeyboardSource>,
    config: ScannerConfig,
    tx: mpsc::UnboundedSender<BarcodeScanned>,
    listener: Option<ListenerId>,
}

impl BarcodeScanner {
    /// Creates a detached scanner and the receiver its scans arrive on.
    pub fn new(
        source: Arc<dyn KeyboardSource>,
        config: ScannerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<BarcodeScanned>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scanner = BarcodeScanner {
            source,
            config,
            tx,
            listener: None,
        };
        (scanner, rx)
    }

    /// Starts listening with a fresh decoder.
    ///
    /// Attaching an already attached scanner replaces the old registration.
    pub fn attach(&mut self) {
        self.detach();

        let mut decoder = BarcodeDecoder::new(self.config.clone());
        let tx = self.tx.clone();

        let id = self.source.subscribe(Box::new(move |event: &KeyEvent| {
            if let Some(scan) = decoder.on_key(event) {
                debug!(code = %scan.code, "Barcode scanned");
                // Receiver gone means nobody is listening any more
                let _ = tx.send(scan);
            }
        }));

        debug!(?id, "Barcode scanner attached");
        self.listener = Some(id);
    }

    /// Stops listening. Safe to call when not attached.
    pub fn detach(&mut self) {
        if let Some(id) = self.listener.take() {
            self.source.unsubscribe(id);
            debug!(?id, "Barcode scanner detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }
}

impl Drop for BarcodeScanner {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for BarcodeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeScanner")
            .field("config", &self.config)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Types `text` 10 ms per key starting at `start_ms`, then Enter.
    fn type_code(hub: &KeyboardHub, text: &str, start_ms: u64) -> u64 {
        let mut ts = start_ms;
        for c in text.chars() {
            hub.dispatch(&KeyEvent::new(c.to_string(), ts));
            ts += 10;
        }
        hub.dispatch(&KeyEvent::new("Enter", ts));
        ts
    }

    fn setup() -> (Arc<KeyboardHub>, BarcodeScanner, mpsc::UnboundedReceiver<BarcodeScanned>) {
        let hub = Arc::new(KeyboardHub::new());
        let (scanner, rx) = BarcodeScanner::new(hub.clone(), ScannerConfig::default());
        (hub, scanner, rx)
    }

    #[test]
    fn test_attached_scanner_emits() {
        let (hub, mut scanner, mut rx) = setup();
        scanner.attach();
        assert!(scanner.is_attached());

        type_code(&hub, "12345", 1_000);

        assert_eq!(rx.try_recv().unwrap().code, "12345");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_detached_scanner_is_silent() {
        let (hub, mut scanner, mut rx) = setup();

        type_code(&hub, "12345", 1_000);
        assert!(rx.try_recv().is_err());

        scanner.attach();
        scanner.detach();
        scanner.detach();
        assert!(!scanner.is_attached());
        assert_eq!(hub.listener_count(), 0);

        type_code(&hub, "12345", 2_000);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_double_attach_has_one_listener() {
        let (hub, mut scanner, mut rx) = setup();
        scanner.attach();
        scanner.attach();
        assert_eq!(hub.listener_count(), 1);

        type_code(&hub, "7591", 1_000);
        assert_eq!(rx.try_recv().unwrap().code, "7591");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reattach_starts_with_empty_buffer() {
        let (hub, mut scanner, mut rx) = setup();
        scanner.attach();
        hub.dispatch(&KeyEvent::new("1", 1_000));
        hub.dispatch(&KeyEvent::new("2", 1_010));

        scanner.detach();
        scanner.attach();

        type_code(&hub, "3456", 1_020);
        assert_eq!(rx.try_recv().unwrap().code, "3456");
    }

    #[test]
    fn test_drop_detaches() {
        let (hub, mut scanner, _rx) = setup();
        scanner.attach();
        assert_eq!(hub.listener_count(), 1);

        drop(scanner);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn test_slow_typing_is_not_a_scan() {
        let (hub, mut scanner, mut rx) = setup();
        scanner.attach();

        for (key, ts) in [("1", 0), ("2", 10), ("3", 20), ("4", 320), ("5", 330), ("Enter", 340)] {
            hub.dispatch(&KeyEvent::new(key, ts));
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_unknown_id() {
        let hub = KeyboardHub::new();
        let id = hub.subscribe(Box::new(|_: &KeyEvent| {}));
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_scans_arrive_on_async_receiver() {
        let (hub, mut scanner, mut rx) = setup();
        scanner.attach();

        let typing = {
            let hub = hub.clone();
            tokio::task::spawn_blocking(move || {
                type_code(&hub, "0012345", 5_000);
            })
        };

        let scan = rx.recv().await.unwrap();
        assert_eq!(scan.code, "0012345");
        typing.await.unwrap();
    }
}
