//! # Repository Module
//!
//! Database repository implementations for Bodega.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SqliteRateStore (bodega-rates)                                        │
//! │       │                                                                 │
//! │       │  db.slots().get(tenant, "exchange_rate")                       │
//! │       ▼                                                                 │
//! │  SlotRepository                                                        │
//! │  ├── get(&self, tenant, key)          → Option<String>                 │
//! │  └── put(&self, tenant, key, value)   upsert, last write wins          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  kv_slots table                                                        │
//! │                                                                         │
//! │  The repository stores text; it never interprets it. Decoding (and    │
//! │  treating corrupt text as "absent") belongs to the slot's owner.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod slot;
