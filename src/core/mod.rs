//! Core module - label types, state, reducer, store, persistence and configuration

pub mod config;
pub mod entity;
pub mod identity;
pub mod persistence;
pub mod reducer;
pub mod seed;
pub mod state;
pub mod stats;
pub mod store;

pub use config::{Config, ConfigError};
pub use entity::{Labeled, ParseLabelError, Priority, Record, RiskLevel, Sector, Tone};
pub use identity::{IdStrategy, RecordId};
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, PersistenceBridge, SqliteStore, StorageBackend,
    StorageError, DEFAULT_STORAGE_KEY,
};
pub use reducer::{reduce, Action};
pub use state::{AppState, PartialState};
pub use store::{Store, SubscriptionId};
