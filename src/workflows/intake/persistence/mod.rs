//! Debounced mirroring of the intake record into a scoped key-value store.

mod debounce;
mod store;

pub use debounce::{
    PersistenceAdapter, DEFAULT_QUIET_PERIOD, SNAPSHOT_VERSION, STORAGE_KEY,
};
pub use store::{FileStore, InMemoryStore, SnapshotStore, StoreError};
