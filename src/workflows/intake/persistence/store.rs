use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Scoped string store backing session snapshots.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid snapshot key `{0}`")]
    InvalidKey(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Process-local store; counts writes so callers can observe coalescing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        Ok(self.root.join(format!("{file_stem}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("sessions"));

        assert_eq!(store.get("fleet-intake/session").expect("get"), None);
        store.set("fleet-intake/session", "{\"a\":1}").expect("set");
        assert_eq!(
            store.get("fleet-intake/session").expect("get").as_deref(),
            Some("{\"a\":1}")
        );
        assert!(store.contains("fleet-intake/session").expect("contains"));

        store.remove("fleet-intake/session").expect("remove");
        store.remove("fleet-intake/session").expect("second remove is fine");
        assert!(!store.contains("fleet-intake/session").expect("contains"));
    }

    #[test]
    fn file_store_rejects_empty_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        match store.set("", "{}") {
            Err(StoreError::InvalidKey(_)) => {}
            other => panic!("expected invalid key, got {other:?}"),
        }
    }

    #[test]
    fn in_memory_store_counts_writes() {
        let store = InMemoryStore::new();
        store.set("k", "1").expect("set");
        store.set("k", "2").expect("set");
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get("k").expect("get").as_deref(), Some("2"));
    }
}
