use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::store::SnapshotStore;
use crate::workflows::intake::domain::IntakeData;

/// Logical key the session snapshot lives under.
pub const STORAGE_KEY: &str = "fleet-intake/session";
pub const SNAPSHOT_VERSION: u32 = 1;
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    data: &'a IntakeData,
}

#[derive(Deserialize)]
struct SnapshotIn {
    data: IntakeData,
}

#[derive(Default)]
struct DebounceState {
    pending: Option<IntakeData>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

/// Serializes store writes outside the debounce lock. Holds the generation of
/// the newest value written or cleared; older writes are skipped.
#[derive(Default)]
struct WriteGate {
    written: Mutex<u64>,
}

impl WriteGate {
    fn write(&self, store: &dyn SnapshotStore, key: &str, generation: u64, data: &IntakeData) {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if generation < *written {
            debug!(key, generation, "skipping superseded snapshot write");
            return;
        }
        *written = generation;
        write_snapshot(store, key, data);
    }

    fn clear(&self, store: &dyn SnapshotStore, key: &str, generation: u64) {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        *written = (*written).max(generation);
        if let Err(error) = store.remove(key) {
            warn!(%error, key, "failed to clear stored snapshot");
        }
    }
}

/// Debounced writer for the session snapshot.
///
/// `save` replaces any pending value and restarts the quiet period; the timer
/// only writes if no newer `save` happened since it was armed. Pending values
/// are flushed on drop.
pub struct PersistenceAdapter<S: SnapshotStore> {
    store: Arc<S>,
    key: String,
    quiet_period: Duration,
    state: Arc<Mutex<DebounceState>>,
    writes: Arc<WriteGate>,
}

impl<S> PersistenceAdapter<S>
where
    S: SnapshotStore + 'static,
{
    pub fn new(store: Arc<S>, quiet_period: Duration) -> Self {
        Self::with_key(store, STORAGE_KEY, quiet_period)
    }

    pub fn with_key(store: Arc<S>, key: impl Into<String>, quiet_period: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            quiet_period,
            state: Arc::new(Mutex::new(DebounceState::default())),
            writes: Arc::new(WriteGate::default()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Reads the stored snapshot. Missing, unreadable, or foreign-version data
    /// yields `None`.
    pub fn load(&self) -> Option<IntakeData> {
        self.flush();

        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, key = %self.key, "snapshot store unavailable; starting fresh");
                return None;
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, key = %self.key, "discarding unreadable snapshot");
                return None;
            }
        };

        let version = value.get("version").and_then(Value::as_u64);
        if version != Some(u64::from(SNAPSHOT_VERSION)) {
            warn!(?version, expected = SNAPSHOT_VERSION, "discarding snapshot with unknown schema version");
            return None;
        }

        match serde_json::from_value::<SnapshotIn>(value) {
            Ok(snapshot) => Some(snapshot.data),
            Err(error) => {
                warn!(%error, key = %self.key, "discarding snapshot that does not match the intake schema");
                None
            }
        }
    }

    pub fn exists(&self) -> bool {
        if self.lock_state().pending.is_some() {
            return true;
        }
        match self.store.contains(&self.key) {
            Ok(present) => present,
            Err(error) => {
                warn!(%error, key = %self.key, "snapshot store unavailable");
                false
            }
        }
    }

    /// Schedules a write of `data` once the quiet period passes without another save.
    ///
    /// Outside a tokio runtime the write happens immediately. Store I/O never
    /// runs while the debounce lock is held.
    pub fn save(&self, data: &IntakeData) {
        let mut state = self.lock_state();
        state.generation += 1;
        let generation = state.generation;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                state.pending = None;
                drop(state);
                self.writes.write(self.store.as_ref(), &self.key, generation, data);
                return;
            }
        };

        state.pending = Some(data.clone());
        let shared = Arc::clone(&self.state);
        let writes = Arc::clone(&self.writes);
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let quiet_period = self.quiet_period;
        state.timer = Some(handle.spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let pending = {
                let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                if state.generation != generation {
                    return;
                }
                state.timer = None;
                state.pending.take()
            };
            if let Some(pending) = pending {
                debug!(key = %key, "quiet period elapsed; writing snapshot");
                writes.write(store.as_ref(), &key, generation, &pending);
            }
        }));
    }

    /// Writes any pending value now and cancels the timer.
    pub fn flush(&self) {
        let (generation, pending) = {
            let mut state = self.lock_state();
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            (state.generation, state.pending.take())
        };
        if let Some(pending) = pending {
            debug!(key = %self.key, "flushing pending snapshot");
            self.writes.write(self.store.as_ref(), &self.key, generation, &pending);
        }
    }

    /// Drops any pending value and removes the stored snapshot.
    pub fn clear(&self) {
        let generation = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.pending = None;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation
        };
        self.writes.clear(self.store.as_ref(), &self.key, generation);
    }

    pub fn has_pending(&self) -> bool {
        self.lock_state().pending.is_some()
    }

    fn lock_state(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: SnapshotStore> Drop for PersistenceAdapter<S> {
    fn drop(&mut self) {
        let (generation, pending) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            (state.generation, state.pending.take())
        };
        if let Some(pending) = pending {
            self.writes.write(self.store.as_ref(), &self.key, generation, &pending);
        }
    }
}

fn write_snapshot(store: &dyn SnapshotStore, key: &str, data: &IntakeData) {
    let snapshot = SnapshotOut {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        data,
    };
    let serialized = match serde_json::to_string(&snapshot) {
        Ok(serialized) => serialized,
        Err(error) => {
            warn!(%error, "failed to serialize intake snapshot");
            return;
        }
    };
    if let Err(error) = store.set(key, &serialized) {
        warn!(%error, key, "failed to persist intake snapshot");
    }
}
