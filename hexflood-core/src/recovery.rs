//! Recovery snapshots and blob storage
//!
//! A snapshot is written after every local move so an interrupted session
//! can be resumed. Storage is an opaque key/value blob store; anything that
//! fails to load is treated as absent.

use crate::error::StateError;
use crate::game::GameState;
use crate::history::MoveHistory;
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Serialized game state plus the local undo log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverySnapshot {
    pub timestamp: DateTime<Utc>,
    /// `GameState` JSON
    pub state: String,
    /// `MoveHistory` JSON
    pub history: String,
}

impl RecoverySnapshot {
    pub fn capture(state: &GameState, history: &MoveHistory) -> Result<Self, StateError> {
        let history =
            serde_json::to_string(history).map_err(|e| StateError::Serialization(e.to_string()))?;
        Ok(Self {
            timestamp: Utc::now(),
            state: state.to_json()?,
            history,
        })
    }

    /// Decode both halves
    pub fn restore(&self) -> Result<(GameState, MoveHistory), StateError> {
        let state = GameState::from_json(&self.state)?;
        let history = serde_json::from_str(&self.history)
            .map_err(|e| StateError::Deserialization(e.to_string()))?;
        Ok((state, history))
    }
}

// ============================================================================
// BLOB STORES
// ============================================================================

/// Opaque string storage keyed by name
pub trait BlobStore {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

/// In-process store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blobs: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryStore {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per blob under a directory
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Invalid store key {:?}", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileStore {
    fn put(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

// ============================================================================
// SAVE / LOAD
// ============================================================================

pub fn save_recovery(
    store: &mut dyn BlobStore,
    key: &str,
    snapshot: &RecoverySnapshot,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(snapshot)?;
    store.put(key, &raw)
}

/// Load a snapshot; unreadable or malformed data counts as no snapshot
pub fn load_recovery(store: &dyn BlobStore, key: &str) -> Option<RecoverySnapshot> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Could not read recovery snapshot {}: {:#}", key, e);
            return None;
        }
    };

    let snapshot: RecoverySnapshot = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("Discarding malformed recovery snapshot {}: {}", key, e);
            return None;
        }
    };

    // The inner state must decode too, or resuming would fail later
    if let Err(e) = snapshot.restore() {
        tracing::warn!("Discarding unusable recovery snapshot {}: {}", key, e);
        return None;
    }
    Some(snapshot)
}

pub fn clear_recovery(store: &mut dyn BlobStore, key: &str) -> anyhow::Result<()> {
    store.remove(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;
    use crate::testing::race_state;

    fn snapshot_after_one_move() -> RecoverySnapshot {
        let mut state = race_state();
        let mut history = MoveHistory::new(10, state.to_json().unwrap());
        let outcome = state.apply_move(&"alice".into(), Color(2)).unwrap();
        history.add_move(
            outcome.player,
            outcome.color,
            outcome.captured,
            state.to_json().unwrap(),
        );
        RecoverySnapshot::capture(&state, &history).unwrap()
    }

    #[test]
    fn test_capture_and_restore() {
        let snapshot = snapshot_after_one_move();
        let (state, history) = snapshot.restore().unwrap();
        assert_eq!(state.turn_number(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_snapshot(), snapshot.state);
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let snapshot = snapshot_after_one_move();
        save_recovery(&mut store, "game", &snapshot).unwrap();
        assert_eq!(load_recovery(&store, "game"), Some(snapshot));

        clear_recovery(&mut store, "game").unwrap();
        assert!(store.is_empty());
        assert_eq!(load_recovery(&store, "game"), None);
    }

    #[test]
    fn test_malformed_data_is_absent() {
        let mut store = MemoryStore::new();
        store.put("garbage", "{not json").unwrap();
        assert_eq!(load_recovery(&store, "garbage"), None);

        let mut snapshot = snapshot_after_one_move();
        snapshot.state = "{}".to_string();
        store
            .put("hollow", &serde_json::to_string(&snapshot).unwrap())
            .unwrap();
        assert_eq!(load_recovery(&store, "hollow"), None);
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("saves")).unwrap();
        assert_eq!(store.get("missing").unwrap(), None);

        let snapshot = snapshot_after_one_move();
        save_recovery(&mut store, "hot-seat", &snapshot).unwrap();
        assert!(store.dir().join("hot-seat.json").exists());

        let reopened = FileStore::open(dir.path().join("saves")).unwrap();
        assert_eq!(load_recovery(&reopened, "hot-seat"), Some(snapshot));

        store.remove("hot-seat").unwrap();
        store.remove("hot-seat").unwrap();
        assert_eq!(load_recovery(&reopened, "hot-seat"), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(store.put("../escape", "x").is_err());
        assert!(store.put("", "x").is_err());
        assert_eq!(load_recovery(&store, "a/b"), None);
    }
}
