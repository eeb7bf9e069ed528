//! Page state persistence
//!
//! The controller talks to storage only through [`StateStore`]. Two stores
//! ship with the crate: an in-memory one that records every save, and a
//! JSON file store.

use crate::state::SerializedState;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Backend reply to a save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
}

impl SaveResponse {
    /// Successful save
    pub const OK: Self = Self { success: true };
}

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Storage I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or outgoing state is not valid JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend answered `success: false`
    #[error("backend rejected the save")]
    Rejected,

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl PersistenceError {
    /// Check if error is transient
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Backend(_))
    }
}

/// Load/save collaborator
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Current persisted state
    async fn load_state(&self) -> Result<SerializedState, PersistenceError>;

    /// Persist `serialized`, the JSON text of a [`SerializedState`]
    async fn save_state(&self, serialized: &str) -> Result<SaveResponse, PersistenceError>;
}

/// In-memory store recording every save
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    initial: SerializedState,
    saves: Mutex<Vec<String>>,
    reject: bool,
}

impl MemoryStateStore {
    /// Store that loads `initial` until the first save
    #[must_use]
    pub fn new(initial: SerializedState) -> Self {
        Self {
            initial,
            saves: Mutex::new(Vec::new()),
            reject: false,
        }
    }

    /// Answer every save with `success: false`
    #[must_use]
    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    /// Every accepted save, oldest first
    #[must_use]
    pub fn saves(&self) -> Vec<String> {
        self.saves.lock().clone()
    }

    /// Number of accepted saves
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    /// Most recent accepted save
    #[must_use]
    pub fn last_save(&self) -> Option<String> {
        self.saves.lock().last().cloned()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load_state(&self) -> Result<SerializedState, PersistenceError> {
        match self.last_save() {
            Some(saved) => Ok(serde_json::from_str(&saved)?),
            None => Ok(self.initial.clone()),
        }
    }

    async fn save_state(&self, serialized: &str) -> Result<SaveResponse, PersistenceError> {
        if self.reject {
            return Ok(SaveResponse { success: false });
        }
        self.saves.lock().push(serialized.to_owned());
        Ok(SaveResponse::OK)
    }
}

/// Store keeping the state in one JSON file
///
/// A missing file loads as the default state. Saves go to a sibling
/// temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(ToOwned::to_owned).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_state(&self) -> Result<SerializedState, PersistenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state, starting empty");
                Ok(SerializedState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_state(&self, serialized: &str) -> Result<SaveResponse, PersistenceError> {
        // refuse to overwrite good state with garbage
        serde_json::from_str::<SerializedState>(serialized)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, serialized).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = serialized.len(), "state written");
        Ok(SaveResponse::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Element;

    fn sample() -> SerializedState {
        SerializedState {
            elements: im::vector![Element::new("Header")],
            ..SerializedState::default()
        }
    }

    #[tokio::test]
    async fn memory_store_loads_initial_then_latest() {
        let store = MemoryStateStore::new(sample());
        assert_eq!(store.load_state().await.unwrap(), sample());

        let empty = serde_json::to_string(&SerializedState::default()).unwrap();
        assert!(store.save_state(&empty).await.unwrap().success);
        assert_eq!(store.load_state().await.unwrap(), SerializedState::default());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn rejecting_store_records_nothing() {
        let store = MemoryStateStore::default().rejecting();
        assert!(!store.save_state("{}").await.unwrap().success);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("nested").join("state.json"));

        assert_eq!(store.load_state().await.unwrap(), SerializedState::default());

        let text = serde_json::to_string(&sample()).unwrap();
        assert!(store.save_state(&text).await.unwrap().success);
        assert_eq!(store.load_state().await.unwrap(), sample());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn file_store_refuses_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path().join("state.json"));
        let err = store.save_state("not json").await.unwrap_err();
        assert!(matches!(err, PersistenceError::Serialization(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn retryable_kinds() {
        assert!(PersistenceError::Backend(anyhow::anyhow!("503")).is_retryable());
        assert!(!PersistenceError::Rejected.is_retryable());
    }
}
