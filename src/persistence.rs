//! Persisted view state: one named blob, read once at startup and replaced
//! whole after every state change.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::aggregation::AggregateResult;
use crate::error::LoanError;
use crate::filter::FilterSelection;
use crate::record::LoanRecord;

pub const STATE_VERSION: u32 = 1;

/// Contents of the persisted blob.
///
/// Option lists are not stored; they are derived again from `records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub records: Vec<LoanRecord>,
    #[serde(default)]
    pub selection: FilterSelection,
    #[serde(default)]
    pub aggregate: AggregateResult,
}

/// Whole-blob key-value storage for [`PersistedState`].
pub trait StateStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<PersistedState>, LoanError>;
    fn save(&self, state: &PersistedState) -> Result<(), LoanError>;
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn load(&self) -> Result<Option<PersistedState>, LoanError> {
        (**self).load()
    }

    fn save(&self, state: &PersistedState) -> Result<(), LoanError> {
        (**self).save(state)
    }
}

/// Keeps the serialized blob in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an already-serialized blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.lock().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedState>, LoanError> {
        self.blob
            .lock()
            .as_deref()
            .map(|blob| serde_json::from_str::<PersistedState>(blob))
            .transpose()
            .map_err(LoanError::from)
    }

    fn save(&self, state: &PersistedState) -> Result<(), LoanError> {
        let blob = serde_json::to_string(state)?;
        *self.blob.lock() = Some(blob);
        Ok(())
    }
}

/// JSON file on disk. Saves go through a temporary file and a rename so a
/// reader never sees a half-written blob.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>, LoanError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LoanError::Storage(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )))
            }
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&self, state: &PersistedState) -> Result<(), LoanError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            LoanError::Storage(format!("cannot replace {}: {e}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> PersistedState {
        let mut selection = FilterSelection::default();
        selection.set(crate::record::Dimension::Year, "2020");
        PersistedState {
            version: STATE_VERSION,
            saved_at: Utc::now(),
            records: vec![LoanRecord {
                grade: "A".into(),
                current_balance: "10".into(),
                ..Default::default()
            }],
            selection,
            aggregate: AggregateResult::from_iter([("A", 10.0)]),
        }
    }

    #[test]
    fn memory_store_starts_empty() {
        assert!(MemoryStore::new().load().unwrap().is_none());
    }

    #[test]
    fn memory_store_replaces_whole_blob() {
        let store = MemoryStore::new();
        let first = sample_state();
        store.save(&first).unwrap();

        let mut second = first.clone();
        second.aggregate = AggregateResult::default();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
    }

    #[test]
    fn blob_uses_camel_case_layout() {
        let store = MemoryStore::new();
        store.save(&sample_state()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&store.blob().unwrap()).unwrap();
        assert_eq!(json["selection"]["year"], "2020");
        assert_eq!(json["selection"]["homeOwnership"], "all");
        assert_eq!(json["aggregate"]["A"], 10.0);
        assert!(json.get("savedAt").is_some());
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let store = MemoryStore::with_blob("{not json");
        assert!(matches!(store.load(), Err(LoanError::Json(_))));
    }
}
