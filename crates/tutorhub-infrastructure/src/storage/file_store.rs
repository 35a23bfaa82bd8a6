//! File-backed key-value store (storage.json).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tutorhub_core::Result;
use tutorhub_core::session::KeyValueStore;

use super::atomic_json::AtomicJsonFile;
use crate::paths::{ServiceType, TutorhubPaths};

type Entries = BTreeMap<String, String>;

/// A [`KeyValueStore`] persisted as a single JSON object of string values.
///
/// Responsibilities:
/// - Serialize writers inside the process (mutex) and across processes (lock file)
/// - Replace the file atomically on every write
///
/// Does NOT:
/// - Know what the keys mean (session snapshot, tokens)
/// - Cache values: every read goes to disk, so another process's writes are seen
pub struct FileKeyValueStore {
    file: AtomicJsonFile<Entries>,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Opens the store at the default location (~/.config/tutorhub/storage.json),
    /// or under `base_path` when given.
    pub fn new(base_path: Option<&std::path::Path>) -> Result<Self> {
        let path = TutorhubPaths::new(base_path)
            .get_path(ServiceType::Storage)
            .map_err(|e| tutorhub_core::TutorhubError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Opens the store at an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.file.update(Entries::new(), |entries| {
            f(entries);
            Ok(())
        })?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self.file.load()?.unwrap_or_default();
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
