use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

use crate::error::{Result, ZondError};

/// Namespace prefix the built-in stores apply to every key.
const PREF_NAMESPACE: &str = "zond-measurement-";

/// Persisted preference store the tracker reads and writes through.
///
/// Absence of an entry is a normal first-run condition. Implementations never
/// surface errors to the tracker: a failed read is `None`, a failed write is
/// swallowed.
pub trait PrefStore: Send + Sync {
    /// Read a value, `None` when the entry has never been written.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str);
}

/// JSON-file-backed store under the host config directory.
pub struct FilePrefStore {
    path: PathBuf,
}

impl FilePrefStore {
    /// Open the default store location, creating the directory if needed.
    pub fn open() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(ZondError::NoConfigDir)?.join("zond");
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join("prefs.json"),
        })
    }

    /// Open a store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // Unreadable or unparsable files count as first run.
    fn load(&self) -> HashMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

impl PrefStore for FilePrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(&format!("{PREF_NAMESPACE}{key}")).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.load();
        entries.insert(format!("{PREF_NAMESPACE}{key}"), value.to_string());
        let raw = match serde_json::to_string_pretty(&entries) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("preference serialization failed: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            warn!("preference write to {} failed: {err}", self.path.display());
        }
    }
}

/// In-memory store for tests and embedders with their own persistence.
#[derive(Default)]
pub struct MemoryPrefStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(&format!("{PREF_NAMESPACE}{key}"))
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(format!("{PREF_NAMESPACE}{key}"), value.to_string());
    }
}
