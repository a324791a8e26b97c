//! Durable preference store backed by a JSON document.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::RwLock;

use super::notifier::ListenerRegistry;
use crate::{ChangeCallback, ListenerId, PrefValue, PreferenceStore, SettingsError};

/// Preferences persisted as a pretty-printed JSON object.
///
/// Every successful `set`/`remove` rewrites the whole file: the document is
/// written to a sibling `.tmp` file which is then renamed over the original,
/// so a crash never leaves a half-written file behind. If the write fails
/// the in-memory value is rolled back and the error is returned.
///
/// ```json
/// {
///   "port_range_first": { "type": "int", "value": 40000 },
///   "theme": { "type": "int", "value": 1 }
/// }
/// ```
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<String, PrefValue>>,
    listeners: ListenerRegistry,
}

impl JsonFilePreferences {
    /// Load the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] if the file exists but cannot be read
    /// - [`SettingsError::Deserialization`] if it is not a valid document
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| SettingsError::Deserialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no preferences at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => {
                return Err(SettingsError::Persist {
                    key: path.display().to_string(),
                    source,
                });
            }
        };
        Ok(Self {
            path,
            values: RwLock::new(values),
            listeners: ListenerRegistry::new(),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, key: &str, values: &BTreeMap<String, PrefValue>) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(values)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;
        let persist_err = |source| SettingsError::Persist {
            key: key.to_owned(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist_err)?;
        }
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text).map_err(persist_err)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("leaving stale {}: {cleanup}", tmp.display());
            }
            persist_err(e)
        })
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<(), SettingsError> {
        {
            let mut values = self.values.write();
            if values.get(key) == Some(&value) {
                return Ok(());
            }
            let previous = values.insert(key.to_owned(), value);
            if let Err(e) = self.persist(key, &values) {
                match previous {
                    Some(previous) => values.insert(key.to_owned(), previous),
                    None => values.remove(key),
                };
                return Err(e);
            }
        }
        self.listeners.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        {
            let mut values = self.values.write();
            let Some(previous) = values.remove(key) else {
                return Ok(());
            };
            if let Err(e) = self.persist(key, &values) {
                values.insert(key.to_owned(), previous);
                return Err(e);
            }
        }
        self.listeners.notify(key);
        Ok(())
    }

    fn on_change(&self, callback: ChangeCallback) -> ListenerId {
        self.listeners.register(callback)
    }

    fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_store() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFilePreferences::open(tmp.path().join("prefs.json")).unwrap();
        assert_eq!(store.get("anything"), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        {
            let store = JsonFilePreferences::open(&path).unwrap();
            store.set("port", PrefValue::Int(40000)).unwrap();
            store.set("name", PrefValue::Str("x".into())).unwrap();
            store.set("gone", PrefValue::Bool(true)).unwrap();
            store.remove("gone").unwrap();
        }
        let store = JsonFilePreferences::open(&path).unwrap();
        assert_eq!(store.get("port"), Some(PrefValue::Int(40000)));
        assert_eq!(store.get("name"), Some(PrefValue::Str("x".into())));
        assert_eq!(store.get("gone"), None);
    }

    #[test]
    fn creates_parent_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/dir/prefs.json");
        let store = JsonFilePreferences::open(&path).unwrap();
        store.set("k", PrefValue::Long(1)).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn corrupt_file_is_a_deserialization_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonFilePreferences::open(&path),
            Err(SettingsError::Deserialization(_))
        ));
    }

    #[test]
    fn failed_write_rolls_back() {
        let tmp = tempfile::tempdir().unwrap();
        // The backing path is a directory, so the final rename fails.
        let path = tmp.path().join("prefs.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();
        let store = JsonFilePreferences {
            path: path.clone(),
            values: RwLock::new(BTreeMap::new()),
            listeners: ListenerRegistry::new(),
        };
        let err = store.set("k", PrefValue::Int(1)).unwrap_err();
        assert!(matches!(err, SettingsError::Persist { ref key, .. } if key == "k"));
        assert_eq!(store.get("k"), None);
    }
}
