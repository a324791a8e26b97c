//! In-process preference store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::notifier::ListenerRegistry;
use crate::{ChangeCallback, ListenerId, PrefValue, PreferenceStore, SettingsError};

/// Preferences kept in a lock-guarded map; nothing survives the process.
///
/// Used as the store for tests and for embedding without durable settings.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, PrefValue>>,
    listeners: ListenerRegistry,
}

impl MemoryPreferences {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `values`. No listener is notified.
    pub fn with_values(values: impl IntoIterator<Item = (String, PrefValue)>) -> Self {
        Self {
            values: RwLock::new(values.into_iter().collect()),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Number of registered change listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Copy of every persisted entry.
    pub fn snapshot(&self) -> HashMap<String, PrefValue> {
        self.values.read().clone()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: PrefValue) -> Result<(), SettingsError> {
        let changed = {
            let mut values = self.values.write();
            let changed = values.get(key) != Some(&value);
            values.insert(key.to_owned(), value);
            changed
        };
        if changed {
            self.listeners.notify(key);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let removed = self.values.write().remove(key).is_some();
        if removed {
            self.listeners.notify(key);
        }
        Ok(())
    }

    fn on_change(&self, callback: ChangeCallback) -> ListenerId {
        self.listeners.register(callback)
    }

    fn unregister(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }
}
