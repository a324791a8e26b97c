//! Persisted key-value preference store.

use std::sync::Arc;

use crate::{PrefValue, SettingsError};

/// Callback invoked with the key whose persisted value changed.
///
/// May be called from whichever thread performed the write.
pub type ChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`PreferenceStore::on_change`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Durable key-value store behind the settings.
///
/// Per-key operations are atomic: a `get` racing a `set` on the same key
/// sees either the old or the new value, never a torn one. Nothing is
/// atomic across keys.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; methods take `&self`.
///
/// # Object Safety
///
/// This trait is object-safe. Typed helpers live on
/// [`PreferenceStoreExt`](crate::PreferenceStoreExt).
pub trait PreferenceStore: Send + Sync {
    /// Persisted value for `key`, or `None` if never written.
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Persist `value` under `key`. Visible to every later `get` in the
    /// process once this returns. Listeners are told when the stored value
    /// actually changes.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] if durable storage rejects the write
    fn set(&self, key: &str, value: PrefValue) -> Result<(), SettingsError>;

    /// Forget `key`, so reads fall back to the default again.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] if durable storage rejects the write
    fn remove(&self, key: &str) -> Result<(), SettingsError>;

    /// Register a change listener.
    fn on_change(&self, callback: ChangeCallback) -> ListenerId;

    /// Remove a change listener. Returns `false` if `id` was not registered.
    ///
    /// Once this returns, the store starts no new call into the listener.
    fn unregister(&self, id: ListenerId) -> bool;

    /// Returns `true` if `key` has a persisted value.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_store_is_object_safe() {
        fn _check(_: &dyn PreferenceStore) {}
    }

    #[test]
    fn listener_id_equality() {
        assert_eq!(ListenerId(3), ListenerId(3));
        assert_ne!(ListenerId(3), ListenerId(4));
    }
}
