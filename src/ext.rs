//! # Extension Traits
//!
//! Typed accessors for any [`PreferenceStore`].
//!
//! ## Overview
//!
//! [`PreferenceStoreExt`] provides the `getTyped(key, default)` /
//! `setTyped(key, value)` surface on top of the untyped [`PrefValue`] map.
//! It has a blanket implementation, so every store gets it for free.
//!
//! | Method | Type |
//! |--------|------|
//! | [`get_bool`](PreferenceStoreExt::get_bool) / [`set_bool`](PreferenceStoreExt::set_bool) | `bool` |
//! | [`get_int`](PreferenceStoreExt::get_int) / [`set_int`](PreferenceStoreExt::set_int) | `i32` |
//! | [`get_long`](PreferenceStoreExt::get_long) / [`set_long`](PreferenceStoreExt::set_long) | `i64` |
//! | [`get_string`](PreferenceStoreExt::get_string) / [`set_string`](PreferenceStoreExt::set_string) | `String` |
//!
//! A stored value of a different type reads as the default.

use crate::{PrefValue, PreferenceStore, SettingsError};

/// Typed get/set helpers for any preference store.
///
/// # Example
///
/// ```rust
/// use torrent_storage::{MemoryPreferences, PreferenceStoreExt};
///
/// let prefs = MemoryPreferences::new();
/// assert_eq!(prefs.get_int("port", 6881), 6881);
/// prefs.set_int("port", 51413).unwrap();
/// assert_eq!(prefs.get_int("port", 6881), 51413);
/// ```
pub trait PreferenceStoreExt: PreferenceStore {
    /// Stored `bool` for `key`, or `default`.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(PrefValue::Bool(v)) => v,
            _ => default,
        }
    }

    /// Stored `i32` for `key`, or `default`.
    fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.get(key) {
            Some(PrefValue::Int(v)) => v,
            _ => default,
        }
    }

    /// Stored `i64` for `key`, or `default`.
    fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(PrefValue::Long(v)) => v,
            _ => default,
        }
    }

    /// Stored string for `key`, or `default`.
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(PrefValue::Str(v)) => v,
            _ => default.to_owned(),
        }
    }

    /// Persist a `bool`.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] from the underlying store
    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.set(key, PrefValue::Bool(value))
    }

    /// Persist an `i32`.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] from the underlying store
    fn set_int(&self, key: &str, value: i32) -> Result<(), SettingsError> {
        self.set(key, PrefValue::Int(value))
    }

    /// Persist an `i64`.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] from the underlying store
    fn set_long(&self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.set(key, PrefValue::Long(value))
    }

    /// Persist a string.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Persist`] from the underlying store
    fn set_string(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.set(key, PrefValue::Str(value.to_owned()))
    }
}

// Blanket implementation - any PreferenceStore gets PreferenceStoreExt for free
impl<P: PreferenceStore + ?Sized> PreferenceStoreExt for P {}
