//! Core value types shared by the storage backends and the facade.

use std::time::SystemTime;

use crate::Location;

/// Sentinel returned by [`StorageFacade::available_bytes`](crate::StorageFacade::available_bytes)
/// when free space cannot be determined.
pub const UNKNOWN_AVAILABLE_BYTES: i64 = -1;

/// Mode a descriptor is opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenMode {
    /// Read-only access (`"r"`).
    Read,
    /// Read and write access, keeping existing content (`"rw"`).
    ReadWrite,
    /// Read and write access, truncating existing content (`"rwt"`).
    ReadWriteTruncate,
}

impl OpenMode {
    /// Mode string understood by scoped-storage providers.
    pub const fn as_str(self) -> &'static str {
        match self {
            OpenMode::Read => "r",
            OpenMode::ReadWrite => "rw",
            OpenMode::ReadWriteTruncate => "rwt",
        }
    }

    /// Returns `true` if writes are allowed.
    #[inline]
    pub const fn writable(self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

/// Result of `stat` on a scoped-storage handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopedStat {
    /// Display name reported by the provider.
    pub name: Option<String>,
    /// Last modification time, if the provider reports one.
    pub last_modified: Option<SystemTime>,
    /// Whether the handle names a directory.
    pub is_dir: bool,
}

/// A storage volume the application can place files on.
///
/// Recomputed on every query; removable media can appear or disappear.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageDevice {
    /// Root directory of the device.
    pub root: Location,
    /// Human-readable name.
    pub name: String,
    /// Whether the device is currently usable.
    pub available: bool,
}

/// Mount state of the primary shared storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaState {
    /// Mounted with read and write access.
    #[default]
    Mounted,
    /// Mounted read-only.
    MountedReadOnly,
    /// Not mounted, removed or otherwise unusable.
    Unavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_mode_strings() {
        assert_eq!(OpenMode::Read.as_str(), "r");
        assert_eq!(OpenMode::ReadWrite.as_str(), "rw");
        assert_eq!(OpenMode::ReadWriteTruncate.as_str(), "rwt");
    }

    #[test]
    fn open_mode_writable() {
        assert!(!OpenMode::Read.writable());
        assert!(OpenMode::ReadWrite.writable());
        assert!(OpenMode::ReadWriteTruncate.writable());
    }

    #[test]
    fn media_state_defaults_to_mounted() {
        assert_eq!(MediaState::default(), MediaState::Mounted);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenMode>();
        assert_send_sync::<ScopedStat>();
        assert_send_sync::<StorageDevice>();
        assert_send_sync::<MediaState>();
    }
}
