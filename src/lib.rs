//! # torrent-storage
//!
//! Storage facade and live settings layer for a BitTorrent client.
//!
//! The rest of the client performs file operations through one API without
//! knowing whether a location is a conventional path or a handle issued by
//! a permission-scoped storage provider, and reads its configuration from a
//! typed settings store that reports every change.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use torrent_storage::{Location, StaticPlatform, StorageFacade};
//!
//! let dir = std::env::temp_dir();
//! let facade = StorageFacade::direct_only(Arc::new(StaticPlatform::new()));
//!
//! let dir = Location::from_path(&dir);
//! let name = facade.sanitize_name("Ubuntu: 24.04 <amd64>.torrent");
//! assert_eq!(name, "Ubuntu_ 24.04 _amd64_.torrent");
//! assert!(facade.exists(&dir));
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Location`] | Backend-tagged file or directory identifier |
//! | [`StorageFacade`] | File operations over both backends |
//! | [`ScopedDescriptor`] | Open handle released on every exit path |
//! | [`ScopedBackend`] | Capability surface of the scoped-storage provider |
//! | [`Platform`] | Host directory and media probes |
//! | [`SettingsStore`] | Typed settings with derived defaults |
//! | [`Subscription`] | Live feed of changed setting keys |
//! | [`StorageError`] / [`SettingsError`] | Failed file operation / unsaved setting |
//!
//! ---
//!
//! ## Locations
//!
//! A location string is classified by its scheme alone, never by I/O:
//!
//! | Scheme | Kind | Example |
//! |--------|------|---------|
//! | `file` | [`LocationKind::DirectPath`] | `file:///sdcard/Download` |
//! | `content` | [`LocationKind::ScopedHandle`] | `content://provider/tree/1#/sub/a.txt` |
//! | anything else | [`StorageError::InvalidLocation`] | `ftp://host/x` |
//!
//! ```rust
//! use torrent_storage::{classify, LocationKind, StorageError};
//!
//! assert_eq!(classify("file:///tmp/x").unwrap(), LocationKind::DirectPath);
//! assert!(matches!(classify("ftp://host/x"), Err(StorageError::InvalidLocation { .. })));
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`StorageFacade`], [`SettingsStore`] and every backend trait are
//! `Send + Sync` with `&self` methods; build them once and share them with
//! `Arc`. Descriptors are never shared: each operation opens and releases
//! its own.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` (default) | Serialization of public value types and [`JsonFilePreferences`] |

// Private modules
mod descriptor;
mod direct;
mod error;
mod ext;
mod facade;
mod location;
mod platform;
mod sanitize;
mod settings;
mod traits;
mod types;

// Public re-exports - error types
pub use error::{SettingsError, StorageError};

// Public re-exports - locations
pub use location::{
    FILE_PREFIX, FILE_SCHEME, Location, LocationKind, SCOPED_SCHEME, ScopedUri, classify,
    normalize_file_system_path,
};

// Public re-exports - core types
pub use types::{MediaState, OpenMode, ScopedStat, StorageDevice, UNKNOWN_AVAILABLE_BYTES};

// Public re-exports - storage
pub use descriptor::{RawDescriptor, ScopedDescriptor};
pub use facade::{StorageFacade, TEMP_DIR};
pub use platform::{HostPlatform, HostPlatformConfig, Platform, StaticPlatform};
pub use sanitize::{INVALID_NAME, MAX_NAME_BYTES, extension, is_valid_name, sanitize_name};

// Public re-exports - backend traits
pub use traits::{ChangeCallback, ListenerId, NoScopedStorage, PreferenceStore, ScopedBackend};

// Public re-exports - settings
pub use ext::PreferenceStoreExt;
pub use settings::{
    DefaultProvider, EncryptMode, ListenerRegistry, MemoryPreferences, PrefValue, ProxyType,
    SessionSettings, Setting, SettingType, SettingsStore, SortColumn, SortDirection, Subscription,
    Theme, keys,
};

// Conditional re-exports
#[cfg(feature = "serde")]
pub use settings::JsonFilePreferences;
