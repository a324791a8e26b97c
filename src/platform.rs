//! # Platform probes
//!
//! The facade never reaches for process-wide state to find well-known
//! directories. It asks a [`Platform`] passed in at construction.
//!
//! | Implementation | Use |
//! |----------------|-----|
//! | [`HostPlatform`] | real directories, resolved with the `dirs` crate |
//! | [`StaticPlatform`] | fixed, mutable directories for embedding and tests |

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use parking_lot::RwLock;

use crate::MediaState;

/// Host environment queries used by the storage facade.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the facade is shared across threads.
pub trait Platform: Send + Sync {
    /// Standard downloads directory, created if missing.
    ///
    /// Returns `None` when the directory cannot be found or created.
    fn default_download_dir(&self) -> Option<PathBuf>;

    /// Primary shared storage directory, created if missing.
    fn user_dir(&self) -> Option<PathBuf>;

    /// Removable storage root, only if it exists and is not empty.
    fn alt_storage_dir(&self) -> Option<PathBuf>;

    /// Per-volume application directories. The first entry is the primary
    /// volume; further entries are secondary or removable volumes and may
    /// point at directories that do not exist.
    fn app_files_dirs(&self) -> Vec<PathBuf>;

    /// Mount state of the primary shared storage.
    fn media_state(&self) -> MediaState;
}

/// Returns `path` if it is a directory, creating it first when missing.
fn ensure_dir(path: PathBuf) -> Option<PathBuf> {
    if path.is_dir() {
        return Some(path);
    }
    match fs::create_dir_all(&path) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!("cannot create directory {}: {e}", path.display());
            None
        }
    }
}

/// A directory that exists and has at least one entry.
fn non_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Configuration for [`HostPlatform`].
///
/// Unset directories are resolved from the user's standard locations.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HostPlatformConfig {
    /// Application name, used for the per-user data directory.
    pub app_name: String,
    /// Downloads directory override.
    pub download_dir: Option<PathBuf>,
    /// Shared storage directory override.
    pub user_dir: Option<PathBuf>,
    /// Removable storage root to probe.
    pub alt_storage_dir: Option<PathBuf>,
    /// Application directories, primary first.
    pub app_files_dirs: Vec<PathBuf>,
}

impl HostPlatformConfig {
    /// Config for `app_name` with everything else resolved at runtime.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }
}

/// [`Platform`] backed by the running host.
#[derive(Debug, Clone)]
pub struct HostPlatform {
    config: HostPlatformConfig,
}

impl HostPlatform {
    /// Removable storage root probed when the config names none.
    pub const DEFAULT_ALT_STORAGE: &'static str = "/storage/sdcard1";

    /// Build a host platform from `config`.
    pub fn new(config: HostPlatformConfig) -> Self {
        Self { config }
    }

    fn app_dir_name(&self) -> &str {
        if self.config.app_name.is_empty() {
            env!("CARGO_PKG_NAME")
        } else {
            &self.config.app_name
        }
    }
}

impl Platform for HostPlatform {
    fn default_download_dir(&self) -> Option<PathBuf> {
        let dir = self
            .config
            .download_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))?;
        ensure_dir(dir)
    }

    fn user_dir(&self) -> Option<PathBuf> {
        let dir = self.config.user_dir.clone().or_else(dirs::home_dir)?;
        ensure_dir(dir)
    }

    fn alt_storage_dir(&self) -> Option<PathBuf> {
        let dir = self
            .config
            .alt_storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_ALT_STORAGE));
        (dir.is_dir() && non_empty_dir(&dir)).then_some(dir)
    }

    fn app_files_dirs(&self) -> Vec<PathBuf> {
        if !self.config.app_files_dirs.is_empty() {
            return self.config.app_files_dirs.clone();
        }
        dirs::data_dir()
            .map(|d| vec![d.join(self.app_dir_name())])
            .unwrap_or_default()
    }

    fn media_state(&self) -> MediaState {
        let Some(dir) = self.user_dir() else {
            return MediaState::Unavailable;
        };
        match fs::metadata(&dir) {
            Ok(meta) if meta.permissions().readonly() => MediaState::MountedReadOnly,
            Ok(_) => MediaState::Mounted,
            Err(_) => MediaState::Unavailable,
        }
    }
}

#[derive(Debug, Default, Clone)]
struct StaticDirs {
    download_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
    alt_storage_dir: Option<PathBuf>,
    app_files_dirs: Vec<PathBuf>,
    media_state: MediaState,
}

/// [`Platform`] with directories fixed by the embedder.
///
/// Values can be changed at runtime; readers observe the change on their
/// next query. No directory is created.
///
/// # Example
///
/// ```rust
/// use torrent_storage::{Platform, StaticPlatform};
///
/// let platform = StaticPlatform::new()
///     .with_download_dir("/data/Download")
///     .with_user_dir("/data");
/// assert_eq!(platform.default_download_dir().unwrap().to_str(), Some("/data/Download"));
/// ```
#[derive(Debug, Default)]
pub struct StaticPlatform {
    dirs: RwLock<StaticDirs>,
}

impl StaticPlatform {
    /// Platform with no directories and mounted media.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the downloads directory.
    pub fn with_download_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.set_download_dir(Some(dir.into()));
        self
    }

    /// Set the shared storage directory.
    pub fn with_user_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.write().user_dir = Some(dir.into());
        self
    }

    /// Set the removable storage root.
    pub fn with_alt_storage_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.write().alt_storage_dir = Some(dir.into());
        self
    }

    /// Set the application directories, primary first.
    pub fn with_app_files_dirs(self, dirs: Vec<PathBuf>) -> Self {
        self.dirs.write().app_files_dirs = dirs;
        self
    }

    /// Replace the downloads directory.
    pub fn set_download_dir(&self, dir: Option<PathBuf>) {
        self.dirs.write().download_dir = dir;
    }

    /// Replace the media state.
    pub fn set_media_state(&self, state: MediaState) {
        self.dirs.write().media_state = state;
    }
}

impl Platform for StaticPlatform {
    fn default_download_dir(&self) -> Option<PathBuf> {
        self.dirs.read().download_dir.clone()
    }

    fn user_dir(&self) -> Option<PathBuf> {
        self.dirs.read().user_dir.clone()
    }

    fn alt_storage_dir(&self) -> Option<PathBuf> {
        self.dirs.read().alt_storage_dir.clone()
    }

    fn app_files_dirs(&self) -> Vec<PathBuf> {
        self.dirs.read().app_files_dirs.clone()
    }

    fn media_state(&self) -> MediaState {
        self.dirs.read().media_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_is_object_safe() {
        fn _check(_: &dyn Platform) {}
    }

    #[test]
    fn host_platform_uses_overrides_and_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let downloads = tmp.path().join("dl");
        let platform = HostPlatform::new(HostPlatformConfig {
            app_name: "test".into(),
            download_dir: Some(downloads.clone()),
            user_dir: Some(tmp.path().to_path_buf()),
            alt_storage_dir: Some(tmp.path().join("missing")),
            app_files_dirs: vec![tmp.path().join("files")],
        });

        assert_eq!(platform.default_download_dir(), Some(downloads.clone()));
        assert!(downloads.is_dir());
        assert_eq!(platform.user_dir(), Some(tmp.path().to_path_buf()));
        assert_eq!(platform.alt_storage_dir(), None);
        assert_eq!(platform.app_files_dirs(), vec![tmp.path().join("files")]);
        assert_eq!(platform.media_state(), MediaState::Mounted);
    }

    #[test]
    fn alt_storage_requires_non_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let alt = tmp.path().join("sdcard1");
        fs::create_dir(&alt).unwrap();
        let platform = HostPlatform::new(HostPlatformConfig {
            alt_storage_dir: Some(alt.clone()),
            ..HostPlatformConfig::new("test")
        });
        assert_eq!(platform.alt_storage_dir(), None);

        fs::write(alt.join("file"), b"x").unwrap();
        assert_eq!(platform.alt_storage_dir(), Some(alt));
    }

    #[test]
    fn static_platform_reflects_updates() {
        let platform = StaticPlatform::new().with_download_dir("/a");
        assert_eq!(platform.default_download_dir(), Some(PathBuf::from("/a")));
        platform.set_download_dir(Some(PathBuf::from("/b")));
        assert_eq!(platform.default_download_dir(), Some(PathBuf::from("/b")));
        platform.set_download_dir(None);
        assert_eq!(platform.default_download_dir(), None);
    }
}
