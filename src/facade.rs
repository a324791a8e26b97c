//! # Storage Facade
//!
//! One file-operation API over both backends.
//!
//! ## Dispatch
//!
//! Every public operation matches on the [`Location`] once and calls the
//! matching backend:
//!
//! ```text
//! StorageFacade::op(location)
//!     ├── Location::Direct(path)  ──▶ std::fs
//!     └── Location::Scoped(uri)   ──▶ dyn ScopedBackend
//! ```
//!
//! Scoped handles with a relative sub-path are materialized first by walking
//! the sub-path with [`ScopedBackend::resolve`].
//!
//! ## Error policy
//!
//! | Operations | On failure |
//! |------------|------------|
//! | `exists`, `exists_in`, `is_valid_name` | return `false`, never error |
//! | `last_modified` | `None` |
//! | `available_bytes` | [`UNKNOWN_AVAILABLE_BYTES`] |
//! | `create_file`, `copy`, `write_*`, `clean_temp_dir` | `Err(StorageError)` |

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, warn};

use crate::descriptor::ScopedDescriptor;
use crate::{
    Location, MediaState, NoScopedStorage, OpenMode, Platform, ScopedBackend, ScopedUri,
    StorageDevice, StorageError, UNKNOWN_AVAILABLE_BYTES, direct, sanitize,
};

/// Directory below the primary app files dir that holds temp files.
pub const TEMP_DIR: &str = "temp";

/// File operations over direct paths and scoped-storage handles.
///
/// Built once with its collaborators and shared (`Arc<StorageFacade>`);
/// every method takes `&self` and holds no state between calls.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use torrent_storage::{Location, StaticPlatform, StorageFacade};
///
/// let tmp = std::env::temp_dir();
/// let facade = StorageFacade::direct_only(Arc::new(StaticPlatform::new()));
/// assert!(facade.exists(&Location::from_path(&tmp)));
/// ```
pub struct StorageFacade {
    platform: Arc<dyn Platform>,
    scoped: Arc<dyn ScopedBackend>,
}

impl StorageFacade {
    /// Facade over the host filesystem and the given scoped backend.
    pub fn new(platform: Arc<dyn Platform>, scoped: Arc<dyn ScopedBackend>) -> Self {
        Self { platform, scoped }
    }

    /// Facade without scoped storage; scoped locations are rejected.
    pub fn direct_only(platform: Arc<dyn Platform>) -> Self {
        Self::new(platform, Arc::new(NoScopedStorage))
    }

    /// The platform probes this facade was built with.
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns `true` if `location` names an existing resource.
    pub fn exists(&self, location: &Location) -> bool {
        match location {
            Location::Direct(path) => direct::exists(path),
            Location::Scoped(uri) => self.scoped_exists(uri),
        }
    }

    /// Returns `true` if `relative` exists below `dir`.
    pub fn exists_in(&self, dir: &Location, relative: &str) -> bool {
        match dir {
            Location::Direct(path) => direct::exists(&path.join(relative)),
            Location::Scoped(uri) => self.scoped_exists(&uri.with_relative(relative)),
        }
    }

    /// Last modification time, or `None` when it cannot be determined.
    pub fn last_modified(&self, location: &Location) -> Option<SystemTime> {
        match location {
            Location::Direct(path) => direct::last_modified(path),
            Location::Scoped(uri) => {
                let uri = self.materialize(uri).ok().flatten()?;
                self.scoped.stat(&uri)?.last_modified
            }
        }
    }

    /// Delete the file or empty directory at `location`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if nothing exists there
    /// - [`StorageError::PermissionDenied`] if the backend denies access
    pub fn delete(&self, location: &Location) -> Result<bool, StorageError> {
        match location {
            Location::Direct(path) => direct::delete(path),
            Location::Scoped(uri) => {
                let target = self.materialize(uri)?.ok_or_else(|| StorageError::NotFound {
                    location: uri.to_string(),
                })?;
                self.scoped.delete(&target)
            }
        }
    }

    /// Location of `name` inside `dir`, if it exists. Never creates.
    ///
    /// # Errors
    ///
    /// - [`StorageError::PermissionDenied`] if the scoped grant is gone
    pub fn resolve_child(&self, dir: &Location, name: &str) -> Result<Option<Location>, StorageError> {
        match dir {
            Location::Direct(path) => Ok(direct::existing_child(path, name).map(Location::Direct)),
            Location::Scoped(uri) => {
                let Some(parent) = self.materialize(uri)? else {
                    return Ok(None);
                };
                Ok(self.scoped.resolve(&parent, name, false)?.map(Location::Scoped))
            }
        }
    }

    /// Location of `relative` (e.g. `"foo/bar.txt"`) below `dir`, if it
    /// exists. Never creates.
    ///
    /// # Errors
    ///
    /// - [`StorageError::PermissionDenied`] if the scoped grant is gone
    pub fn resolve_relative(
        &self,
        dir: &Location,
        relative: &str,
    ) -> Result<Option<Location>, StorageError> {
        match dir {
            Location::Direct(path) => Ok(direct::existing_child(path, relative).map(Location::Direct)),
            Location::Scoped(uri) => Ok(self
                .materialize(&uri.with_relative(relative))?
                .map(Location::Scoped)),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create `name` inside `dir` and return its location.
    ///
    /// With `replace == false` an existing file is returned untouched. With
    /// `replace == true` it is deleted and recreated empty. The scoped
    /// backend may alter the final name, so callers must use the returned
    /// location rather than assume it ends in `name`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] if `name` is empty or creation fails
    /// - [`StorageError::NotFound`] if `dir` does not exist
    pub fn create_file(&self, dir: &Location, name: &str, replace: bool) -> Result<Location, StorageError> {
        if name.is_empty() {
            return Err(StorageError::Io {
                operation: "create_file",
                location: dir.to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty file name"),
            });
        }
        match dir {
            Location::Direct(path) => direct::create_file(path, name, replace).map(Location::Direct),
            Location::Scoped(uri) => self.scoped_create_file(uri, name, replace).map(Location::Scoped),
        }
    }

    /// Copy the content of `src` into `dest`, replacing what `dest` held.
    ///
    /// Both descriptors are released on every path. A failure midway leaves
    /// whatever was already written to `dest` in place. Copying a resource
    /// onto itself is a no-op.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] on any read or write error
    pub fn copy(&self, src: &Location, dest: &Location) -> Result<(), StorageError> {
        if self.same_resource(src, dest) {
            debug!("skipping copy of {src} onto itself");
            return Ok(());
        }
        let mut input = self.open(src, OpenMode::Read)?;
        let mut output = self.open(dest, OpenMode::ReadWriteTruncate)?;
        let copied = io::copy(&mut input, &mut output)
            .map_err(|e| StorageError::io("copy", dest.to_string(), e))?;
        debug!("copied {copied} bytes from {src} to {dest}");
        input.close()?;
        output.close()
    }

    /// Replace the content of `dest` with `data`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] on any open or write error
    pub fn write_bytes(&self, data: &[u8], dest: &Location) -> Result<(), StorageError> {
        let mut output = self.open(dest, OpenMode::ReadWriteTruncate)?;
        io::Write::write_all(&mut output, data)
            .map_err(|e| StorageError::io("write", dest.to_string(), e))?;
        output.close()
    }

    /// Replace the content of `dest` with UTF-8 `text`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] on any open or write error
    pub fn write_str(&self, text: &str, dest: &Location) -> Result<(), StorageError> {
        self.write_bytes(text.as_bytes(), dest)
    }

    /// Open `location` and hand back a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the location cannot be resolved
    /// - [`StorageError::PermissionDenied`] if the backend denies access
    pub fn open(&self, location: &Location, mode: OpenMode) -> Result<ScopedDescriptor, StorageError> {
        let raw: Box<dyn crate::RawDescriptor> = match location {
            Location::Direct(path) => Box::new(direct::open(path, mode)?),
            Location::Scoped(uri) => {
                let target = self.materialize(uri)?.ok_or_else(|| StorageError::NotFound {
                    location: uri.to_string(),
                })?;
                self.scoped.open(&target, mode)?
            }
        };
        Ok(ScopedDescriptor::new(raw, mode, location.to_string()))
    }

    // ------------------------------------------------------------------
    // Devices and space
    // ------------------------------------------------------------------

    /// Free bytes on the volume behind `location`, or
    /// [`UNKNOWN_AVAILABLE_BYTES`] when that cannot be determined.
    pub fn available_bytes(&self, location: &Location) -> i64 {
        let probe = match location {
            Location::Direct(_) => self.open(location, OpenMode::Read),
            Location::Scoped(uri) => self.open(&Location::Scoped(uri.root()), OpenMode::Read),
        };
        let bytes = probe.and_then(|fd| {
            let bytes = fd.available_bytes()?;
            fd.close()?;
            Ok(bytes)
        });
        match bytes {
            Ok(bytes) => i64::try_from(bytes).unwrap_or(i64::MAX),
            Err(e) => {
                warn!("cannot determine free space of {location}: {e}");
                UNKNOWN_AVAILABLE_BYTES
            }
        }
    }

    /// Storage devices the application can write to, primary first.
    ///
    /// Recomputed on each call. Secondary volumes the platform lists but
    /// that do not exist are skipped with a warning.
    pub fn enumerate_storage_devices(&self) -> Vec<StorageDevice> {
        let mut devices = Vec::new();

        match self.platform.user_dir() {
            Some(primary) => devices.push(direct_device(primary)),
            None => warn!("primary storage is not available"),
        }

        if let Some(alt) = self.platform.alt_storage_dir() {
            devices.push(direct_device(alt));
        }

        // The first app files dir lives on the primary volume.
        for dir in self.platform.app_files_dirs().into_iter().skip(1) {
            if dir.exists() {
                devices.push(direct_device(dir));
            } else {
                warn!("unexpected external storage: {}", dir.display());
            }
        }

        for root in self.scoped.list_roots() {
            let stat = self.scoped.stat(&root);
            devices.push(StorageDevice {
                name: stat
                    .as_ref()
                    .and_then(|s| s.name.clone())
                    .unwrap_or_else(|| root.to_string()),
                available: stat.is_some(),
                root: Location::Scoped(root),
            });
        }

        devices
    }

    /// Returns `true` if the primary storage is mounted read-write.
    pub fn is_storage_writable(&self) -> bool {
        self.platform.media_state() == MediaState::Mounted
    }

    /// Returns `true` if the primary storage can at least be read.
    pub fn is_storage_readable(&self) -> bool {
        matches!(
            self.platform.media_state(),
            MediaState::Mounted | MediaState::MountedReadOnly
        )
    }

    /// The platform's downloads directory.
    pub fn default_download_path(&self) -> Option<PathBuf> {
        self.platform.default_download_dir()
    }

    /// The platform's primary shared storage directory.
    pub fn user_dir_path(&self) -> Option<PathBuf> {
        self.platform.user_dir()
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    /// See [`sanitize_name`](crate::sanitize_name).
    pub fn sanitize_name(&self, name: &str) -> String {
        sanitize::sanitize_name(name)
    }

    /// See [`is_valid_name`](crate::is_valid_name).
    pub fn is_valid_name(&self, name: &str) -> bool {
        sanitize::is_valid_name(name)
    }

    /// Path string for `location`, with an optional relative sub-path.
    ///
    /// Direct locations yield a plain path; scoped ones yield the composite
    /// handle string.
    pub fn make_file_system_path(&self, location: &Location, relative: Option<&str>) -> String {
        let relative = relative.unwrap_or_default();
        match location {
            Location::Direct(path) if relative.is_empty() => path.display().to_string(),
            Location::Direct(path) => path.join(relative).display().to_string(),
            Location::Scoped(uri) => uri.with_relative(relative).to_string(),
        }
    }

    /// Display name for a directory: the path itself, or the provider's
    /// name for the scoped root.
    pub fn dir_name(&self, dir: &Location) -> String {
        match dir {
            Location::Direct(path) => path.display().to_string(),
            Location::Scoped(uri) => self
                .scoped
                .stat(&uri.root())
                .and_then(|s| s.name)
                .unwrap_or_else(|| uri.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Temp files
    // ------------------------------------------------------------------

    /// The application's temp directory, created on demand.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the platform lists no app files dir
    /// - [`StorageError::Io`] if the directory cannot be created
    pub fn temp_dir(&self) -> Result<PathBuf, StorageError> {
        let base = self
            .platform
            .app_files_dirs()
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound {
                location: TEMP_DIR.to_owned(),
            })?;
        let dir = base.join(TEMP_DIR);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)
                .map_err(|e| StorageError::io("temp_dir", Location::from_path(&dir).to_string(), e))?;
        }
        Ok(dir)
    }

    /// A fresh, not yet created file in the temp directory, named
    /// `<uuid><suffix>`.
    ///
    /// # Errors
    ///
    /// Same as [`temp_dir`](Self::temp_dir).
    pub fn temp_file(&self, suffix: &str) -> Result<Location, StorageError> {
        let name = format!("{}{suffix}", uuid::Uuid::new_v4());
        Ok(Location::Direct(self.temp_dir()?.join(name)))
    }

    /// Remove everything inside the temp directory.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the temp directory cannot be obtained
    /// - [`StorageError::Io`] if an entry cannot be removed
    pub fn clean_temp_dir(&self) -> Result<(), StorageError> {
        let dir = self.temp_dir()?;
        let entries = fs::read_dir(&dir)
            .map_err(|e| StorageError::io("clean_temp_dir", Location::from_path(&dir).to_string(), e))?;
        for entry in entries {
            let path = entry
                .map_err(|e| StorageError::io("clean_temp_dir", Location::from_path(&dir).to_string(), e))?
                .path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| StorageError::io("clean_temp_dir", Location::from_path(&path).to_string(), e))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scoped helpers
    // ------------------------------------------------------------------

    /// Walk the relative part of `uri`; `None` if a component is missing.
    fn materialize(&self, uri: &ScopedUri) -> Result<Option<ScopedUri>, StorageError> {
        let mut current = uri.root();
        for component in uri.relative_components() {
            match self.scoped.resolve(&current, component, false)? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    // Unresolvable locations are never the same; `open` reports them.
    fn same_resource(&self, a: &Location, b: &Location) -> bool {
        match (a, b) {
            (Location::Direct(a), Location::Direct(b)) => matches!(
                (fs::canonicalize(a), fs::canonicalize(b)),
                (Ok(a), Ok(b)) if a == b
            ),
            (Location::Scoped(a), Location::Scoped(b)) => matches!(
                (self.materialize(a), self.materialize(b)),
                (Ok(Some(a)), Ok(Some(b))) if a == b
            ),
            _ => false,
        }
    }

    fn scoped_exists(&self, uri: &ScopedUri) -> bool {
        match self.materialize(uri) {
            Ok(Some(target)) => self.scoped.stat(&target).is_some(),
            Ok(None) => false,
            Err(e) => {
                debug!("exists probe failed for {uri}: {e}");
                false
            }
        }
    }

    fn scoped_create_file(&self, dir: &ScopedUri, name: &str, replace: bool) -> Result<ScopedUri, StorageError> {
        let parent = self.materialize(dir)?.ok_or_else(|| StorageError::NotFound {
            location: dir.to_string(),
        })?;
        if let Some(existing) = self.scoped.resolve(&parent, name, false)? {
            if !replace {
                return Ok(existing);
            }
            if !self.scoped.delete(&existing)? {
                return Err(StorageError::Io {
                    operation: "create_file",
                    location: existing.to_string(),
                    source: io::Error::other("unable to replace existing file"),
                });
            }
        }
        self.scoped
            .resolve(&parent, name, true)?
            .ok_or_else(|| StorageError::Io {
                operation: "create_file",
                location: parent.with_relative(name).to_string(),
                source: io::Error::other("backend did not create the file"),
            })
    }
}

fn direct_device(path: PathBuf) -> StorageDevice {
    StorageDevice {
        name: path.display().to_string(),
        available: path.is_dir(),
        root: Location::Direct(path),
    }
}

impl std::fmt::Debug for StorageFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageFacade").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticPlatform;

    fn facade_in(tmp: &tempfile::TempDir) -> StorageFacade {
        let platform = StaticPlatform::new()
            .with_user_dir(tmp.path())
            .with_download_dir(tmp.path().join("Download"))
            .with_app_files_dirs(vec![tmp.path().join("files")]);
        StorageFacade::direct_only(Arc::new(platform))
    }

    #[test]
    fn exists_is_false_for_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let facade = facade_in(&tmp);
        assert!(!facade.exists(&Location::from_path(tmp.path().join("missing"))));
        assert!(facade.exists(&Location::from_path(tmp.path())));
    }

    #[test]
    fn scoped_location_without_backend_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let facade = facade_in(&tmp);
        let loc = Location::Scoped(ScopedUri::new("content://t"));
        assert!(!facade.exists(&loc));
        assert!(matches!(
            facade.open(&loc, OpenMode::Read),
            Err(StorageError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn create_file_rejects_empty_name() {
        let tmp = tempfile::tempdir().unwrap();
        let facade = facade_in(&tmp);
        let err = facade
            .create_file(&Location::from_path(tmp.path()), "", false)
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn temp_file_lives_in_temp_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let facade = facade_in(&tmp);
        let loc = facade.temp_file(".torrent").unwrap();
        let path = loc.as_path().unwrap();
        assert_eq!(path.parent().unwrap(), tmp.path().join("files").join(TEMP_DIR));
        assert!(path.to_str().unwrap().ends_with(".torrent"));
        assert!(!path.exists());
    }

    #[test]
    fn temp_dir_without_app_dirs_is_not_found() {
        let facade = StorageFacade::direct_only(Arc::new(StaticPlatform::new()));
        assert!(matches!(facade.temp_dir(), Err(StorageError::NotFound { .. })));
        assert!(matches!(
            facade.clean_temp_dir(),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn storage_state_follows_media_state() {
        let platform = Arc::new(StaticPlatform::new());
        let facade = StorageFacade::direct_only(platform.clone());
        assert!(facade.is_storage_writable());
        platform.set_media_state(MediaState::MountedReadOnly);
        assert!(!facade.is_storage_writable());
        assert!(facade.is_storage_readable());
        platform.set_media_state(MediaState::Unavailable);
        assert!(!facade.is_storage_readable());
    }

    #[test]
    fn make_file_system_path_forms() {
        let facade = StorageFacade::direct_only(Arc::new(StaticPlatform::new()));
        let direct = Location::from_path("/data/dl");
        assert_eq!(facade.make_file_system_path(&direct, None), "/data/dl");
        assert_eq!(
            facade.make_file_system_path(&direct, Some("a/b")),
            std::path::Path::new("/data/dl").join("a/b").display().to_string()
        );
        let scoped = Location::Scoped(ScopedUri::new("content://t"));
        assert_eq!(
            facade.make_file_system_path(&scoped, Some("x/y.txt")),
            "content://t#/x/y.txt"
        );
    }

    #[test]
    fn dir_name_of_direct_is_path() {
        let facade = StorageFacade::direct_only(Arc::new(StaticPlatform::new()));
        assert_eq!(facade.dir_name(&Location::from_path("/data")), "/data");
        assert_eq!(
            facade.dir_name(&Location::Scoped(ScopedUri::new("content://t"))),
            "content://t"
        );
    }
}
