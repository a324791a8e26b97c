//! Capability surface of the scoped-storage backend.

use crate::{OpenMode, RawDescriptor, ScopedStat, ScopedUri, StorageError};

/// Narrow capability interface to a permission-scoped storage provider.
///
/// The facade never depends on anything beyond these five calls. Handles
/// passed in are always materialized: the facade walks any relative
/// sub-path with [`resolve`](Self::resolve) before calling the others.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`; backends
/// use interior mutability for their own state.
///
/// # Object Safety
///
/// This trait is object-safe and is held as `Arc<dyn ScopedBackend>`.
pub trait ScopedBackend: Send + Sync {
    /// Look up `name` directly below `parent`.
    ///
    /// When `create` is `true` and no such child exists, a new empty file is
    /// created and returned. The provider may alter the final name.
    ///
    /// Returns `Ok(None)` if the child does not exist and `create` is `false`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::PermissionDenied`] if the grant for `parent` is gone
    /// - [`StorageError::Io`] if creation fails
    fn resolve(
        &self,
        parent: &ScopedUri,
        name: &str,
        create: bool,
    ) -> Result<Option<ScopedUri>, StorageError>;

    /// Open the content of `uri`.
    ///
    /// Opening a tree root with [`OpenMode::Read`] yields a descriptor usable
    /// for free-space probes.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the handle names nothing
    /// - [`StorageError::PermissionDenied`] if access was revoked
    fn open(&self, uri: &ScopedUri, mode: OpenMode) -> Result<Box<dyn RawDescriptor>, StorageError>;

    /// Delete the resource behind `uri`.
    ///
    /// Returns `Ok(false)` if the provider refused without an error.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the handle names nothing
    fn delete(&self, uri: &ScopedUri) -> Result<bool, StorageError>;

    /// Name and modification time of `uri`, or `None` if it cannot be stat'ed.
    fn stat(&self, uri: &ScopedUri) -> Option<ScopedStat>;

    /// Roots the application currently holds grants for.
    fn list_roots(&self) -> Vec<ScopedUri>;
}

/// Backend used when the host has no scoped storage.
///
/// Every call fails with [`StorageError::InvalidLocation`]: no handle can be
/// served.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScopedStorage;

impl NoScopedStorage {
    fn reject(uri: &ScopedUri) -> StorageError {
        StorageError::InvalidLocation {
            location: uri.to_string(),
        }
    }
}

impl ScopedBackend for NoScopedStorage {
    fn resolve(
        &self,
        parent: &ScopedUri,
        _name: &str,
        _create: bool,
    ) -> Result<Option<ScopedUri>, StorageError> {
        Err(Self::reject(parent))
    }

    fn open(&self, uri: &ScopedUri, _mode: OpenMode) -> Result<Box<dyn RawDescriptor>, StorageError> {
        Err(Self::reject(uri))
    }

    fn delete(&self, uri: &ScopedUri) -> Result<bool, StorageError> {
        Err(Self::reject(uri))
    }

    fn stat(&self, _uri: &ScopedUri) -> Option<ScopedStat> {
        None
    }

    fn list_roots(&self) -> Vec<ScopedUri> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_backend_is_object_safe() {
        fn _check(_: &dyn ScopedBackend) {}
    }

    #[test]
    fn scoped_backend_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: ScopedBackend>() {
            _assert_send_sync::<T>();
        }
    }

    #[test]
    fn no_scoped_storage_rejects_everything() {
        let backend = NoScopedStorage;
        let uri = ScopedUri::new("content://t");
        assert!(matches!(
            backend.resolve(&uri, "a", false),
            Err(StorageError::InvalidLocation { .. })
        ));
        assert!(backend.open(&uri, OpenMode::Read).is_err());
        assert!(backend.delete(&uri).is_err());
        assert!(backend.stat(&uri).is_none());
        assert!(backend.list_roots().is_empty());
    }
}
