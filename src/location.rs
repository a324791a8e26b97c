//! # Locations and scheme dispatch
//!
//! A [`Location`] names a file or directory on one of two backends:
//!
//! | Variant | String form | Backend |
//! |---------|-------------|---------|
//! | [`Location::Direct`] | `file:///abs/path` | conventional filesystem |
//! | [`Location::Scoped`] | `content://...` (plus optional `#/sub/path`) | scoped-storage backend |
//!
//! [`classify`] is the single decision point: it looks at the scheme only and
//! never touches storage. Once a `Location` is built its variant is fixed, so
//! the facade dispatches with a plain `match`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::StorageError;

/// Scheme of conventional filesystem locations.
pub const FILE_SCHEME: &str = "file";

/// Scheme owned by the scoped-storage backend.
pub const SCOPED_SCHEME: &str = "content";

/// Prefix used for direct paths in string form.
pub const FILE_PREFIX: &str = "file://";

/// Separator between a scoped handle and its not-yet-materialized sub-path.
const RELATIVE_SEPARATOR: &str = "#/";

/// The only host a `file://` location may name.
const LOCAL_HOST: &str = "localhost";

/// Backend a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationKind {
    /// Conventional filesystem path.
    DirectPath,
    /// Handle issued by the scoped-storage backend.
    ScopedHandle,
}

/// Classify a location string by its scheme.
///
/// Pure and total over well-formed input: no I/O is performed.
///
/// # Errors
///
/// - [`StorageError::InvalidLocation`] if the string has no scheme or the
///   scheme is neither `file` nor `content`
///
/// # Example
///
/// ```rust
/// use torrent_storage::{classify, LocationKind};
///
/// assert_eq!(classify("file:///tmp/x").unwrap(), LocationKind::DirectPath);
/// assert!(classify("ftp://host/x").is_err());
/// ```
pub fn classify(uri: &str) -> Result<LocationKind, StorageError> {
    match scheme_of(uri) {
        Some(FILE_SCHEME) => Ok(LocationKind::DirectPath),
        Some(SCOPED_SCHEME) => Ok(LocationKind::ScopedHandle),
        _ => Err(StorageError::InvalidLocation {
            location: uri.to_owned(),
        }),
    }
}

fn scheme_of(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Prefix `file://` to a bare path.
///
/// Strings that already carry a recognized scheme are returned unchanged.
///
/// ```rust
/// use torrent_storage::normalize_file_system_path;
///
/// assert_eq!(normalize_file_system_path("/sdcard/Download"), "file:///sdcard/Download");
/// assert_eq!(normalize_file_system_path("file:///a"), "file:///a");
/// ```
pub fn normalize_file_system_path(path: &str) -> String {
    if classify(path).is_ok() {
        path.to_owned()
    } else {
        format!("{FILE_PREFIX}{path}")
    }
}

/// A handle issued by the scoped-storage backend.
///
/// `tree` is the backend's own identifier. `relative`, when set, names a
/// child below `tree` that may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScopedUri {
    tree: String,
    relative: Option<String>,
}

impl ScopedUri {
    /// Wrap a backend handle string.
    pub fn new(tree: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            relative: None,
        }
    }

    /// A not-yet-materialized child of `self`, addressed by a relative path.
    ///
    /// Empty components are dropped, so `"a//b/"` and `"a/b"` are the same.
    pub fn with_relative(&self, relative: &str) -> Self {
        let mut parts: Vec<&str> = self
            .relative
            .as_deref()
            .map(|r| r.split('/').collect())
            .unwrap_or_default();
        parts.extend(relative.split('/'));
        let joined = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            tree: self.tree.clone(),
            relative: (!joined.is_empty()).then_some(joined),
        }
    }

    /// The backend handle string.
    pub fn tree(&self) -> &str {
        &self.tree
    }

    /// Relative sub-path below the handle, if any.
    pub fn relative(&self) -> Option<&str> {
        self.relative.as_deref()
    }

    /// The handle without its relative part.
    pub fn root(&self) -> ScopedUri {
        ScopedUri::new(self.tree.clone())
    }

    /// Components of the relative sub-path.
    pub fn relative_components(&self) -> impl Iterator<Item = &str> {
        self.relative
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .filter(|c| !c.is_empty())
    }
}

impl fmt::Display for ScopedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relative {
            Some(rel) => write!(f, "{}{RELATIVE_SEPARATOR}{rel}", self.tree),
            None => f.write_str(&self.tree),
        }
    }
}

/// Backend-tagged identifier of a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// Conventional absolute path.
    Direct(PathBuf),
    /// Scoped-storage handle.
    Scoped(ScopedUri),
}

impl Location {
    /// Parse the string form of a location.
    ///
    /// # Errors
    ///
    /// - [`StorageError::InvalidLocation`] for unknown or missing schemes
    /// - [`StorageError::InvalidLocation`] for a `file` location whose path
    ///   is not absolute (an empty or `localhost` authority is accepted)
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        match classify(uri)? {
            LocationKind::DirectPath => {
                let rest = &uri[FILE_PREFIX.len()..];
                let path = rest.strip_prefix(LOCAL_HOST).unwrap_or(rest);
                if !Path::new(path).has_root() {
                    return Err(StorageError::InvalidLocation {
                        location: uri.to_owned(),
                    });
                }
                Ok(Location::Direct(PathBuf::from(path)))
            }
            LocationKind::ScopedHandle => Ok(Location::Scoped(match uri.split_once(RELATIVE_SEPARATOR) {
                Some((tree, rel)) => ScopedUri::new(tree).with_relative(rel),
                None => ScopedUri::new(uri),
            })),
        }
    }

    /// A direct location for `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Location::Direct(path.into())
    }

    /// Backend this location belongs to.
    #[inline]
    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Direct(_) => LocationKind::DirectPath,
            Location::Scoped(_) => LocationKind::ScopedHandle,
        }
    }

    /// The filesystem path, for direct locations.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Location::Direct(p) => Some(p),
            Location::Scoped(_) => None,
        }
    }

    /// The scoped handle, for scoped locations.
    pub fn as_scoped(&self) -> Option<&ScopedUri> {
        match self {
            Location::Direct(_) => None,
            Location::Scoped(u) => Some(u),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Direct(p) => write!(f, "{FILE_PREFIX}{}", p.display()),
            Location::Scoped(u) => u.fmt(f),
        }
    }
}

impl std::str::FromStr for Location {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::parse(s)
    }
}
