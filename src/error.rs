//! Error types for storage operations and settings persistence.
//!
//! A failed file operation ([`StorageError`]) and a setting that could not
//! be saved ([`SettingsError`]) are separate types and map to separate
//! user-facing messages.

use std::io;

/// Storage error type with contextual variants.
///
/// `location` fields carry the serialized form of the [`Location`](crate::Location)
/// involved, so errors stay printable without borrowing the location.
///
/// # Examples
///
/// ```rust
/// use torrent_storage::StorageError;
///
/// let err = StorageError::NotFound { location: "file:///missing".into() };
/// assert_eq!(err.to_string(), "not found: file:///missing");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The location's scheme is not handled by any backend.
    #[error("invalid location: {location}")]
    InvalidLocation {
        /// The offending location string.
        location: String,
    },

    /// The target resource does not exist.
    #[error("not found: {location}")]
    NotFound {
        /// The location that was not found.
        location: String,
    },

    /// The backend denied access. Callers should ask for a re-grant rather
    /// than retry.
    #[error("{operation}: permission denied: {location}")]
    PermissionDenied {
        /// The location where access was denied.
        location: String,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// Read, write or create failure from either backend.
    #[error("{operation} failed for {location}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The location involved in the operation.
        location: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Platform-level failure without a more specific classification.
    #[error("unknown storage error: {0}")]
    Unknown(String),
}

impl StorageError {
    /// Wraps an I/O error with the operation and location it happened on,
    /// keeping `NotFound` and `PermissionDenied` distinct.
    pub fn io(operation: &'static str, location: impl Into<String>, source: io::Error) -> Self {
        let location = location.into();
        match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound { location },
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                location,
                operation,
            },
            _ => StorageError::Io {
                operation,
                location,
                source,
            },
        }
    }

    /// Returns `true` for the I/O failure kind.
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Io { .. })
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::io("io", String::new(), error)
    }
}

/// Error raised when a setting cannot be persisted.
///
/// Reads never fail; a missing or unreadable value falls back to the
/// setting's default.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The preference store could not write the value.
    #[error("failed to persist setting {key}: {source}")]
    Persist {
        /// Key of the setting being written.
        key: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The preference map could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The persisted preference document could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_location_display() {
        let err = StorageError::InvalidLocation {
            location: "ftp://host/file".into(),
        };
        assert_eq!(err.to_string(), "invalid location: ftp://host/file");
    }

    #[test]
    fn permission_denied_display() {
        let err = StorageError::PermissionDenied {
            location: "content://tree/a".into(),
            operation: "open",
        };
        assert_eq!(err.to_string(), "open: permission denied: content://tree/a");
    }

    #[test]
    fn io_helper_maps_not_found() {
        let err = StorageError::io(
            "open",
            "file:///x",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, StorageError::NotFound { ref location } if location == "file:///x"));
    }

    #[test]
    fn io_helper_maps_permission_denied() {
        let err = StorageError::io(
            "delete",
            "file:///x",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(
            err,
            StorageError::PermissionDenied {
                operation: "delete",
                ..
            }
        ));
    }

    #[test]
    fn io_helper_keeps_other_kinds_as_io() {
        let err = StorageError::io("write", "file:///x", io::Error::other("disk on fire"));
        assert!(err.is_io());
        assert!(err.to_string().contains("write failed for file:///x"));
    }

    #[test]
    fn from_io_error() {
        let err = StorageError::from(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn settings_error_display() {
        let err = SettingsError::Persist {
            key: "port_range_first".into(),
            source: io::Error::other("read-only"),
        };
        assert_eq!(
            err.to_string(),
            "failed to persist setting port_range_first: read-only"
        );
    }
}
