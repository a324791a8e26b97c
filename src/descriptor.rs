//! Scoped file descriptors.
//!
//! Every operation that needs raw file content acquires a
//! [`ScopedDescriptor`], uses it, and lets it go. The guard owns the
//! backend's [`RawDescriptor`] and releases it exactly once: explicitly via
//! [`ScopedDescriptor::close`], or on drop when an error or early return
//! leaves the scope.
//!
//! ```text
//! backend.open() ──▶ ScopedDescriptor ──▶ read/write ──▶ close() or drop
//! ```

use std::fs::File;
use std::io::{self, Read, Write};

use log::debug;

use crate::{OpenMode, StorageError};

/// An open file handle as returned by a storage backend.
///
/// Implemented for [`std::fs::File`]; scoped-storage backends return their
/// own implementations. Dropping the value closes the underlying handle.
pub trait RawDescriptor: Read + Write + Send {
    /// Free bytes on the filesystem that backs this descriptor.
    ///
    /// # Errors
    ///
    /// Any error from the platform probe; callers degrade it to a sentinel.
    fn available_bytes(&self) -> io::Result<u64>;
}

impl RawDescriptor for File {
    #[cfg(unix)]
    fn available_bytes(&self) -> io::Result<u64> {
        let stat = nix::sys::statvfs::fstatvfs(self).map_err(io::Error::from)?;
        #[allow(clippy::unnecessary_cast)]
        let bytes = (stat.blocks_available() as u64).saturating_mul(stat.fragment_size() as u64);
        Ok(bytes)
    }

    #[cfg(not(unix))]
    fn available_bytes(&self) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "free space probe is not available on this platform",
        ))
    }
}

/// Exclusive owner of one open descriptor for the duration of one operation.
///
/// Never shared between concurrent calls. Release happens once, on
/// [`close`](Self::close) or on drop, whichever comes first.
pub struct ScopedDescriptor {
    raw: Option<Box<dyn RawDescriptor>>,
    mode: OpenMode,
    location: String,
}

impl ScopedDescriptor {
    /// Take ownership of an opened descriptor.
    pub fn new(raw: Box<dyn RawDescriptor>, mode: OpenMode, location: impl Into<String>) -> Self {
        let location = location.into();
        debug!("opened descriptor ({}) for {location}", mode.as_str());
        Self {
            raw: Some(raw),
            mode,
            location,
        }
    }

    /// Mode the descriptor was opened with.
    #[inline]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Serialized location the descriptor was opened for.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Free bytes on the filesystem backing this descriptor.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] if the probe fails
    pub fn available_bytes(&self) -> Result<u64, StorageError> {
        self.raw()
            .and_then(|raw| raw.available_bytes())
            .map_err(|e| StorageError::io("available_bytes", self.location.clone(), e))
    }

    /// Flush pending writes and release the descriptor.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Io`] if the final flush fails; the descriptor is
    ///   released regardless
    pub fn close(mut self) -> Result<(), StorageError> {
        match self.release() {
            Ok(()) => Ok(()),
            Err(e) => Err(StorageError::io("close", self.location.clone(), e)),
        }
    }

    fn release(&mut self) -> io::Result<()> {
        let Some(mut raw) = self.raw.take() else {
            return Ok(());
        };
        let flushed = if self.mode.writable() {
            raw.flush()
        } else {
            Ok(())
        };
        drop(raw);
        debug!("released descriptor for {}", self.location);
        flushed
    }

    fn raw(&self) -> io::Result<&dyn RawDescriptor> {
        self.raw.as_deref().ok_or_else(closed_error)
    }

    fn raw_mut(&mut self) -> io::Result<&mut Box<dyn RawDescriptor>> {
        self.raw.as_mut().ok_or_else(closed_error)
    }
}

fn closed_error() -> io::Error {
    io::Error::other("descriptor already released")
}

impl Read for ScopedDescriptor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.raw_mut()?.read(buf)
    }
}

impl Write for ScopedDescriptor {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.mode.writable() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "descriptor opened read-only",
            ));
        }
        self.raw_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.raw_mut()?.flush()
    }
}

impl Drop for ScopedDescriptor {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            debug!("flush on release failed for {}: {e}", self.location);
        }
    }
}

impl std::fmt::Debug for ScopedDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedDescriptor")
            .field("mode", &self.mode)
            .field("location", &self.location)
            .field("open", &self.raw.is_some())
            .finish()
    }
}
