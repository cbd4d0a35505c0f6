//! Change detection over a virtual file system.
//!
//! A [`FileSystem`] resolves URIs into [`VfsPath`] handles and answers
//! existence and modification queries for them. [`VfsReloadingDetector`] runs
//! the ordinary timestamp algorithm against such a file system, so the same
//! detector logic works for local files and for in-memory resources used in
//! tests or embedded setups.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use super::file::FileReloadingDetector;
use super::locator::{ResourceLocator, resolve_location};
use super::types::ReloadError;

/// A resolved resource inside a [`FileSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VfsPath {
    /// A file on the local file system.
    Local(PathBuf),

    /// A key inside a [`MemoryFileSystem`].
    Memory(String),
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Memory(key) => write!(f, "memory:{key}"),
        }
    }
}

/// Abstraction over the storage holding monitored resources.
pub trait FileSystem: Send + Sync {
    /// Resolves a URI into a path handle.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::UnresolvableResource`] if the URI does not
    /// address anything this file system can serve.
    fn resolve(&self, uri: &str) -> Result<VfsPath, ReloadError>;

    /// Returns whether the resource exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the check itself failed.
    fn exists(&self, path: &VfsPath) -> io::Result<bool>;

    /// Returns the last modification time of the resource.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the resource is missing or unreadable.
    fn last_modified(&self, path: &VfsPath) -> io::Result<SystemTime>;
}

fn foreign_path(path: &VfsPath) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("path '{path}' belongs to another file system"),
    )
}

// =============================================================================
// Local file system
// =============================================================================

/// [`FileSystem`] backed by the local disk.
///
/// Accepts plain paths, `file:` URLs and archive URLs (which resolve to the
/// archive file).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn resolve(&self, uri: &str) -> Result<VfsPath, ReloadError> {
        resolve_location(uri).map(VfsPath::Local).ok_or_else(|| {
            ReloadError::unresolvable(uri, "location does not map to a local file")
        })
    }

    fn exists(&self, path: &VfsPath) -> io::Result<bool> {
        match path {
            VfsPath::Local(path) => path.try_exists(),
            VfsPath::Memory(_) => Err(foreign_path(path)),
        }
    }

    fn last_modified(&self, path: &VfsPath) -> io::Result<SystemTime> {
        match path {
            VfsPath::Local(path) => std::fs::metadata(path)?.modified(),
            VfsPath::Memory(_) => Err(foreign_path(path)),
        }
    }
}

// =============================================================================
// In-memory file system
// =============================================================================

/// [`FileSystem`] keeping modification times in memory.
///
/// Any non-empty URI resolves; a resource exists once it has been
/// [`touch`](Self::touch)ed or given an explicit modification time.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<String, SystemTime>>,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or updates a resource with the current time.
    pub fn touch(&self, uri: &str) {
        self.set_modified(uri, SystemTime::now());
    }

    /// Creates or updates a resource with an explicit modification time.
    pub fn set_modified(&self, uri: &str, time: SystemTime) {
        self.files.write().insert(uri.to_string(), time);
    }

    /// Removes a resource. Returns `true` if it existed.
    pub fn remove(&self, uri: &str) -> bool {
        self.files.write().remove(uri).is_some()
    }
}

impl FileSystem for MemoryFileSystem {
    fn resolve(&self, uri: &str) -> Result<VfsPath, ReloadError> {
        if uri.trim().is_empty() {
            return Err(ReloadError::unresolvable(uri, "empty location"));
        }
        Ok(VfsPath::Memory(uri.to_string()))
    }

    fn exists(&self, path: &VfsPath) -> io::Result<bool> {
        match path {
            VfsPath::Memory(key) => Ok(self.files.read().contains_key(key)),
            VfsPath::Local(_) => Err(foreign_path(path)),
        }
    }

    fn last_modified(&self, path: &VfsPath) -> io::Result<SystemTime> {
        match path {
            VfsPath::Memory(key) => self.files.read().get(key).copied().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("'{key}' does not exist"))
            }),
            VfsPath::Local(_) => Err(foreign_path(path)),
        }
    }
}

// =============================================================================
// Locator and detector
// =============================================================================

/// [`ResourceLocator`] addressing a URI inside a [`FileSystem`].
///
/// The URI is resolved on every access, so a resource that only becomes
/// resolvable later is picked up without recreating the locator.
#[derive(Clone)]
pub struct VfsLocator {
    fs: Arc<dyn FileSystem>,
    uri: Option<String>,
}

impl VfsLocator {
    /// Create a locator for `uri` inside `fs`.
    pub fn new(fs: Arc<dyn FileSystem>, uri: impl Into<String>) -> Self {
        Self {
            fs,
            uri: Some(uri.into()),
        }
    }

    /// Create a locator that addresses nothing.
    pub fn unset(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, uri: None }
    }

    /// The monitored URI.
    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Resolves the monitored URI.
    ///
    /// Returns `Ok(None)` when no URI is set.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::UnresolvableResource`] when the URI cannot be
    /// resolved by the file system.
    pub fn resolve(&self) -> Result<Option<VfsPath>, ReloadError> {
        self.uri
            .as_deref()
            .map(|uri| self.fs.resolve(uri))
            .transpose()
    }

    fn resolved(&self) -> io::Result<Option<VfsPath>> {
        self.resolve()
            .map_err(|err| io::Error::new(io::ErrorKind::NotFound, err.to_string()))
    }
}

impl fmt::Debug for VfsLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VfsLocator").field("uri", &self.uri).finish()
    }
}

impl ResourceLocator for VfsLocator {
    fn exists(&self) -> io::Result<bool> {
        match self.resolved()? {
            Some(path) => self.fs.exists(&path),
            None => Ok(false),
        }
    }

    fn last_modified(&self) -> io::Result<SystemTime> {
        match self.resolved()? {
            Some(path) => self.fs.last_modified(&path),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no location set")),
        }
    }

    fn describe(&self) -> String {
        self.uri.clone().unwrap_or_else(|| "<unset>".to_string())
    }
}

/// Timestamp detector over a [`FileSystem`].
pub type VfsReloadingDetector = FileReloadingDetector<VfsLocator>;

impl FileReloadingDetector<VfsLocator> {
    /// Create a detector for `uri` inside `fs` with the default refresh delay.
    pub fn for_uri(fs: Arc<dyn FileSystem>, uri: impl Into<String>) -> Self {
        Self::with_locator(VfsLocator::new(fs, uri))
    }

    /// Resolves the monitored resource.
    ///
    /// Polling degrades resolution failures to "no change"; this method is
    /// the explicit step that surfaces them.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::UnresolvableResource`] for a URI the file system
    /// cannot resolve.
    pub fn resolve_file(&self) -> Result<Option<VfsPath>, ReloadError> {
        self.locator().resolve()
    }
}
