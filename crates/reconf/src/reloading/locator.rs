//! Resource locators consulted by timestamp detectors.
//!
//! A [`ResourceLocator`] answers two questions about a monitored resource:
//! does it exist, and when was it last modified. [`FileLocator`] implements
//! this for the local file system and understands `file:` URLs as well as
//! archive entries such as `jar:file:/opt/app/lib.jar!/config.xml`.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use url::Url;

/// Separator between an archive URL and the entry inside it.
const ARCHIVE_SEPARATOR: &str = "!/";

/// URL schemes whose locations point into an archive.
const ARCHIVE_SCHEMES: [&str; 3] = ["jar:", "zip:", "war:"];

/// Source of existence and modification information for a resource.
pub trait ResourceLocator: Send + Sync {
    /// Returns whether the resource currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check itself failed (for example a
    /// permission problem). Detectors treat this as "does not exist".
    fn exists(&self) -> io::Result<bool>;

    /// Returns the last modification time of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be inspected.
    fn last_modified(&self) -> io::Result<SystemTime>;

    /// Human-readable description for log messages.
    fn describe(&self) -> String;
}

/// Locator for a file on the local file system.
///
/// A locator without a file (an unresolvable location) never exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
    path: Option<PathBuf>,
    location: String,
}

impl FileLocator {
    /// Create a locator for a plain file system path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            location: path.display().to_string(),
            path: Some(path),
        }
    }

    /// Create a locator from a location string.
    ///
    /// Accepts plain paths, `file:` URLs and archive URLs. For archive URLs
    /// the archive file itself is monitored. Locations that do not map to a
    /// local file produce a locator without a file.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        Self {
            path: resolve_location(location),
            location: location.to_string(),
        }
    }

    /// The file being monitored, if the location resolved to one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The location this locator was created from.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl ResourceLocator for FileLocator {
    fn exists(&self) -> io::Result<bool> {
        match &self.path {
            Some(path) => path.try_exists(),
            None => Ok(false),
        }
    }

    fn last_modified(&self) -> io::Result<SystemTime> {
        match &self.path {
            Some(path) => std::fs::metadata(path)?.modified(),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no file for location '{}'", self.location),
            )),
        }
    }

    fn describe(&self) -> String {
        self.location.clone()
    }
}

/// Maps a location string to the local file that should be monitored.
pub(crate) fn resolve_location(location: &str) -> Option<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }

    if let Some(scheme) = ARCHIVE_SCHEMES
        .iter()
        .find(|scheme| starts_with_ignore_case(location, scheme))
    {
        let inner = &location[scheme.len()..];
        let archive = inner.find(ARCHIVE_SEPARATOR).map(|idx| &inner[..idx])?;
        return resolve_location(archive);
    }

    if starts_with_ignore_case(location, "file:") {
        return Url::parse(location).ok()?.to_file_path().ok();
    }

    // Some other URL scheme (http:, ftp:, ...) is not a local file. A single
    // letter before the colon is a Windows drive, not a scheme.
    if let Some(idx) = location.find(':')
        && idx > 1
        && location[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }

    Some(PathBuf::from(location))
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}
