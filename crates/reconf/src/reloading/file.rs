//! Timestamp-based change detection.
//!
//! [`FileReloadingDetector`] compares the modification time reported by a
//! [`ResourceLocator`] against a recorded baseline. Checks are rate limited:
//! within one refresh delay after the previous check the resource is not
//! touched at all and "no change" is reported.

use std::path::Path;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, warn};

use super::defaults::DEFAULT_REFRESH_DELAY;
use super::detector::ReloadingDetector;
use super::locator::{FileLocator, ResourceLocator};

/// Detector that watches the modification time of a resource.
///
/// The baseline starts out empty; an empty baseline is older than any
/// modification time, so call [`refresh`](Self::refresh) after the initial
/// load to avoid an immediate reload.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use reconf::reloading::{FileReloadingDetector, ReloadingController};
///
/// let mut detector = FileReloadingDetector::builder()
///     .path("config/app.properties")
///     .refresh_delay(Duration::from_secs(1))
///     .build();
/// detector.refresh();
///
/// let controller = ReloadingController::new(detector);
/// ```
#[derive(Debug)]
pub struct FileReloadingDetector<L = FileLocator> {
    locator: L,
    refresh_delay: Duration,
    last_modified: Option<SystemTime>,
    last_checked: Instant,
}

impl FileReloadingDetector<FileLocator> {
    /// Create a detector for a file with the default refresh delay.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_locator(FileLocator::new(path))
    }

    /// Create a detector from a location string (path, `file:` or archive URL).
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        Self::with_locator(FileLocator::from_location(location))
    }

    /// Start building a file detector.
    #[must_use]
    pub fn builder() -> FileReloadingDetectorBuilder {
        FileReloadingDetectorBuilder::new()
    }

    /// The monitored file, if the location resolved to one.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.locator.path()
    }
}

impl<L: ResourceLocator> FileReloadingDetector<L> {
    /// Create a detector over an arbitrary locator with the default refresh delay.
    pub fn with_locator(locator: L) -> Self {
        Self::with_locator_and_delay(locator, DEFAULT_REFRESH_DELAY)
    }

    /// Create a detector over an arbitrary locator.
    pub fn with_locator_and_delay(locator: L, refresh_delay: Duration) -> Self {
        Self {
            locator,
            refresh_delay,
            last_modified: None,
            last_checked: Instant::now(),
        }
    }

    /// The locator consulted by this detector.
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Minimum time between two resource checks.
    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// The recorded baseline.
    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Records the current modification time as the baseline.
    ///
    /// Does not count as a check, so the rate limit window is unaffected.
    pub fn refresh(&mut self) {
        self.last_modified = self.current_modification();
    }

    /// Current modification time, `None` if the resource is missing or
    /// cannot be inspected.
    fn current_modification(&self) -> Option<SystemTime> {
        match self.locator.exists() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => {
                warn!(
                    resource = %self.locator.describe(),
                    error = %err,
                    "Existence check failed, treating resource as missing"
                );
                return None;
            }
        }

        match self.locator.last_modified() {
            Ok(time) => Some(time),
            Err(err) => {
                warn!(
                    resource = %self.locator.describe(),
                    error = %err,
                    "Unable to read modification time"
                );
                None
            }
        }
    }
}

impl<L: ResourceLocator> ReloadingDetector for FileReloadingDetector<L> {
    fn is_reloading_required(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_checked) <= self.refresh_delay {
            return false;
        }
        self.last_checked = now;

        let changed = match (self.current_modification(), self.last_modified) {
            (Some(current), Some(baseline)) => current > baseline,
            (Some(_), None) => true,
            (None, _) => false,
        };

        debug!(
            resource = %self.locator.describe(),
            changed,
            "Checked resource for changes"
        );
        changed
    }

    fn reloading_performed(&mut self) {
        self.refresh();
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`FileReloadingDetector`].
///
/// Defaults:
/// - no location (the detector never reports a change)
/// - refresh delay of 5 seconds
#[derive(Debug, Clone)]
pub struct FileReloadingDetectorBuilder {
    locator: Option<FileLocator>,
    refresh_delay: Duration,
}

impl FileReloadingDetectorBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locator: None,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }

    /// Monitor a file system path.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.locator = Some(FileLocator::new(path));
        self
    }

    /// Monitor a location string (path, `file:` or archive URL).
    #[must_use]
    pub fn location(mut self, location: &str) -> Self {
        self.locator = Some(FileLocator::from_location(location));
        self
    }

    /// Set the minimum time between two checks (default: 5s).
    #[must_use]
    pub const fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Build the detector. The baseline is left empty.
    #[must_use]
    pub fn build(self) -> FileReloadingDetector {
        let locator = self
            .locator
            .unwrap_or_else(|| FileLocator::from_location(""));
        FileReloadingDetector::with_locator_and_delay(locator, self.refresh_delay)
    }
}

impl Default for FileReloadingDetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
