//! Configuration values that reload themselves.
//!
//! [`ReloadingConfig`] ties a loader closure to a [`ReloadingControl`].
//! Every [`get`](ReloadingConfig::get) asks the controller whether a reload
//! is pending and, if so, runs the loader and swaps in the new value before
//! returning. Combine it with a
//! [`PeriodicReloadingTrigger`](super::PeriodicReloadingTrigger) to move the
//! detection work off the access path.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::controller::{ReloadingControl, ReloadingController};
use super::defaults::DEFAULT_REFRESH_DELAY;
use super::detector::ReloadingDetector;
use super::file::FileReloadingDetector;
use super::types::{ChangeTrigger, ConfigChange, ReloadError};
use crate::Error;

/// Callback type for configuration changes.
pub type ChangeCallback<T> = Box<dyn Fn(ConfigChange<T>) + Send + Sync + 'static>;

/// Callback type for failed reloads.
pub type ErrorCallback = Box<dyn Fn(&Error) + Send + Sync + 'static>;

type Loader<T> = Box<dyn Fn() -> Result<T, Error> + Send + Sync + 'static>;

/// A configuration value kept up to date by a reloading controller.
///
/// Reads are cheap: the value is held as an `Arc<T>` behind a read-write
/// lock, and callers holding an old `Arc` keep a consistent snapshot across
/// reloads.
///
/// A failing reload keeps the last good value. The controller stays in
/// reloading state, so the next access tries again.
///
/// # Example
///
/// ```rust,no_run
/// use reconf::reloading::ReloadingConfig;
///
/// let config = ReloadingConfig::builder()
///     .file("config/app.properties")
///     .on_change(|change| println!("reloaded, epoch {}", change.epoch))
///     .build(|| {
///         std::fs::read_to_string("config/app.properties").map_err(reconf::Error::from)
///     })?;
///
/// let text = config.get();
/// println!("{} bytes", text.len());
/// # Ok::<(), reconf::Error>(())
/// ```
pub struct ReloadingConfig<T> {
    current: RwLock<Arc<T>>,
    epoch: AtomicU64,
    controller: Arc<dyn ReloadingControl>,
    loader: Loader<T>,
    on_change: Option<ChangeCallback<T>>,
    on_error: Option<ErrorCallback>,
    reload_lock: Mutex<()>,
}

impl<T: Send + Sync + 'static> ReloadingConfig<T> {
    /// Start building a reloading configuration.
    #[must_use]
    pub fn builder() -> ReloadingConfigBuilder<T> {
        ReloadingConfigBuilder::new()
    }

    /// Returns the current value, reloading first if a change is pending.
    ///
    /// Reload failures are logged and reported to the error callback; the
    /// previous value is returned in that case.
    pub fn get(&self) -> Arc<T> {
        if self.controller.check_for_reloading(None) {
            let _guard = self.reload_lock.lock();
            // Another caller may have finished the reload while we waited
            if self.controller.is_in_reloading_state()
                && self.load(ChangeTrigger::Detected).is_ok()
            {
                self.controller.reset_reloading_state();
            }
        }
        self.current()
    }

    /// Returns the current value without consulting the controller.
    #[must_use]
    pub fn current(&self) -> Arc<T> {
        self.current.read().clone()
    }

    /// Reads the current value via a closure, without consulting the controller.
    pub fn read<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.current.read();
        f(&**guard)
    }

    /// Loads the value now, regardless of the controller.
    ///
    /// A pending reload is cleared on success.
    ///
    /// # Errors
    ///
    /// Returns the loader's error. The previous value is kept.
    pub fn reload(&self) -> Result<Arc<T>, Error> {
        let _guard = self.reload_lock.lock();
        let value = self.load(ChangeTrigger::ManualReload)?;
        self.controller.reset_reloading_state();
        Ok(value)
    }

    /// Number of successful reloads since construction.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Returns whether the value was replaced since `epoch`.
    #[must_use]
    pub fn has_changed_since(&self, epoch: u64) -> bool {
        self.epoch() != epoch
    }

    /// The controller deciding when to reload.
    ///
    /// Hand a clone to a [`PeriodicReloadingTrigger`](super::PeriodicReloadingTrigger)
    /// to run the checks in the background.
    #[must_use]
    pub fn controller(&self) -> &Arc<dyn ReloadingControl> {
        &self.controller
    }

    /// Runs the loader and installs the result. Caller holds `reload_lock`.
    fn load(&self, trigger: ChangeTrigger) -> Result<Arc<T>, Error> {
        let new = match (self.loader)() {
            Ok(value) => Arc::new(value),
            Err(err) => {
                warn!(trigger = %trigger, error = %err, "Configuration reload failed, keeping previous value");
                if let Some(callback) = &self.on_error {
                    callback(&err);
                }
                return Err(err);
            }
        };

        let old = {
            let mut guard = self.current.write();
            std::mem::replace(&mut *guard, new.clone())
        };
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(trigger = %trigger, epoch, "Configuration reloaded");

        if let Some(callback) = &self.on_change {
            callback(ConfigChange::new(old, new.clone(), epoch, trigger));
        }
        Ok(new)
    }
}

// Manual Debug impl to avoid T: Debug bound
impl<T> std::fmt::Debug for ReloadingConfig<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadingConfig")
            .field("epoch", &self.epoch.load(Ordering::Acquire))
            .field("reload_pending", &self.controller.is_in_reloading_state())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

enum ControlSource {
    Unset,
    Controller(Arc<dyn ReloadingControl>),
    Detector(Box<dyn ReloadingDetector>),
    File(PathBuf),
}

/// Builder for [`ReloadingConfig`].
///
/// Exactly one of [`controller`](Self::controller),
/// [`detector`](Self::detector) or [`file`](Self::file) must be given; the
/// last call wins.
pub struct ReloadingConfigBuilder<T> {
    source: ControlSource,
    refresh_delay: Duration,
    on_change: Option<ChangeCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T: Send + Sync + 'static> ReloadingConfigBuilder<T> {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: ControlSource::Unset,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            on_change: None,
            on_error: None,
        }
    }

    /// Use an existing controller. Its state is left untouched.
    #[must_use]
    pub fn controller(mut self, controller: Arc<dyn ReloadingControl>) -> Self {
        self.source = ControlSource::Controller(controller);
        self
    }

    /// Wrap a detector in a new controller.
    ///
    /// The detector records its baseline right after the initial load.
    #[must_use]
    pub fn detector(mut self, detector: impl ReloadingDetector + 'static) -> Self {
        self.source = ControlSource::Detector(Box::new(detector));
        self
    }

    /// Watch a file with a [`FileReloadingDetector`].
    ///
    /// The file's modification time right after the initial load becomes the
    /// baseline.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ControlSource::File(path.into());
        self
    }

    /// Refresh delay for [`file`](Self::file) (default: 5s).
    #[must_use]
    pub const fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Register a callback for successful reloads.
    #[must_use]
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(ConfigChange<T>) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Register a callback for failed reloads.
    #[must_use]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Performs the initial load and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidArgument`] (wrapped in [`Error`]) if no
    /// controller, detector or file was configured, and the loader's error if
    /// the initial load fails.
    pub fn build<F>(self, loader: F) -> Result<ReloadingConfig<T>, Error>
    where
        F: Fn() -> Result<T, Error> + Send + Sync + 'static,
    {
        // Controllers built here get their baseline recorded after the initial load
        let (controller, owned): (Arc<dyn ReloadingControl>, Option<Arc<ReloadingController>>) =
            match self.source {
                ControlSource::Unset => {
                    return Err(ReloadError::invalid_argument(
                        "a controller, detector or file must be configured",
                    )
                    .into());
                }
                ControlSource::Controller(controller) => (controller, None),
                ControlSource::Detector(detector) => {
                    let owned = Arc::new(ReloadingController::from_boxed(detector));
                    (owned.clone() as Arc<dyn ReloadingControl>, Some(owned))
                }
                ControlSource::File(path) => {
                    let detector = FileReloadingDetector::builder()
                        .path(path)
                        .refresh_delay(self.refresh_delay)
                        .build();
                    let owned = Arc::new(ReloadingController::new(detector));
                    (owned.clone() as Arc<dyn ReloadingControl>, Some(owned))
                }
            };

        let initial = loader()?;
        if let Some(owned) = owned {
            owned.reset_initial_reloading_state();
        }

        Ok(ReloadingConfig {
            current: RwLock::new(Arc::new(initial)),
            epoch: AtomicU64::new(0),
            controller,
            loader: Box::new(loader),
            on_change: self.on_change,
            on_error: self.on_error,
            reload_lock: Mutex::new(()),
        })
    }
}

impl<T: Send + Sync + 'static> Default for ReloadingConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
