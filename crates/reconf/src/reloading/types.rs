//! Core types for reload detection.
//!
//! This module contains the types shared across the reloading system:
//! - [`ReloadError`] - Errors raised by reloading components
//! - [`ReloadingEvent`] - Emitted when a controller enters reloading state
//! - [`ConfigChange`] - Emitted when a [`ReloadingConfig`](super::ReloadingConfig) swaps its value

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use miette::Diagnostic;
use parking_lot::RwLock;
use thiserror::Error;

use super::controller::ReloadingControl;

/// Opaque data passed to `check_for_reloading` and handed to listeners.
pub type ReloadData = Arc<dyn Any + Send + Sync>;

/// Listener invoked when a controller transitions into reloading state.
pub type ReloadingListener = Arc<dyn Fn(&ReloadingEvent<'_>) + Send + Sync + 'static>;

/// Error type for reload detection, controllers and triggers.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum ReloadError {
    /// A component was configured with an invalid value.
    #[error("invalid argument: {message}")]
    #[diagnostic(code(reconf::reload::invalid_argument))]
    InvalidArgument {
        /// Human-readable error message.
        message: String,
    },

    /// A resource location could not be resolved into something monitorable.
    #[error("unable to resolve resource '{location}': {message}")]
    #[diagnostic(
        code(reconf::reload::unresolvable_resource),
        help("Check the location URI; only resolvable file system locations can be monitored")
    )]
    UnresolvableResource {
        /// The location that could not be resolved.
        location: String,
        /// Human-readable error message.
        message: String,
    },

    /// The scheduler was shut down and accepts no further tasks.
    #[error("scheduler has been shut down")]
    #[diagnostic(
        code(reconf::reload::scheduler_shutdown),
        help("Create a new scheduler or trigger to resume periodic checks")
    )]
    SchedulerShutdown,

    /// The scheduler failed to start a task.
    #[error("failed to schedule task: {message}")]
    #[diagnostic(code(reconf::reload::scheduler))]
    Scheduler {
        /// Human-readable error message.
        message: String,
        /// The underlying I/O error, if available.
        #[source]
        source: Option<std::io::Error>,
    },
}

impl ReloadError {
    /// Create a new `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new `UnresolvableResource` error.
    pub fn unresolvable(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnresolvableResource {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a new `Scheduler` error.
    pub fn scheduler(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        Self::Scheduler {
            message: message.into(),
            source,
        }
    }
}

/// Event fired when a controller detects a pending reload.
///
/// The event borrows the controller that fired it and the data passed to
/// `check_for_reloading`.
pub struct ReloadingEvent<'a> {
    source: &'a dyn ReloadingControl,
    data: Option<&'a ReloadData>,
}

impl<'a> ReloadingEvent<'a> {
    pub(crate) fn new(source: &'a dyn ReloadingControl, data: Option<&'a ReloadData>) -> Self {
        Self { source, data }
    }

    /// The controller that fired this event.
    #[must_use]
    pub fn source(&self) -> &'a dyn ReloadingControl {
        self.source
    }

    /// Alias for [`source`](Self::source).
    #[must_use]
    pub fn controller(&self) -> &'a dyn ReloadingControl {
        self.source
    }

    /// The data passed to `check_for_reloading`, if any.
    #[must_use]
    pub fn data(&self) -> Option<&'a ReloadData> {
        self.data
    }

    /// The data downcast to a concrete type.
    #[must_use]
    pub fn data_as<T: Any>(&self) -> Option<&'a T> {
        self.data.and_then(|d| d.downcast_ref::<T>())
    }
}

impl std::fmt::Debug for ReloadingEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadingEvent")
            .field("in_reloading_state", &self.source.is_in_reloading_state())
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Identifies a registered listener so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry shared by the controller implementations.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: RwLock<Vec<(ListenerId, ReloadingListener)>>,
    next_id: AtomicU64,
}

impl Listeners {
    pub fn add(&self, listener: ReloadingListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Invokes every listener. The registry lock is not held during the
    /// calls, so listeners may register or remove listeners.
    pub fn fire(&self, event: &ReloadingEvent<'_>) {
        let snapshot: Vec<ReloadingListener> = self
            .entries
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }
}

/// What caused a [`ReloadingConfig`](super::ReloadingConfig) to reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeTrigger {
    /// The controller reported a pending reload.
    Detected,

    /// The value was reloaded via `reload()`.
    ManualReload,
}

impl std::fmt::Display for ChangeTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detected => write!(f, "change detected"),

            Self::ManualReload => write!(f, "manual reload"),
        }
    }
}

/// A configuration value was replaced.
///
/// Passed to change callbacks registered on a
/// [`ReloadingConfigBuilder`](super::ReloadingConfigBuilder).
#[derive(Debug, Clone)]
pub struct ConfigChange<T> {
    /// Value before the reload.
    pub old: Arc<T>,

    /// Value after the reload.
    pub new: Arc<T>,

    /// Epoch of the new value.
    pub epoch: u64,

    /// What triggered this change.
    pub trigger: ChangeTrigger,

    /// When the new value was installed.
    pub timestamp: Instant,
}

impl<T> ConfigChange<T> {
    /// Create a new change event.
    pub fn new(old: Arc<T>, new: Arc<T>, epoch: u64, trigger: ChangeTrigger) -> Self {
        Self {
            old,
            new,
            epoch,
            trigger,
            timestamp: Instant::now(),
        }
    }

    /// Returns `true` if the change came from `reload()`.
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        matches!(self.trigger, ChangeTrigger::ManualReload)
    }
}
