//! The reloading controller state machine.
//!
//! A controller wraps one [`ReloadingDetector`] and debounces it: the first
//! time the detector reports a change the controller enters *reloading
//! state*, notifies its listeners once, and then answers `true` without
//! consulting the detector until [`reset_reloading_state`] is called.
//!
//! [`reset_reloading_state`]: ReloadingControl::reset_reloading_state

use parking_lot::Mutex;
use tracing::debug;

use super::detector::ReloadingDetector;
use super::types::{ListenerId, Listeners, ReloadData, ReloadingEvent, ReloadingListener};

/// Common interface of [`ReloadingController`] and
/// [`CombinedReloadingController`](super::CombinedReloadingController).
///
/// The trait is object safe; triggers and configuration holders work with
/// `Arc<dyn ReloadingControl>`.
pub trait ReloadingControl: Send + Sync {
    /// Checks whether a reload is pending.
    ///
    /// Returns `true` while in reloading state. Otherwise asks the underlying
    /// detection logic; a positive answer switches into reloading state and
    /// notifies the listeners with `data`.
    fn check_for_reloading(&self, data: Option<&ReloadData>) -> bool;

    /// Leaves reloading state after the reload has been carried out.
    fn reset_reloading_state(&self);

    /// Records the current resource state as the baseline, whether or not a
    /// reload is pending.
    ///
    /// Call this once after the initial load so that a stale baseline does
    /// not cause a reload right away. The default only performs
    /// [`reset_reloading_state`](Self::reset_reloading_state).
    fn reset_initial_reloading_state(&self) {
        self.reset_reloading_state();
    }

    /// Returns whether a reload is pending.
    fn is_in_reloading_state(&self) -> bool;

    /// Registers a listener called on every transition into reloading state.
    fn add_listener(&self, listener: ReloadingListener) -> ListenerId;

    /// Removes a listener. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}

struct ControllerState {
    detector: Box<dyn ReloadingDetector>,
    reloading: bool,
}

/// Debounced controller around a single detector.
///
/// The detector and the reloading flag sit behind one mutex, so a periodic
/// trigger and foreground callers can share a controller. Listeners run after
/// that mutex is released and may call back into the controller.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use reconf::reloading::{
///     ManualReloadingDetector, ReloadingControl, ReloadingController, ReloadingEvent,
/// };
///
/// let detector = ManualReloadingDetector::new();
/// let controller = ReloadingController::new(detector.clone());
///
/// let events = Arc::new(AtomicUsize::new(0));
/// let counter = events.clone();
/// controller.add_listener(Arc::new(move |_event: &ReloadingEvent<'_>| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// detector.trigger();
/// assert!(controller.check_for_reloading(None));
/// assert!(controller.check_for_reloading(None));
/// assert_eq!(events.load(Ordering::SeqCst), 1);
///
/// controller.reset_reloading_state();
/// assert!(!controller.is_in_reloading_state());
/// ```
pub struct ReloadingController {
    state: Mutex<ControllerState>,
    listeners: Listeners,
}

impl ReloadingController {
    /// Create a controller owning `detector`.
    pub fn new(detector: impl ReloadingDetector + 'static) -> Self {
        Self::from_boxed(Box::new(detector))
    }

    /// Create a controller from an already boxed detector.
    pub fn from_boxed(detector: Box<dyn ReloadingDetector>) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                detector,
                reloading: false,
            }),
            listeners: Listeners::default(),
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ReloadingControl for ReloadingController {
    fn check_for_reloading(&self, data: Option<&ReloadData>) -> bool {
        {
            let mut state = self.state.lock();
            if state.reloading {
                return true;
            }
            if !state.detector.is_reloading_required() {
                return false;
            }
            state.reloading = true;
        }

        debug!("Controller entered reloading state");
        self.listeners.fire(&ReloadingEvent::new(self, data));
        true
    }

    fn reset_reloading_state(&self) {
        let mut state = self.state.lock();
        if state.reloading {
            state.detector.reloading_performed();
            state.reloading = false;
            debug!("Controller reloading state reset");
        }
    }

    fn reset_initial_reloading_state(&self) {
        let mut state = self.state.lock();
        state.detector.reloading_performed();
        state.reloading = false;
    }

    fn is_in_reloading_state(&self) -> bool {
        self.state.lock().reloading
    }

    fn add_listener(&self, listener: ReloadingListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl std::fmt::Debug for ReloadingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadingController")
            .field("in_reloading_state", &self.is_in_reloading_state())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
