//! Aggregation of several controllers.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;
use tracing::debug;

use super::controller::ReloadingControl;
use super::types::{ListenerId, Listeners, ReloadData, ReloadingEvent, ReloadingListener};

/// Controller whose detection result is the OR of a fixed set of child
/// controllers.
///
/// Every child is queried on each check, even after one of them reported a
/// change, so that each child's own rate limiting and state advance
/// independently. Children always receive `None` as data; the data passed to
/// the combined controller only reaches its own listeners.
///
/// Children are any [`ReloadingControl`], so combinations nest. They are
/// copied at construction and cannot be changed afterwards. An empty set of
/// children is allowed and never reports a change.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use reconf::reloading::{
///     CombinedReloadingController, ManualReloadingDetector, ReloadingControl,
///     ReloadingController,
/// };
///
/// let detector = ManualReloadingDetector::new();
/// let inner: Arc<dyn ReloadingControl> = Arc::new(CombinedReloadingController::new([
///     Arc::new(ReloadingController::new(detector.clone())) as Arc<dyn ReloadingControl>,
/// ]));
/// let outer = CombinedReloadingController::new([inner]);
///
/// detector.trigger();
/// assert!(outer.check_for_reloading(None));
/// ```
pub struct CombinedReloadingController {
    children: Arc<[Arc<dyn ReloadingControl>]>,
    reloading: ReentrantMutex<Cell<bool>>,
    listeners: Listeners,
}

impl CombinedReloadingController {
    /// Create a combined controller over `children`.
    pub fn new(children: impl IntoIterator<Item = Arc<dyn ReloadingControl>>) -> Self {
        Self {
            children: children.into_iter().collect(),
            reloading: ReentrantMutex::new(Cell::new(false)),
            listeners: Listeners::default(),
        }
    }

    /// The child controllers in construction order.
    #[must_use]
    pub fn sub_controllers(&self) -> &[Arc<dyn ReloadingControl>] {
        &self.children
    }
}

impl ReloadingControl for CombinedReloadingController {
    fn check_for_reloading(&self, data: Option<&ReloadData>) -> bool {
        {
            let guard = self.reloading.lock();
            if guard.get() {
                return true;
            }

            let mut changed = false;
            for child in self.children.iter() {
                // No short-circuit: every child must see the check
                changed |= child.check_for_reloading(None);
            }
            if !changed {
                return false;
            }
            guard.set(true);
        }

        debug!(
            children = self.children.len(),
            "Combined controller entered reloading state"
        );
        self.listeners.fire(&ReloadingEvent::new(self, data));
        true
    }

    fn reset_reloading_state(&self) {
        let guard = self.reloading.lock();
        guard.set(false);
        for child in self.children.iter() {
            child.reset_reloading_state();
        }
    }

    /// Clears its own flag and passes the unconditional reset on to every
    /// child.
    fn reset_initial_reloading_state(&self) {
        let guard = self.reloading.lock();
        guard.set(false);
        for child in self.children.iter() {
            child.reset_initial_reloading_state();
        }
    }

    fn is_in_reloading_state(&self) -> bool {
        self.reloading.lock().get()
    }

    fn add_listener(&self, listener: ReloadingListener) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl std::fmt::Debug for CombinedReloadingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReloadingController")
            .field("children", &self.children.len())
            .field("in_reloading_state", &self.is_in_reloading_state())
            .finish_non_exhaustive()
    }
}
