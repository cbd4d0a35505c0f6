//! The [`ReloadingDetector`] capability and the manual detector.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether a monitored resource changed.
///
/// A detector is owned by one [`ReloadingController`](super::ReloadingController),
/// which serialises all calls, so implementations can keep plain mutable
/// state.
pub trait ReloadingDetector: Send {
    /// Returns `true` if the resource changed since the last recorded baseline.
    ///
    /// Must not panic; resource access failures count as "no change".
    fn is_reloading_required(&mut self) -> bool;

    /// Records the current state of the resource as the new baseline.
    fn reloading_performed(&mut self);
}

impl<D: ReloadingDetector + ?Sized> ReloadingDetector for Box<D> {
    fn is_reloading_required(&mut self) -> bool {
        (**self).is_reloading_required()
    }

    fn reloading_performed(&mut self) {
        (**self).reloading_performed();
    }
}

/// Detector driven by an explicit flag.
///
/// Clones share the flag, so keep a clone to trigger reloads after moving
/// the detector into a controller.
///
/// ```rust
/// use reconf::reloading::{ManualReloadingDetector, ReloadingControl, ReloadingController};
///
/// let detector = ManualReloadingDetector::new();
/// let controller = ReloadingController::new(detector.clone());
///
/// assert!(!controller.check_for_reloading(None));
/// detector.trigger();
/// assert!(controller.check_for_reloading(None));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualReloadingDetector {
    flag: Arc<AtomicBool>,
}

impl ManualReloadingDetector {
    /// Create a detector with the flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the resource as changed.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Same as [`trigger`](Self::trigger).
    pub fn refresh(&self) {
        self.trigger();
    }

    /// Returns the current flag without consuming it.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl ReloadingDetector for ManualReloadingDetector {
    fn is_reloading_required(&mut self) -> bool {
        self.is_triggered()
    }

    fn reloading_performed(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_detector_cycle() {
        let mut detector = ManualReloadingDetector::new();
        assert!(!detector.is_reloading_required());

        detector.refresh();
        assert!(detector.is_reloading_required());
        // Reading does not consume the flag
        assert!(detector.is_reloading_required());

        detector.reloading_performed();
        assert!(!detector.is_reloading_required());
    }

    #[test]
    fn test_manual_detector_clones_share_flag() {
        let handle = ManualReloadingDetector::new();
        let mut owned = handle.clone();

        handle.trigger();
        assert!(owned.is_reloading_required());

        owned.reloading_performed();
        assert!(!handle.is_triggered());
    }
}
