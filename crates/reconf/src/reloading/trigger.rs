//! Periodic reload checks.
//!
//! [`PeriodicReloadingTrigger`] calls `check_for_reloading` on a controller
//! at a fixed rate from a [`Scheduler`]. The result of each check is
//! discarded; consumers react through the controller's listeners or by
//! inspecting its state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use super::controller::ReloadingControl;
use super::defaults::DEFAULT_TRIGGER_PERIOD;
use super::scheduler::{ScheduledTask, Scheduler, ThreadScheduler, Task};
use super::types::{ReloadData, ReloadError};

struct TriggerState {
    scheduler: Option<Arc<dyn Scheduler>>,
    owns_scheduler: bool,
    task: Option<ScheduledTask>,
}

/// Drives a controller from a background scheduler.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use reconf::reloading::{ManualReloadingDetector, PeriodicReloadingTrigger, ReloadingController};
///
/// let controller = Arc::new(ReloadingController::new(ManualReloadingDetector::new()));
/// let trigger = PeriodicReloadingTrigger::builder(controller)
///     .period(Duration::from_secs(1))
///     .build()?;
///
/// trigger.start()?;
/// assert!(trigger.is_running());
/// trigger.shutdown();
/// assert!(!trigger.is_running());
/// # Ok::<(), reconf::reloading::ReloadError>(())
/// ```
pub struct PeriodicReloadingTrigger {
    controller: Arc<dyn ReloadingControl>,
    param: Option<ReloadData>,
    period: Duration,
    state: Mutex<TriggerState>,
}

impl PeriodicReloadingTrigger {
    /// Start building a trigger for `controller`.
    pub fn builder(controller: Arc<dyn ReloadingControl>) -> PeriodicReloadingTriggerBuilder {
        PeriodicReloadingTriggerBuilder::new(controller)
    }

    /// The controller being driven.
    #[must_use]
    pub fn controller(&self) -> &Arc<dyn ReloadingControl> {
        &self.controller
    }

    /// Time between two checks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns whether a check task is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().task.is_some()
    }

    /// Schedules the periodic check. The first check runs after one period.
    ///
    /// Does nothing if the trigger is already running. Without an explicit
    /// scheduler a [`ThreadScheduler`] is created on first use and owned by
    /// the trigger.
    ///
    /// # Errors
    ///
    /// Returns the scheduler's error, e.g. [`ReloadError::SchedulerShutdown`]
    /// when the trigger is restarted on a scheduler that was shut down.
    pub fn start(&self) -> Result<(), ReloadError> {
        let mut state = self.state.lock();
        if state.task.is_some() {
            return Ok(());
        }

        let scheduler = match &state.scheduler {
            Some(scheduler) => scheduler.clone(),
            None => {
                let scheduler: Arc<dyn Scheduler> = Arc::new(ThreadScheduler::new());
                state.scheduler = Some(scheduler.clone());
                state.owns_scheduler = true;
                scheduler
            }
        };

        let controller = self.controller.clone();
        let param = self.param.clone();
        let task: Task = Arc::new(move || {
            controller.check_for_reloading(param.as_ref());
        });

        state.task = Some(scheduler.schedule_at_fixed_rate(task, self.period, self.period)?);
        info!(period_ms = self.period.as_millis(), "Periodic reloading trigger started");
        Ok(())
    }

    /// Cancels the periodic check. A check in progress is allowed to finish.
    ///
    /// Safe to call when the trigger is not running.
    pub fn stop(&self) {
        let task = self.state.lock().task.take();
        if let Some(task) = task {
            task.cancel();
            info!("Periodic reloading trigger stopped");
        }
    }

    /// Stops the trigger and shuts down the scheduler if the trigger created
    /// it. An externally supplied scheduler keeps running.
    pub fn shutdown(&self) {
        let owns = self.state.lock().owns_scheduler;
        self.shutdown_with(owns);
    }

    /// Stops the trigger and, if `stop_scheduler` is set, shuts down the
    /// scheduler whether or not the trigger created it.
    pub fn shutdown_with(&self, stop_scheduler: bool) {
        self.stop();
        if !stop_scheduler {
            return;
        }

        let scheduler = self.state.lock().scheduler.clone();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown();
        }
    }
}

impl std::fmt::Debug for PeriodicReloadingTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PeriodicReloadingTrigger")
            .field("period", &self.period)
            .field("running", &state.task.is_some())
            .field("owns_scheduler", &state.owns_scheduler)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`PeriodicReloadingTrigger`].
///
/// Defaults:
/// - period of 5 seconds
/// - no parameter
/// - a lazily created [`ThreadScheduler`] owned by the trigger
pub struct PeriodicReloadingTriggerBuilder {
    controller: Arc<dyn ReloadingControl>,
    param: Option<ReloadData>,
    period: Duration,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl PeriodicReloadingTriggerBuilder {
    fn new(controller: Arc<dyn ReloadingControl>) -> Self {
        Self {
            controller,
            param: None,
            period: DEFAULT_TRIGGER_PERIOD,
            scheduler: None,
        }
    }

    /// Set the time between two checks (default: 5s).
    #[must_use]
    pub const fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the data passed to every `check_for_reloading` call.
    #[must_use]
    pub fn param(mut self, param: ReloadData) -> Self {
        self.param = Some(param);
        self
    }

    /// Run checks on an externally managed scheduler.
    ///
    /// [`PeriodicReloadingTrigger::shutdown`] leaves this scheduler running.
    #[must_use]
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Build the trigger. It is not started.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::InvalidArgument`] for a zero period.
    pub fn build(self) -> Result<PeriodicReloadingTrigger, ReloadError> {
        if self.period.is_zero() {
            return Err(ReloadError::invalid_argument(
                "trigger period must be greater than zero",
            ));
        }

        Ok(PeriodicReloadingTrigger {
            controller: self.controller,
            param: self.param,
            period: self.period,
            state: Mutex::new(TriggerState {
                scheduler: self.scheduler,
                owns_scheduler: false,
                task: None,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reloading::{ManualReloadingDetector, ReloadingController};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scheduler recording calls without running anything.
    #[derive(Default)]
    struct RecordingScheduler {
        scheduled: Mutex<Vec<(Task, Duration, Duration)>>,
        cancelled: Arc<AtomicUsize>,
        shutdown: AtomicBool,
    }

    impl Scheduler for RecordingScheduler {
        fn schedule_at_fixed_rate(
            &self,
            task: Task,
            initial_delay: Duration,
            period: Duration,
        ) -> Result<ScheduledTask, ReloadError> {
            self.scheduled.lock().push((task, initial_delay, period));
            let cancelled = self.cancelled.clone();
            Ok(ScheduledTask::new(move || {
                cancelled.fetch_add(1, Ordering::SeqCst);
            }))
        }

        fn shutdown(&self) {
            self.shutdown.store(true, Ordering::SeqCst);
        }

        fn is_shutdown(&self) -> bool {
            self.shutdown.load(Ordering::SeqCst)
        }
    }

    fn controller() -> Arc<dyn ReloadingControl> {
        Arc::new(ReloadingController::new(ManualReloadingDetector::new()))
    }

    #[test]
    fn test_zero_period_is_rejected() {
        let err = PeriodicReloadingTrigger::builder(controller())
            .period(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ReloadError::InvalidArgument { .. }));
    }

    #[test]
    fn test_start_is_idempotent() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let trigger = PeriodicReloadingTrigger::builder(controller())
            .period(Duration::from_secs(2))
            .scheduler(scheduler.clone())
            .build()
            .unwrap();

        trigger.start().unwrap();
        trigger.start().unwrap();
        assert!(trigger.is_running());

        let scheduled = scheduler.scheduled.lock();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].1, Duration::from_secs(2));
        assert_eq!(scheduled[0].2, Duration::from_secs(2));
    }

    #[test]
    fn test_stop_when_not_running() {
        let trigger = PeriodicReloadingTrigger::builder(controller()).build().unwrap();
        trigger.stop();
        assert!(!trigger.is_running());
        assert_eq!(trigger.period(), DEFAULT_TRIGGER_PERIOD);
    }

    #[test]
    fn test_restart_after_stop() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let trigger = PeriodicReloadingTrigger::builder(controller())
            .scheduler(scheduler.clone())
            .build()
            .unwrap();

        trigger.start().unwrap();
        trigger.stop();
        trigger.start().unwrap();

        assert_eq!(scheduler.cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.scheduled.lock().len(), 2);
    }

    #[test]
    fn test_external_scheduler_survives_shutdown() {
        let scheduler = Arc::new(RecordingScheduler::default());
        let trigger = PeriodicReloadingTrigger::builder(controller())
            .scheduler(scheduler.clone())
            .build()
            .unwrap();

        trigger.start().unwrap();
        trigger.shutdown();
        assert!(!trigger.is_running());
        assert!(!scheduler.is_shutdown());

        trigger.shutdown_with(true);
        assert!(scheduler.is_shutdown());
    }
}
