//! Fixed-rate task scheduling for periodic triggers.
//!
//! [`Scheduler`] is the seam between [`PeriodicReloadingTrigger`] and
//! whatever runs its checks. [`ThreadScheduler`] runs every task on a
//! dedicated background thread and cancels cooperatively: a cancelled task
//! finishes its current run and is not started again.
//!
//! [`PeriodicReloadingTrigger`]: super::PeriodicReloadingTrigger

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;
use tracing::debug;

use super::types::ReloadError;

/// A task body run by a scheduler.
pub type Task = Arc<dyn Fn() + Send + Sync + 'static>;

/// Runs tasks repeatedly at a fixed rate.
pub trait Scheduler: Send + Sync {
    /// Schedules `task` to run after `initial_delay` and then every `period`.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadError::SchedulerShutdown`] after [`shutdown`](Self::shutdown),
    /// [`ReloadError::InvalidArgument`] for a zero period and
    /// [`ReloadError::Scheduler`] if the task could not be started.
    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<ScheduledTask, ReloadError>;

    /// Cancels every scheduled task and rejects new ones.
    fn shutdown(&self);

    /// Returns whether [`shutdown`](Self::shutdown) was called.
    fn is_shutdown(&self) -> bool;
}

/// Handle to a scheduled task.
///
/// Dropping the handle leaves the task running; call [`cancel`](Self::cancel)
/// to stop it.
pub struct ScheduledTask {
    cancel: Box<dyn FnOnce() + Send + 'static>,
}

impl ScheduledTask {
    /// Create a handle whose cancellation runs `cancel`.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Box::new(cancel),
        }
    }

    /// Cancels the task. An execution already in progress is not interrupted.
    pub fn cancel(self) {
        (self.cancel)();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask").finish_non_exhaustive()
    }
}

struct Worker {
    cancel_tx: Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct SchedulerState {
    workers: Vec<Worker>,
    shutdown: bool,
}

/// [`Scheduler`] with one background thread per task.
///
/// Runs are spaced by `period` measured from the scheduled start times, so a
/// slow run shortens the following pause instead of shifting the schedule.
#[derive(Clone, Default)]
pub struct ThreadScheduler {
    state: Arc<Mutex<SchedulerState>>,
}

impl ThreadScheduler {
    /// Create a scheduler with no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        let mut state = self.state.lock();
        state.workers.retain(|worker| !worker.handle.is_finished());
        state.workers.len()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_at_fixed_rate(
        &self,
        task: Task,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<ScheduledTask, ReloadError> {
        if period.is_zero() {
            return Err(ReloadError::invalid_argument("period must be greater than zero"));
        }

        let mut state = self.state.lock();
        if state.shutdown {
            return Err(ReloadError::SchedulerShutdown);
        }

        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("reconf-trigger".to_string())
            .spawn(move || {
                let mut next = Instant::now() + initial_delay;
                loop {
                    let wait = next.saturating_duration_since(Instant::now());
                    match cancel_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    task();
                    next += period;
                }
                debug!("Scheduled task finished");
            })
            .map_err(|e| ReloadError::scheduler("failed to spawn trigger thread", Some(e)))?;

        state.workers.retain(|worker| !worker.handle.is_finished());
        state.workers.push(Worker {
            cancel_tx: cancel_tx.clone(),
            handle,
        });

        Ok(ScheduledTask::new(move || {
            let _ = cancel_tx.try_send(());
        }))
    }

    fn shutdown(&self) {
        let workers = {
            let mut state = self.state.lock();
            state.shutdown = true;
            std::mem::take(&mut state.workers)
        };

        for worker in &workers {
            let _ = worker.cancel_tx.try_send(());
        }
        debug!(tasks = workers.len(), "Scheduler shut down");
    }

    fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }
}

impl std::fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ThreadScheduler")
            .field("tasks", &state.workers.len())
            .field("shutdown", &state.shutdown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task() -> (Task, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task: Task = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (task, runs)
    }

    #[test]
    fn test_task_runs_repeatedly() {
        let scheduler = ThreadScheduler::new();
        let (task, runs) = counting_task();

        let handle = scheduler
            .schedule_at_fixed_rate(task, Duration::ZERO, Duration::from_millis(10))
            .unwrap();
        thread::sleep(Duration::from_millis(150));
        handle.cancel();

        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_cancel_stops_task() {
        let scheduler = ThreadScheduler::new();
        let (task, runs) = counting_task();

        let handle = scheduler
            .schedule_at_fixed_rate(task, Duration::from_secs(60), Duration::from_secs(60))
            .unwrap();
        handle.cancel();
        thread::sleep(Duration::from_millis(50));

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn test_shutdown_rejects_new_tasks() {
        let scheduler = ThreadScheduler::new();
        let (task, runs) = counting_task();
        scheduler
            .schedule_at_fixed_rate(task.clone(), Duration::from_secs(60), Duration::from_secs(60))
            .unwrap();

        scheduler.shutdown();
        assert!(scheduler.is_shutdown());

        let err = scheduler
            .schedule_at_fixed_rate(task, Duration::ZERO, Duration::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, ReloadError::SchedulerShutdown));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
