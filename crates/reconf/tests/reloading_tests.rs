//! Integration tests for reload detection, controllers and triggers.

use std::fs;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use reconf::reloading::{
    CombinedReloadingController, FileReloadingDetector, ListenerId, ManualReloadingDetector,
    PeriodicReloadingTrigger, ReloadData, ReloadError, ReloadingConfig, ReloadingControl,
    ReloadingController, ReloadingDetector, ReloadingEvent, ReloadingListener, ResourceLocator,
    ScheduledTask, Scheduler, Task,
};
use tempfile::tempdir;

// ============================================================================
// Test Doubles
// ============================================================================

/// Locator counting how often the resource is touched.
#[derive(Clone)]
struct CountingLocator {
    accesses: Arc<AtomicUsize>,
    modified: Arc<Mutex<SystemTime>>,
}

impl CountingLocator {
    fn new() -> Self {
        Self {
            accesses: Arc::new(AtomicUsize::new(0)),
            modified: Arc::new(Mutex::new(SystemTime::UNIX_EPOCH)),
        }
    }

    fn touch(&self) {
        let mut modified = self.modified.lock();
        *modified += Duration::from_secs(1);
    }
}

impl ResourceLocator for CountingLocator {
    fn exists(&self) -> io::Result<bool> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn last_modified(&self) -> io::Result<SystemTime> {
        Ok(*self.modified.lock())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// Detector with a scripted answer that counts its calls.
#[derive(Clone, Default)]
struct ScriptedDetector {
    answer: Arc<Mutex<bool>>,
    checks: Arc<AtomicUsize>,
    performed: Arc<AtomicUsize>,
}

impl ScriptedDetector {
    fn answering(answer: bool) -> Self {
        let detector = Self::default();
        *detector.answer.lock() = answer;
        detector
    }
}

impl ReloadingDetector for ScriptedDetector {
    fn is_reloading_required(&mut self) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        *self.answer.lock()
    }

    fn reloading_performed(&mut self) {
        self.performed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scheduler that records schedule calls instead of running anything.
#[derive(Default)]
struct RecordingScheduler {
    scheduled: AtomicUsize,
    cancelled: Arc<AtomicUsize>,
    shut_down: AtomicUsize,
}

impl Scheduler for RecordingScheduler {
    fn schedule_at_fixed_rate(
        &self,
        _task: Task,
        _initial_delay: Duration,
        _period: Duration,
    ) -> Result<ScheduledTask, ReloadError> {
        self.scheduled.fetch_add(1, Ordering::SeqCst);
        let cancelled = self.cancelled.clone();
        Ok(ScheduledTask::new(move || {
            cancelled.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn shutdown(&self) {
        self.shut_down.fetch_add(1, Ordering::SeqCst);
    }

    fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst) > 0
    }
}

// ============================================================================
// File Detector
// ============================================================================

#[test]
fn test_file_detector_reports_change_after_refresh_delay() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.properties");

    let mut detector = FileReloadingDetector::builder()
        .path(&path)
        .refresh_delay(Duration::from_millis(500))
        .build();

    fs::write(&path, "key = value\n").unwrap();

    // Inside the delay window since construction
    assert!(!detector.is_reloading_required());

    thread::sleep(Duration::from_millis(600));
    assert!(detector.is_reloading_required());

    detector.reloading_performed();
    assert!(!detector.is_reloading_required());
}

#[test]
fn test_rate_limit_touches_resource_once_per_window() {
    let locator = CountingLocator::new();
    let mut detector =
        FileReloadingDetector::with_locator_and_delay(locator.clone(), Duration::from_millis(200));
    detector.refresh();
    let after_refresh = locator.accesses.load(Ordering::SeqCst);

    locator.touch();
    thread::sleep(Duration::from_millis(250));

    let answers: Vec<bool> = (0..50).map(|_| detector.is_reloading_required()).collect();

    assert_eq!(locator.accesses.load(Ordering::SeqCst) - after_refresh, 1);
    assert!(answers[0], "first call in the window sees the change");
    assert!(
        answers[1..].iter().all(|answer| !answer),
        "later calls in the window are rate limited"
    );
}

#[test]
fn test_calls_inside_first_window_never_touch_resource() {
    let locator = CountingLocator::new();
    let mut detector =
        FileReloadingDetector::with_locator_and_delay(locator.clone(), Duration::from_secs(3600));

    let answers: Vec<bool> = (0..20).map(|_| detector.is_reloading_required()).collect();

    assert!(answers.iter().all(|answer| !answer));
    assert_eq!(locator.accesses.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_file_never_requires_reloading() {
    let dir = tempdir().unwrap();
    let mut detector = FileReloadingDetector::builder()
        .path(dir.path().join("never-created.conf"))
        .refresh_delay(Duration::ZERO)
        .build();
    detector.refresh();

    for _ in 0..5 {
        thread::sleep(Duration::from_millis(2));
        assert!(!detector.is_reloading_required());
    }
    assert!(detector.last_modified().is_none());
}

#[test]
fn test_unresolvable_location_never_requires_reloading() {
    let mut detector = FileReloadingDetector::builder()
        .location("http://example.com/app.properties")
        .refresh_delay(Duration::ZERO)
        .build();

    thread::sleep(Duration::from_millis(2));
    assert!(!detector.is_reloading_required());
    assert!(detector.file().is_none());
}

// ============================================================================
// Controllers
// ============================================================================

#[test]
fn test_controller_debounces_until_reset() {
    let detector = ScriptedDetector::answering(true);
    let controller = ReloadingController::new(detector.clone());
    let events = Arc::new(AtomicUsize::new(0));

    let counter = events.clone();
    controller.add_listener(Arc::new(move |_: &ReloadingEvent<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(controller.check_for_reloading(None));
    *detector.answer.lock() = false;
    for _ in 0..10 {
        assert!(controller.check_for_reloading(None));
    }

    assert_eq!(detector.checks.load(Ordering::SeqCst), 1);
    assert_eq!(events.load(Ordering::SeqCst), 1);

    controller.reset_reloading_state();
    assert!(!controller.is_in_reloading_state());
    assert_eq!(detector.performed.load(Ordering::SeqCst), 1);
    assert!(!controller.check_for_reloading(None));
    assert_eq!(detector.checks.load(Ordering::SeqCst), 2);
}

#[test]
fn test_reset_outside_reloading_state_is_a_no_op() {
    let detector = ScriptedDetector::answering(false);
    let controller = ReloadingController::new(detector.clone());

    controller.reset_reloading_state();
    assert!(!controller.check_for_reloading(None));
    controller.reset_reloading_state();

    assert_eq!(detector.performed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_listener_receives_data() {
    let controller = ReloadingController::new(ScriptedDetector::answering(true));
    let seen = Arc::new(Mutex::new(None));

    let sink = seen.clone();
    controller.add_listener(Arc::new(move |event: &ReloadingEvent<'_>| {
        *sink.lock() = event.data_as::<&'static str>().copied();
    }));

    let data: reconf::reloading::ReloadData = Arc::new("tick");
    controller.check_for_reloading(Some(&data));
    assert_eq!(*seen.lock(), Some("tick"));
}

/// Controller with a fixed answer that records the data it was asked with.
struct RecordingControl {
    answer: bool,
    calls: Mutex<Vec<bool>>,
    inner: ReloadingController,
}

impl RecordingControl {
    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: Mutex::new(Vec::new()),
            inner: ReloadingController::new(ManualReloadingDetector::new()),
        })
    }

    fn calls(&self) -> Vec<bool> {
        self.calls.lock().clone()
    }
}

impl ReloadingControl for RecordingControl {
    fn check_for_reloading(&self, data: Option<&ReloadData>) -> bool {
        self.calls.lock().push(data.is_some());
        self.answer
    }

    fn reset_reloading_state(&self) {
        self.inner.reset_reloading_state();
    }

    fn is_in_reloading_state(&self) -> bool {
        self.answer
    }

    fn add_listener(&self, listener: ReloadingListener) -> ListenerId {
        self.inner.add_listener(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.remove_listener(id)
    }
}

#[test]
fn test_combined_queries_every_child_once() {
    let children = [
        RecordingControl::answering(false),
        RecordingControl::answering(true),
        RecordingControl::answering(false),
    ];
    let combined = CombinedReloadingController::new(
        children
            .iter()
            .map(|child| Arc::clone(child) as Arc<dyn ReloadingControl>),
    );

    let data: ReloadData = Arc::new(1u8);
    assert!(combined.check_for_reloading(Some(&data)));
    for child in &children {
        // Queried exactly once, and without the caller's data
        assert_eq!(child.calls(), [false]);
    }
}

#[test]
fn test_combined_controllers_nest() {
    let detectors = [ScriptedDetector::answering(false), ScriptedDetector::answering(true)];
    let leaves: Vec<Arc<dyn ReloadingControl>> = detectors
        .iter()
        .map(|d| Arc::new(ReloadingController::new(d.clone())) as Arc<dyn ReloadingControl>)
        .collect();
    let inner: Arc<dyn ReloadingControl> = Arc::new(CombinedReloadingController::new(leaves));
    let outer = CombinedReloadingController::new([
        inner.clone(),
        RecordingControl::answering(false) as Arc<dyn ReloadingControl>,
    ]);

    assert!(outer.check_for_reloading(None));
    assert!(inner.is_in_reloading_state());
    assert_eq!(outer.sub_controllers().len(), 2);

    outer.reset_reloading_state();
    assert!(!inner.is_in_reloading_state());
    assert_eq!(detectors[1].performed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_combined_reset_resets_children() {
    let detectors = [ScriptedDetector::answering(true), ScriptedDetector::answering(false)];
    let children: Vec<_> = detectors
        .iter()
        .map(|d| Arc::new(ReloadingController::new(d.clone())))
        .collect();
    let combined = CombinedReloadingController::new(
        children
            .iter()
            .map(|child| Arc::clone(child) as Arc<dyn ReloadingControl>),
    );

    assert!(combined.check_for_reloading(None));
    assert!(children[0].is_in_reloading_state());

    combined.reset_reloading_state();
    assert!(!combined.is_in_reloading_state());
    assert!(!children[0].is_in_reloading_state());
    assert_eq!(detectors[0].performed.load(Ordering::SeqCst), 1);
    assert_eq!(detectors[1].performed.load(Ordering::SeqCst), 0);

    combined.reset_initial_reloading_state();
    assert_eq!(detectors[1].performed.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Periodic Trigger
// ============================================================================

#[test]
fn test_start_twice_schedules_once() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let controller = Arc::new(ReloadingController::new(ManualReloadingDetector::new()));
    let trigger = PeriodicReloadingTrigger::builder(controller)
        .period(Duration::from_secs(1))
        .scheduler(scheduler.clone())
        .build()
        .unwrap();

    trigger.start().unwrap();
    trigger.start().unwrap();

    assert!(trigger.is_running());
    assert_eq!(scheduler.scheduled.load(Ordering::SeqCst), 1);

    trigger.stop();
    assert!(!trigger.is_running());
    assert_eq!(scheduler.cancelled.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shutdown_leaves_external_scheduler_running() {
    let scheduler = Arc::new(RecordingScheduler::default());
    let controller = Arc::new(ReloadingController::new(ManualReloadingDetector::new()));
    let trigger = PeriodicReloadingTrigger::builder(controller)
        .scheduler(scheduler.clone())
        .build()
        .unwrap();

    trigger.start().unwrap();
    trigger.shutdown();
    assert!(!scheduler.is_shutdown());

    trigger.shutdown_with(true);
    assert!(scheduler.is_shutdown());
}

#[test]
fn test_zero_period_is_rejected() {
    let controller = Arc::new(ReloadingController::new(ManualReloadingDetector::new()));
    let err = PeriodicReloadingTrigger::builder(controller)
        .period(Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(matches!(err, ReloadError::InvalidArgument { .. }));
}

#[test]
fn test_trigger_drives_controller_on_background_thread() {
    let detector = ManualReloadingDetector::new();
    let controller = Arc::new(ReloadingController::new(detector.clone()));
    let events = Arc::new(AtomicUsize::new(0));

    let counter = events.clone();
    controller.add_listener(Arc::new(move |_: &ReloadingEvent<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let trigger = PeriodicReloadingTrigger::builder(controller.clone())
        .period(Duration::from_millis(20))
        .build()
        .unwrap();
    trigger.start().unwrap();

    detector.trigger();
    let mut waited = Duration::ZERO;
    while !controller.is_in_reloading_state() && waited < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    trigger.shutdown();

    assert!(controller.is_in_reloading_state());
    assert_eq!(events.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Reloading Configuration
// ============================================================================

#[test]
fn test_reloading_config_follows_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("port.conf");
    fs::write(&path, "8080").unwrap();

    let loader_path = path.clone();
    let config = ReloadingConfig::builder()
        .file(&path)
        .refresh_delay(Duration::from_millis(50))
        .build(move || {
            let text = fs::read_to_string(&loader_path)?;
            text.trim()
                .parse::<u16>()
                .map_err(|err| reconf::Error::load_with("port is not a number", err))
        })
        .unwrap();

    assert_eq!(*config.get(), 8080);
    let epoch = config.epoch();

    // Make sure the new modification time differs from the baseline
    thread::sleep(Duration::from_millis(1100));
    fs::write(&path, "9090").unwrap();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(*config.get(), 9090);
    assert!(config.has_changed_since(epoch));
}
