//! Reload detection for configuration sources.
//!
//! This module decides *when* a configuration source should be reloaded.
//! It does not load anything itself; loading is left to the caller or to
//! [`ReloadingConfig`].
//!
//! # Building blocks
//!
//! - **Detectors** ([`ReloadingDetector`]) answer "has the resource changed?".
//!   [`FileReloadingDetector`] compares modification times with rate
//!   limiting, [`VfsReloadingDetector`] does the same over a [`FileSystem`],
//!   and [`ManualReloadingDetector`] is driven by an explicit flag.
//! - **Controllers** ([`ReloadingControl`]) debounce a detector: the first
//!   positive answer switches into *reloading state* and notifies listeners
//!   once; the state is left with `reset_reloading_state` after the reload.
//!   [`CombinedReloadingController`] ORs several controllers.
//! - **Triggers** ([`PeriodicReloadingTrigger`]) poll a controller from a
//!   background [`Scheduler`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use reconf::reloading::{
//!     FileReloadingDetector, PeriodicReloadingTrigger, ReloadingControl, ReloadingController,
//!     ReloadingEvent,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut detector = FileReloadingDetector::builder()
//!         .path("config/app.properties")
//!         .refresh_delay(Duration::from_secs(1))
//!         .build();
//!     detector.refresh();
//!
//!     let controller = Arc::new(ReloadingController::new(detector));
//!     controller.add_listener(Arc::new(|event: &ReloadingEvent<'_>| {
//!         println!("configuration changed, pending: {}", event.controller().is_in_reloading_state());
//!     }));
//!
//!     let trigger = PeriodicReloadingTrigger::builder(controller.clone())
//!         .period(Duration::from_secs(2))
//!         .build()?;
//!     trigger.start()?;
//!
//!     // ... reload the configuration when the controller is pending, then:
//!     controller.reset_reloading_state();
//!
//!     trigger.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ ResourceLocator │────▶│ FileReloading-   │────▶│  Controller  │────▶ listeners
//! │ (exists, mtime) │     │ Detector (rate   │     │  (debounce)  │
//! └─────────────────┘     │ limited)         │     └──────────────┘
//!                         └──────────────────┘             ▲
//!                                                  ┌───────┴──────┐
//!                                                  │   Periodic   │
//!                                                  │   trigger    │
//!                                                  │ (scheduler)  │
//!                                                  └──────────────┘
//! ```

mod combined;
mod config;
mod controller;
mod detector;
mod file;
mod locator;
mod scheduler;
mod trigger;
mod types;
mod vfs;

// Public API
pub use combined::CombinedReloadingController;
pub use config::{ChangeCallback, ErrorCallback, ReloadingConfig, ReloadingConfigBuilder};
pub use controller::{ReloadingControl, ReloadingController};
pub use detector::{ManualReloadingDetector, ReloadingDetector};
pub use file::{FileReloadingDetector, FileReloadingDetectorBuilder};
pub use locator::{FileLocator, ResourceLocator};
pub use scheduler::{ScheduledTask, Scheduler, Task, ThreadScheduler};
pub use trigger::{PeriodicReloadingTrigger, PeriodicReloadingTriggerBuilder};
pub use types::{
    ChangeTrigger, ConfigChange, ListenerId, ReloadData, ReloadError, ReloadingEvent,
    ReloadingListener,
};
pub use vfs::{FileSystem, LocalFileSystem, MemoryFileSystem, VfsLocator, VfsPath, VfsReloadingDetector};

/// Default values used by the builders in this module.
pub mod defaults {
    use std::time::Duration;

    /// Minimum time between two checks of a timestamp detector.
    pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(5000);

    /// Time between two checks of a periodic trigger.
    pub const DEFAULT_TRIGGER_PERIOD: Duration = Duration::from_secs(5);
}
