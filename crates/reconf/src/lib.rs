//! # reconf
//!
//! Reload detection and declarative object creation for configuration
//! sources.
//!
//! `reconf` answers two questions a long-running application asks about its
//! configuration: *has it changed?* and *what objects does it describe?*
//!
//! ## Features
//!
//! - **Reload detection** - Rate-limited modification-time checks for files
//!   and virtual file systems, or manual triggers
//! - **Debouncing** - A controller reports a change once and stays pending
//!   until the application has reloaded
//! - **Combined controllers** - One view over several configuration sources
//! - **Periodic triggers** - Background polling on a cancellable scheduler
//! - **Reloading holders** - [`ReloadingConfig`](reloading::ReloadingConfig)
//!   swaps in a freshly loaded value and keeps the last good one on failure
//! - **Bean creation** - Build object graphs from declarations, with
//!   constructor overload resolution and nested beans
//! - **Rich diagnostics** - Every error carries a [`miette`] code and help
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reconf::reloading::ReloadingConfig;
//!
//! fn main() -> reconf::Result<()> {
//!     let config = ReloadingConfig::builder()
//!         .file("app.properties")
//!         .build(|| std::fs::read_to_string("app.properties").map_err(reconf::Error::from))?;
//!
//!     // Cheap when nothing changed; reloads once after the file was modified.
//!     let text: Arc<String> = config.get();
//!     println!("{} bytes of configuration", text.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|---------|
//! | `derive` | `#[derive(Bean)]` | **Yes** |
//! | `serde` | serde support for [`ConfigValue`], conversion from `serde_json::Value` | No |
//! | `toml` | [`ConfigValue`] from `toml::Value` (implies `serde`) | No |
//! | `full` | Enable all features | No |
//!
//! ## Logging
//!
//! The crate logs through [`tracing`] and installs no subscriber.
//! Detector checks and state changes are logged at `debug`, unreadable
//! resources and failed reloads at `warn`, trigger start and stop at `info`.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

// Lets the derive macro refer to `::reconf` from inside this crate.
extern crate self as reconf;

#[cfg(feature = "derive")]
pub use reconf_macro::Bean;

// ============================================================================
// Re-exported Dependencies
// ============================================================================

/// Re-export miette for error handling.
pub use miette;

/// Re-export `serde_json` when the serde feature is enabled.
#[cfg(feature = "serde")]
pub use serde_json;

/// Re-export toml when the feature is enabled.
#[cfg(feature = "toml")]
pub use toml;

// ============================================================================
// Core Modules
// ============================================================================

mod error;
pub use error::Error;

/// A Result type that displays errors with miette's fancy formatting.
///
/// ```rust,no_run
/// fn main() -> reconf::Result<()> {
///     let helper = reconf::bean::BeanHelper::new();
///     let _ = helper.create_bean(&reconf::bean::BasicBeanDeclaration::new())?;
///     Ok(())
/// }
/// ```
pub type Result<T> = miette::Result<T>;

pub mod value;
pub use value::ConfigValue;

pub mod bean;
pub mod reloading;
