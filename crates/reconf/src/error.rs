//! Crate-level error type.
//!
//! Each module has its own error enum ([`ReloadError`], [`BeanError`]);
//! [`Error`] wraps them so applications can use a single type, and adds the
//! failures of user-supplied configuration loaders.
//!
//! # Error Variants
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::Reload`] | Reload detection, triggers and schedulers |
//! | [`Error::Bean`] | Bean creation from declarations |
//! | [`Error::Load`] | A configuration loader failed |
//! | [`Error::Io`] | An I/O operation in a loader failed |
//!
//! All variants implement [`miette::Diagnostic`], so they render with codes
//! and help text:
//!
//! ```rust
//! use reconf::{Error, reloading::ReloadError};
//!
//! let err: Error = ReloadError::invalid_argument("period must not be zero").into();
//! let report = miette::Report::new(err);
//! assert!(format!("{report:?}").contains("period must not be zero"));
//! ```

use std::error::Error as StdError;

use miette::Diagnostic;
use thiserror::Error as ThisError;

use crate::bean::BeanError;
use crate::reloading::ReloadError;

/// Errors produced by this crate and by configuration loaders.
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// Reload detection failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Reload(#[from] ReloadError),

    /// Bean creation failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Bean(#[from] BeanError),

    /// A configuration loader failed.
    #[error("failed to load configuration: {message}")]
    #[diagnostic(
        code(reconf::load),
        help("The previous configuration stays in effect until a load succeeds")
    )]
    Load {
        /// Human-readable error message.
        message: String,

        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    #[diagnostic(code(reconf::io))]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new `Load` error without an underlying cause.
    pub fn load(message: impl Into<String>) -> Self {
        Self::Load {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new `Load` error wrapping `source`.
    pub fn load_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Load {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = Error::load("syntax error in line 3");
        assert!(err.to_string().contains("syntax error in line 3"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_load_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
        let err = Error::load_with("cannot read file", io);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_module_errors_are_transparent() {
        let err: Error = BeanError::UnknownFactory {
            name: "missing".to_string(),
        }
        .into();
        assert!(err.to_string().contains("missing"));
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("reconf::bean::unknown_factory")
        );
    }
}
