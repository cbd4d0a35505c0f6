//! Errors raised by the bean creation engine.

use std::error::Error as StdError;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for bean creation.
///
/// Failures inside a factory reach the caller of
/// [`BeanHelper::create_bean`](super::BeanHelper::create_bean) wrapped once in
/// [`BeanError::Creation`], which names the class being created. Use
/// [`root_cause`](Self::root_cause) to get at the original failure.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum BeanError {
    /// An argument violated a precondition (for example an empty name).
    #[error("invalid argument: {message}")]
    #[diagnostic(code(reconf::bean::invalid_argument))]
    InvalidArgument {
        /// Human-readable error message.
        message: String,
    },

    /// A declaration refers to a factory that is not registered.
    #[error("unknown bean factory '{name}'")]
    #[diagnostic(
        code(reconf::bean::unknown_factory),
        help("Register the factory with BeanHelper::register_bean_factory before creating beans")
    )]
    UnknownFactory {
        /// The requested factory name.
        name: String,
    },

    /// Neither the declaration, the caller nor the factory named a class.
    #[error("no bean class specified")]
    #[diagnostic(
        code(reconf::bean::class_not_specified),
        help("Set a class name on the declaration (config-class) or pass a default class")
    )]
    ClassNotSpecified,

    /// The class is not registered.
    #[error("bean class '{class}' is not registered")]
    #[diagnostic(
        code(reconf::bean::class_not_found),
        help("Register the class with BeanHelper::register_class")
    )]
    ClassNotFound {
        /// The requested class name.
        class: String,
    },

    /// No constructor accepts the supplied arguments.
    #[error("no matching constructor of '{class}' for arguments {arguments}")]
    #[diagnostic(code(reconf::bean::no_matching_constructor))]
    NoMatchingConstructor {
        /// The class being created.
        class: String,
        /// Description of the supplied arguments.
        arguments: String,
    },

    /// More than one constructor accepts the supplied arguments equally well.
    #[error("ambiguous constructor of '{class}' for arguments {arguments}")]
    #[diagnostic(
        code(reconf::bean::ambiguous_constructor),
        help("Add a type hint (config-type) to the constructor arguments")
    )]
    AmbiguousConstructor {
        /// The class being created.
        class: String,
        /// Description of the supplied arguments.
        arguments: String,
    },

    /// The property does not exist or cannot be written.
    #[error("property '{property}' of '{class}' is not writable")]
    #[diagnostic(code(reconf::bean::property_not_writable))]
    PropertyNotWritable {
        /// The property name.
        property: String,
        /// The class of the bean.
        class: String,
    },

    /// A property value could not be converted to the property's type.
    #[error("cannot set property '{property}' of '{class}': expected {expected}, got '{value}'")]
    #[diagnostic(code(reconf::bean::property_conversion))]
    PropertyConversion {
        /// The property name.
        property: String,
        /// The class of the bean.
        class: String,
        /// The type the property expects.
        expected: &'static str,
        /// The supplied value.
        value: String,
    },

    /// A constructor argument could not be converted to the parameter type.
    #[error("constructor argument {index} of '{class}': expected {expected}, got '{value}'")]
    #[diagnostic(code(reconf::bean::argument_conversion))]
    ArgumentConversion {
        /// The class being created.
        class: String,
        /// Zero-based argument position.
        index: usize,
        /// The type the parameter expects.
        expected: &'static str,
        /// The supplied value.
        value: String,
    },

    /// A created bean has a different type than requested.
    #[error("bean of class '{class}' is not a {expected}")]
    #[diagnostic(code(reconf::bean::type_mismatch))]
    TypeMismatch {
        /// The class the bean was created from.
        class: String,
        /// The requested Rust type.
        expected: &'static str,
    },

    /// A declaration is malformed.
    #[error("invalid bean declaration: {message}")]
    #[diagnostic(code(reconf::bean::invalid_declaration))]
    InvalidDeclaration {
        /// Human-readable error message.
        message: String,
    },

    /// A bean factory failed for a reason of its own.
    #[error("bean factory failed: {message}")]
    #[diagnostic(code(reconf::bean::factory))]
    Factory {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Creating a bean of `class` failed.
    #[error("failed to create bean of class '{class}'")]
    #[diagnostic(code(reconf::bean::creation))]
    Creation {
        /// The class being created.
        class: String,
        /// What went wrong.
        #[source]
        source: Box<BeanError>,
    },
}

impl BeanError {
    /// Create a new `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new `InvalidDeclaration` error.
    pub fn invalid_declaration(message: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            message: message.into(),
        }
    }

    /// Create a new `Factory` error.
    pub fn factory(message: impl Into<String>) -> Self {
        Self::Factory {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new `Factory` error wrapping `source`.
    pub fn factory_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Factory {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps this error in [`BeanError::Creation`] unless it already is one.
    #[must_use]
    pub fn in_creation_of(self, class: &str) -> Self {
        match self {
            Self::Creation { .. } => self,
            other => Self::Creation {
                class: class.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error behind any [`BeanError::Creation`] layers.
    #[must_use]
    pub fn root_cause(&self) -> &BeanError {
        match self {
            Self::Creation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Failure reported by a property setter.
///
/// Setters know neither the property's public name nor the class name; the
/// engine turns these into [`BeanError::PropertyNotWritable`] and
/// [`BeanError::PropertyConversion`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PropertyError {
    /// The property does not exist or has no setter.
    #[error("property is not writable")]
    NotWritable,

    /// The value could not be converted.
    #[error("expected {expected}, got '{value}'")]
    Conversion {
        /// The type the setter expects.
        expected: &'static str,
        /// The supplied value.
        value: String,
    },
}

impl PropertyError {
    /// Create a new `Conversion` error.
    pub fn conversion(expected: &'static str, value: impl Into<String>) -> Self {
        Self::Conversion {
            expected,
            value: value.into(),
        }
    }
}
