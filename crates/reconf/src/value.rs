//! Type-erased literal values.
//!
//! [`ConfigValue`] is the literal type used by bean declarations: flat bean
//! properties and constructor arguments carry a `ConfigValue`, and the bean
//! engine converts it into the type a setter or constructor expects.
//!
//! # Example
//!
//! ```rust
//! use reconf::ConfigValue;
//!
//! let port = ConfigValue::from(8080_u32);
//! assert_eq!(port.to_u16(), Some(8080));
//!
//! let text = ConfigValue::from("8080");
//! assert_eq!(text.to_i64(), Some(8080));
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use num_traits::ToPrimitive;

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates `From<T>` implementations for ConfigValue
macro_rules! impl_from_integer {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$t> for ConfigValue {
                fn from(n: $t) -> Self {
                    ConfigValue::$variant(n as _)
                }
            }
        )+
    };
}

/// Generates `to_*` methods that use ToPrimitive
macro_rules! impl_to_primitive {
    ($($method:ident -> $t:ty),+ $(,)?) => {
        $(
            #[doc = concat!("Converts to `", stringify!($t), "` if possible.")]
            #[must_use]
            pub fn $method(&self) -> Option<$t> {
                match self {
                    ConfigValue::Integer(n) => n.$method(),

                    ConfigValue::UnsignedInteger(n) => n.$method(),

                    ConfigValue::Float(f) => f.$method(),

                    ConfigValue::String(s) => s.trim().parse().ok(),

                    ConfigValue::Boolean(b) => Some(if *b { 1 as $t } else { 0 as $t }),

                    _ => None,
                }
            }
        )+
    };
}

// ============================================================================
// ConfigValue Enum
// ============================================================================

/// A type-erased configuration value.
///
/// | Variant | Rust Types |
/// |---------|------------|
/// | `String` | `String`, `&str` |
/// | `Integer` | `i8` - `i64`, `isize` |
/// | `UnsignedInteger` | `u8` - `u64`, `usize` |
/// | `Float` | `f32`, `f64` |
/// | `Boolean` | `bool` |
/// | `List` | `Vec<ConfigValue>` |
/// | `Map` | `BTreeMap<String, ConfigValue>` |
///
/// A `String` holds untyped configuration text. The bean engine treats it as
/// convertible to every scalar type, while the numeric and boolean variants
/// are typed literals.
///
/// With the `serde` feature the value serializes untagged and deserializes
/// from any self-describing format, with the same mapping as
/// `From<serde_json::Value>`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged, from = "serde_json::Value")
)]
pub enum ConfigValue {
    /// A string value.
    String(String),

    /// A signed integer (stored as i64).
    Integer(i64),

    /// An unsigned integer (stored as u64).
    UnsignedInteger(u64),

    /// A floating-point value (stored as f64).
    Float(f64),

    /// A boolean value.
    Boolean(bool),

    /// A list of values.
    List(Vec<ConfigValue>),

    /// A map of string keys to values.
    Map(BTreeMap<String, ConfigValue>),

    /// No value.
    None,
}

// ============================================================================
// Accessors
// ============================================================================

impl ConfigValue {
    impl_to_primitive! {
        to_i8 -> i8,
        to_i16 -> i16,
        to_i32 -> i32,
        to_i64 -> i64,
        to_isize -> isize,
        to_u8 -> u8,
        to_u16 -> u16,
        to_u32 -> u32,
        to_u64 -> u64,
        to_usize -> usize,
        to_f32 -> f32,
        to_f64 -> f64,
    }

    /// Converts to `bool` if possible.
    ///
    /// Text is accepted case-insensitively as `true`/`false`; numbers map
    /// zero to `false` and everything else to `true`.
    #[must_use]
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),

            ConfigValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },

            ConfigValue::Integer(n) => Some(*n != 0),

            ConfigValue::UnsignedInteger(n) => Some(*n != 0),

            _ => None,
        }
    }

    /// Returns the string slice if this is a `String` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items if this is a `List` value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map` value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` for [`ConfigValue::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, ConfigValue::None)
    }

    /// Returns `true` for single values (not list, map or none).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(
            self,
            ConfigValue::List(_) | ConfigValue::Map(_) | ConfigValue::None
        )
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "string",
            ConfigValue::Integer(_) | ConfigValue::UnsignedInteger(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::Boolean(_) => "boolean",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
            ConfigValue::None => "none",
        }
    }
}

impl Display for ConfigValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "{s}"),

            ConfigValue::Integer(n) => write!(f, "{n}"),

            ConfigValue::UnsignedInteger(n) => write!(f, "{n}"),

            ConfigValue::Float(x) => write!(f, "{x}"),

            ConfigValue::Boolean(b) => write!(f, "{b}"),

            ConfigValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }

            ConfigValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }

            ConfigValue::None => write!(f, "<none>"),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl_from_integer! {
    i8 => Integer,
    i16 => Integer,
    i32 => Integer,
    i64 => Integer,
    isize => Integer,
    u8 => UnsignedInteger,
    u16 => UnsignedInteger,
    u32 => UnsignedInteger,
    u64 => UnsignedInteger,
    usize => UnsignedInteger,
}

impl From<f32> for ConfigValue {
    fn from(f: f32) -> Self {
        ConfigValue::Float(f64::from(f))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::None, Into::into)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(map: BTreeMap<String, ConfigValue>) -> Self {
        ConfigValue::Map(map)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => ConfigValue::None,

            Value::Bool(b) => ConfigValue::Boolean(b),

            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    ConfigValue::UnsignedInteger(u)
                } else if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else {
                    ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }

            Value::String(s) => ConfigValue::String(s),

            Value::Array(items) => ConfigValue::List(items.into_iter().map(Into::into).collect()),

            Value::Object(map) => {
                ConfigValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(feature = "toml")]
impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        use toml::Value;

        match value {
            Value::String(s) => ConfigValue::String(s),

            Value::Integer(i) => ConfigValue::Integer(i),

            Value::Float(f) => ConfigValue::Float(f),

            Value::Boolean(b) => ConfigValue::Boolean(b),

            Value::Datetime(dt) => ConfigValue::String(dt.to_string()),

            Value::Array(items) => ConfigValue::List(items.into_iter().map(Into::into).collect()),

            Value::Table(table) => {
                ConfigValue::Map(table.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
