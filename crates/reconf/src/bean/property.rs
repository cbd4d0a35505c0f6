//! Values handed to property setters and constructors.

use std::any::{Any, type_name};
use std::path::PathBuf;

use super::error::PropertyError;
use crate::value::ConfigValue;

/// A bean created by the engine.
pub type BeanInstance = Box<dyn Any + Send>;

/// A value assigned to a bean property or passed to a constructor.
///
/// Flat properties and literal constructor arguments arrive as
/// [`PropertyValue::Value`]; nested declarations arrive as the beans created
/// from them.
#[derive(Debug)]
pub enum PropertyValue {
    /// A literal from the declaration.
    Value(ConfigValue),

    /// A bean created from a single nested declaration.
    Bean(BeanInstance),

    /// Beans created from a list of nested declarations.
    Beans(Vec<BeanInstance>),
}

impl PropertyValue {
    /// Returns the literal, if this is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Takes the nested bean out as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Conversion`] if this is not a single bean of
    /// type `T`.
    pub fn into_bean<T: Any>(self) -> Result<T, PropertyError> {
        match self {
            Self::Bean(bean) => bean
                .downcast::<T>()
                .map(|bean| *bean)
                .map_err(|_| PropertyError::conversion(type_name::<T>(), "bean of another type")),
            other => Err(PropertyError::conversion(type_name::<T>(), other.describe())),
        }
    }

    /// Takes the nested beans out as `T`s. A single bean becomes a list of one.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Conversion`] if any bean is not a `T` or this
    /// is a literal other than none.
    pub fn into_beans<T: Any>(self) -> Result<Vec<T>, PropertyError> {
        match self {
            Self::Beans(beans) => beans
                .into_iter()
                .map(|bean| Self::Bean(bean).into_bean())
                .collect(),
            Self::Bean(_) => Ok(vec![self.into_bean()?]),
            Self::Value(ConfigValue::None) => Ok(Vec::new()),
            other => Err(PropertyError::conversion(type_name::<T>(), other.describe())),
        }
    }

    /// Short description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => value.to_string(),
            Self::Bean(_) => "<bean>".to_string(),
            Self::Beans(beans) => format!("<{} beans>", beans.len()),
        }
    }
}

impl From<ConfigValue> for PropertyValue {
    fn from(value: ConfigValue) -> Self {
        Self::Value(value)
    }
}

/// Conversion from a [`PropertyValue`] into a field or parameter type.
///
/// Implemented for strings, booleans, all primitive numbers, paths,
/// [`ConfigValue`], and `Option`/`Vec` of those. `#[derive(Bean)]` uses this
/// trait for every field not marked `nested`.
pub trait FromPropertyValue: Sized {
    /// Name of the target type for error messages.
    const TYPE_NAME: &'static str;

    /// Converts the value.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::Conversion`] if the value has no
    /// representation as `Self`.
    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError>;
}

fn literal<T: FromPropertyValue>(value: PropertyValue) -> Result<ConfigValue, PropertyError> {
    match value {
        PropertyValue::Value(value) => Ok(value),
        other => Err(PropertyError::conversion(T::TYPE_NAME, other.describe())),
    }
}

/// Implements `FromPropertyValue` via the `ConfigValue::to_*` accessors.
macro_rules! impl_from_property_value {
    ($($t:ty => $method:ident),+ $(,)?) => {
        $(
            impl FromPropertyValue for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
                    let value = literal::<Self>(value)?;
                    value
                        .$method()
                        .ok_or_else(|| PropertyError::conversion(Self::TYPE_NAME, value.to_string()))
                }
            }
        )+
    };
}

impl_from_property_value! {
    bool => to_bool,
    i8 => to_i8,
    i16 => to_i16,
    i32 => to_i32,
    i64 => to_i64,
    isize => to_isize,
    u8 => to_u8,
    u16 => to_u16,
    u32 => to_u32,
    u64 => to_u64,
    usize => to_usize,
    f32 => to_f32,
    f64 => to_f64,
}

impl FromPropertyValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match literal::<Self>(value)? {
            ConfigValue::String(s) => Ok(s),
            value if value.is_scalar() => Ok(value.to_string()),
            value => Err(PropertyError::conversion(Self::TYPE_NAME, value.to_string())),
        }
    }
}

impl FromPropertyValue for PathBuf {
    const TYPE_NAME: &'static str = "PathBuf";

    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        String::from_property_value(value).map(PathBuf::from)
    }
}

impl FromPropertyValue for ConfigValue {
    const TYPE_NAME: &'static str = "ConfigValue";

    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        literal::<Self>(value)
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Value(ConfigValue::None) => Ok(None),
            other => T::from_property_value(other).map(Some),
        }
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_property_value(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Value(ConfigValue::List(items)) => items
                .into_iter()
                .map(|item| T::from_property_value(PropertyValue::Value(item)))
                .collect(),
            PropertyValue::Value(ConfigValue::None) => Ok(Vec::new()),
            PropertyValue::Beans(beans) => beans
                .into_iter()
                .map(|bean| T::from_property_value(PropertyValue::Bean(bean)))
                .collect(),
            single => Ok(vec![T::from_property_value(single)?]),
        }
    }
}
