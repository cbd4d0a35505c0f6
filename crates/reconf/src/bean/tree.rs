//! Bean declarations read from configuration trees.
//!
//! A map inside a configuration describes a bean. Reserved keys carry the
//! meta data; every other key is a property:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `config-class` | Class name |
//! | `config-factory` | Factory name |
//! | `config-factoryparam` | Factory parameter |
//! | `config-constrarg` | Constructor argument, or a list of them |
//!
//! A constructor argument is a map holding either `config-value` (a literal)
//! or `config-bean` (a nested bean map), plus an optional `config-type` hint.
//! Other keys starting with `config-` are reserved and ignored.
//!
//! Property values that are maps become nested beans, lists of maps become
//! lists of nested beans, everything else is a literal.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::declaration::{BasicBeanDeclaration, BeanDeclaration, ConstructorArg, NestedDeclaration};
use super::error::BeanError;
use crate::value::ConfigValue;

/// Prefix of reserved keys.
pub const RESERVED_PREFIX: &str = "config-";

/// Key holding the class name.
pub const KEY_CLASS: &str = "config-class";

/// Key holding the factory name.
pub const KEY_FACTORY: &str = "config-factory";

/// Key holding the factory parameter.
pub const KEY_FACTORY_PARAM: &str = "config-factoryparam";

/// Key holding constructor arguments.
pub const KEY_CONSTRUCTOR_ARG: &str = "config-constrarg";

/// Key holding a literal constructor argument.
pub const KEY_ARG_VALUE: &str = "config-value";

/// Key holding a nested bean constructor argument.
pub const KEY_ARG_BEAN: &str = "config-bean";

/// Key holding a constructor argument's type hint.
pub const KEY_ARG_TYPE: &str = "config-type";

impl BasicBeanDeclaration {
    /// Reads a declaration from a configuration map.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidDeclaration`] if `value` (or a nested
    /// constructor argument) is not a map, or a reserved key has a value of
    /// the wrong shape.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use reconf::ConfigValue;
    /// use reconf::bean::{BasicBeanDeclaration, BeanDeclaration};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("config-class".to_string(), ConfigValue::from("Server"));
    /// map.insert("host".to_string(), ConfigValue::from("localhost"));
    ///
    /// let declaration = BasicBeanDeclaration::from_value(&ConfigValue::Map(map))?;
    /// assert_eq!(declaration.bean_class_name(), Some("Server"));
    /// assert!(declaration.bean_properties().contains_key("host"));
    /// # Ok::<(), reconf::bean::BeanError>(())
    /// ```
    pub fn from_value(value: &ConfigValue) -> Result<Self, BeanError> {
        let map = value.as_map().ok_or_else(|| {
            BeanError::invalid_declaration(format!(
                "expected a map, found {}",
                value.type_name()
            ))
        })?;
        Self::from_map(map)
    }

    fn from_map(map: &BTreeMap<String, ConfigValue>) -> Result<Self, BeanError> {
        let mut declaration = Self::new();

        for (key, value) in map {
            match key.as_str() {
                KEY_CLASS => declaration = declaration.with_class(text(key, value)?),
                KEY_FACTORY => declaration = declaration.with_factory(text(key, value)?),
                KEY_FACTORY_PARAM => {
                    declaration = declaration.with_factory_parameter(value.clone());
                }
                KEY_CONSTRUCTOR_ARG => {
                    for arg in constructor_args(value)? {
                        declaration = declaration.with_constructor_arg(arg);
                    }
                }
                reserved if reserved.starts_with(RESERVED_PREFIX) => {}
                _ => declaration = property(declaration, key, value)?,
            }
        }

        Ok(declaration)
    }
}

fn text(key: &str, value: &ConfigValue) -> Result<String, BeanError> {
    match value {
        ConfigValue::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        other => Err(BeanError::invalid_declaration(format!(
            "'{key}' must be a non-empty string, found {}",
            other.type_name()
        ))),
    }
}

fn is_list_of_maps(items: &[ConfigValue]) -> bool {
    !items.is_empty() && items.iter().all(|item| item.as_map().is_some())
}

fn property(
    declaration: BasicBeanDeclaration,
    key: &str,
    value: &ConfigValue,
) -> Result<BasicBeanDeclaration, BeanError> {
    Ok(match value {
        ConfigValue::Map(map) => {
            let nested = BasicBeanDeclaration::from_map(map)?;
            declaration.with_nested(key, nested)
        }
        ConfigValue::List(items) if is_list_of_maps(items) => {
            let list = items
                .iter()
                .map(|item| {
                    BasicBeanDeclaration::from_value(item)
                        .map(|d| Arc::new(d) as Arc<dyn BeanDeclaration>)
                })
                .collect::<Result<Vec<_>, _>>()?;
            declaration.with_nested_declaration(key, NestedDeclaration::List(list))
        }
        literal => declaration.with_property(key, literal.clone()),
    })
}

fn constructor_args(value: &ConfigValue) -> Result<Vec<ConstructorArg>, BeanError> {
    match value {
        ConfigValue::List(items) => items.iter().map(constructor_arg).collect(),
        single => Ok(vec![constructor_arg(single)?]),
    }
}

fn constructor_arg(value: &ConfigValue) -> Result<ConstructorArg, BeanError> {
    let map = value.as_map().ok_or_else(|| {
        BeanError::invalid_declaration(format!(
            "'{KEY_CONSTRUCTOR_ARG}' entries must be maps, found {}",
            value.type_name()
        ))
    })?;

    let arg = match (map.get(KEY_ARG_VALUE), map.get(KEY_ARG_BEAN)) {
        (Some(_), Some(_)) => {
            return Err(BeanError::invalid_declaration(format!(
                "constructor argument has both '{KEY_ARG_VALUE}' and '{KEY_ARG_BEAN}'"
            )));
        }
        (Some(literal), None) => ConstructorArg::value(literal.clone()),
        (None, Some(bean)) => ConstructorArg::nested(BasicBeanDeclaration::from_value(bean)?),
        (None, None) => ConstructorArg::value(ConfigValue::None),
    };

    Ok(match map.get(KEY_ARG_TYPE) {
        Some(type_name) => arg.with_type(text(KEY_ARG_TYPE, type_name)?),
        None => arg,
    })
}
