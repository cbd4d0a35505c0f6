//! Bean factories.
//!
//! A [`BeanFactory`] turns a resolved class plus a declaration into an
//! instance. [`DefaultBeanFactory`] selects a constructor, invokes it and
//! initialises the bean's properties; custom factories can delegate to it
//! and post-process the result.

use std::any::Any;
use std::sync::Arc;

use super::class::{BeanClass, ConstructorArgs, ParamType};
use super::declaration::{ArgValue, BeanDeclaration};
use super::error::BeanError;
use super::helper::BeanHelper;
use super::matching::{convert_literal, find_constructor};
use super::property::{BeanInstance, PropertyValue};
use crate::value::ConfigValue;

/// Creates beans for a [`BeanHelper`].
///
/// Factories are registered by name with
/// [`BeanHelper::register_bean_factory`] and selected by a declaration's
/// factory name.
///
/// # Example
///
/// ```rust
/// use reconf::bean::{BeanCreationContext, BeanError, BeanFactory, BeanInstance, DefaultBeanFactory};
///
/// /// Counts the beans it creates.
/// #[derive(Default)]
/// struct CountingFactory {
///     created: std::sync::atomic::AtomicUsize,
/// }
///
/// impl BeanFactory for CountingFactory {
///     fn create_bean(&self, ctx: &BeanCreationContext<'_>) -> Result<BeanInstance, BeanError> {
///         self.created.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///         DefaultBeanFactory.create_bean(ctx)
///     }
/// }
/// ```
pub trait BeanFactory: Send + Sync {
    /// Creates the bean described by `ctx`.
    ///
    /// # Errors
    ///
    /// Any error; the helper wraps it in [`BeanError::Creation`].
    fn create_bean(&self, ctx: &BeanCreationContext<'_>) -> Result<BeanInstance, BeanError>;

    /// Class to create when neither the declaration nor the caller names one.
    fn default_bean_class(&self) -> Option<&str> {
        None
    }
}

/// Everything a factory needs to create one bean.
pub struct BeanCreationContext<'a> {
    helper: &'a BeanHelper,
    class: Arc<BeanClass>,
    declaration: &'a dyn BeanDeclaration,
    parameter: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> BeanCreationContext<'a> {
    pub(crate) fn new(
        helper: &'a BeanHelper,
        class: Arc<BeanClass>,
        declaration: &'a dyn BeanDeclaration,
        parameter: Option<&'a (dyn Any + Send + Sync)>,
    ) -> Self {
        Self {
            helper,
            class,
            declaration,
            parameter,
        }
    }

    /// The resolved class.
    #[must_use]
    pub fn bean_class(&self) -> &BeanClass {
        &self.class
    }

    /// The declaration being processed.
    #[must_use]
    pub fn declaration(&self) -> &dyn BeanDeclaration {
        self.declaration
    }

    /// Parameter passed by the caller of `create_bean_with`.
    #[must_use]
    pub fn parameter(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.parameter
    }

    /// The declaration's factory parameter.
    #[must_use]
    pub fn factory_parameter(&self) -> Option<&ConfigValue> {
        self.declaration.bean_factory_parameter()
    }

    /// Creates a nested bean through the same helper.
    ///
    /// # Errors
    ///
    /// See [`BeanHelper::create_bean`].
    pub fn create_bean(&self, declaration: &dyn BeanDeclaration) -> Result<BeanInstance, BeanError> {
        self.helper.create_bean_with(declaration, None, None)
    }

    /// Creates a nested bean, using `default_class` if the declaration names
    /// no class.
    ///
    /// # Errors
    ///
    /// See [`BeanHelper::create_bean`].
    pub fn create_bean_with_default(
        &self,
        declaration: &dyn BeanDeclaration,
        default_class: Option<&str>,
    ) -> Result<BeanInstance, BeanError> {
        self.helper.create_bean_with(declaration, default_class, None)
    }

    /// Sets the declaration's properties and nested beans on `bean`.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::PropertyNotWritable`] or
    /// [`BeanError::PropertyConversion`] for a property that cannot be set, or
    /// any error from creating a nested bean.
    pub fn init_bean(&self, bean: &mut BeanInstance) -> Result<(), BeanError> {
        self.helper
            .init_bean_of_class(&self.class, bean, self.declaration)
    }
}

/// Constructor selection followed by property initialisation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBeanFactory;

impl DefaultBeanFactory {
    /// Selects a constructor for the declaration's arguments and invokes it.
    ///
    /// Literal arguments are converted to the parameter types; nested
    /// arguments are created first, defaulting to the parameter's class.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::NoMatchingConstructor`],
    /// [`BeanError::AmbiguousConstructor`], [`BeanError::ArgumentConversion`]
    /// or any error from the constructor or a nested bean.
    pub fn create_bean_instance(
        &self,
        ctx: &BeanCreationContext<'_>,
    ) -> Result<BeanInstance, BeanError> {
        let class = ctx.bean_class();
        let args = ctx.declaration().constructor_args();
        let constructor = find_constructor(class, &args)?;

        let mut values = Vec::with_capacity(args.len());
        for (index, (arg, param)) in args.iter().zip(constructor.params()).enumerate() {
            let value = match arg.arg_value() {
                ArgValue::Literal(literal) => convert_literal(literal, param)
                    .map(PropertyValue::Value)
                    .ok_or_else(|| BeanError::ArgumentConversion {
                        class: class.name().to_string(),
                        index,
                        expected: param_type_name(param),
                        value: literal.to_string(),
                    })?,
                ArgValue::Nested(nested) => {
                    let default_class = match param {
                        ParamType::Bean(name) => Some(name.as_str()),
                        _ => None,
                    };
                    PropertyValue::Bean(ctx.create_bean_with_default(nested.as_ref(), default_class)?)
                }
            };
            values.push(value);
        }

        constructor.invoke(ConstructorArgs::new(class.name(), values))
    }
}

fn param_type_name(param: &ParamType) -> &'static str {
    match param {
        ParamType::String => "String",
        ParamType::Bool => "bool",
        ParamType::Int => "int",
        ParamType::Float => "float",
        ParamType::Bean(_) => "bean",
        ParamType::Any => "any",
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn create_bean(&self, ctx: &BeanCreationContext<'_>) -> Result<BeanInstance, BeanError> {
        let mut bean = self.create_bean_instance(ctx)?;
        ctx.init_bean(&mut bean)?;
        Ok(bean)
    }
}
