//! Declarative descriptions of beans.
//!
//! A [`BeanDeclaration`] is a read-only view of the data needed to create a
//! bean: which class, which factory, literal properties, nested
//! declarations and constructor arguments. [`BasicBeanDeclaration`] is the
//! in-memory implementation; it can be built programmatically or read from a
//! [`ConfigValue`] tree.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::value::ConfigValue;

/// Source of the data describing one bean.
///
/// Every method has an empty default, so implementations only provide what
/// they have.
pub trait BeanDeclaration: Send + Sync {
    /// Name of the class to create.
    fn bean_class_name(&self) -> Option<&str> {
        None
    }

    /// Name of the factory to use instead of the default factory.
    fn bean_factory_name(&self) -> Option<&str> {
        None
    }

    /// Parameter for the factory.
    fn bean_factory_parameter(&self) -> Option<&ConfigValue> {
        None
    }

    /// Literal property values by property name.
    fn bean_properties(&self) -> BTreeMap<String, ConfigValue> {
        BTreeMap::new()
    }

    /// Nested declarations by property name.
    fn nested_bean_declarations(&self) -> BTreeMap<String, NestedDeclaration> {
        BTreeMap::new()
    }

    /// Constructor arguments in order.
    fn constructor_args(&self) -> Vec<ConstructorArg> {
        Vec::new()
    }
}

/// A nested declaration: one bean or a list of beans.
#[derive(Clone)]
pub enum NestedDeclaration {
    /// A single nested bean.
    Single(Arc<dyn BeanDeclaration>),

    /// A list of nested beans.
    List(Vec<Arc<dyn BeanDeclaration>>),
}

impl fmt::Debug for NestedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(decl) => f
                .debug_tuple("Single")
                .field(&decl.bean_class_name())
                .finish(),
            Self::List(decls) => f.debug_tuple("List").field(&decls.len()).finish(),
        }
    }
}

/// Value of a constructor argument.
#[derive(Clone)]
pub enum ArgValue {
    /// A literal.
    Literal(ConfigValue),

    /// A bean created from a nested declaration.
    Nested(Arc<dyn BeanDeclaration>),
}

/// A constructor argument with an optional type hint.
#[derive(Clone)]
pub struct ConstructorArg {
    value: ArgValue,
    type_name: Option<String>,
}

impl ConstructorArg {
    /// A literal argument without type hint.
    pub fn value(value: impl Into<ConfigValue>) -> Self {
        Self {
            value: ArgValue::Literal(value.into()),
            type_name: None,
        }
    }

    /// A literal argument with a type hint such as `"int"` or `"String"`.
    pub fn typed(value: impl Into<ConfigValue>, type_name: impl Into<String>) -> Self {
        Self {
            value: ArgValue::Literal(value.into()),
            type_name: Some(type_name.into()),
        }
    }

    /// An argument created from a nested declaration.
    pub fn nested(declaration: impl BeanDeclaration + 'static) -> Self {
        Self::nested_arc(Arc::new(declaration))
    }

    /// An argument created from a shared nested declaration.
    pub fn nested_arc(declaration: Arc<dyn BeanDeclaration>) -> Self {
        Self {
            value: ArgValue::Nested(declaration),
            type_name: None,
        }
    }

    /// Adds a type hint.
    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// The argument value.
    #[must_use]
    pub fn arg_value(&self) -> &ArgValue {
        &self.value
    }

    /// The type hint, if any.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns `true` if the argument is a nested declaration.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self.value, ArgValue::Nested(_))
    }
}

/// Formats as `(value=42, type=int)`.
impl fmt::Display for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ArgValue::Literal(value) => write!(f, "(value={value}")?,
            ArgValue::Nested(decl) => match decl.bean_class_name() {
                Some(class) => write!(f, "(value=<bean {class}>")?,
                None => write!(f, "(value=<bean>")?,
            },
        }
        match &self.type_name {
            Some(type_name) => write!(f, ", type={type_name})"),
            None => write!(f, ", type=<none>)"),
        }
    }
}

impl fmt::Debug for ConstructorArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// In-memory [`BeanDeclaration`].
///
/// # Example
///
/// ```rust
/// use reconf::bean::{BasicBeanDeclaration, BeanDeclaration, ConstructorArg};
///
/// let declaration = BasicBeanDeclaration::new()
///     .with_class("Server")
///     .with_property("host", "localhost")
///     .with_constructor_arg(ConstructorArg::typed(8080, "int"))
///     .with_nested("tls", BasicBeanDeclaration::new().with_property("enabled", true));
///
/// assert_eq!(declaration.bean_class_name(), Some("Server"));
/// assert_eq!(declaration.constructor_args().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BasicBeanDeclaration {
    class_name: Option<String>,
    factory_name: Option<String>,
    factory_parameter: Option<ConfigValue>,
    properties: BTreeMap<String, ConfigValue>,
    nested: BTreeMap<String, NestedDeclaration>,
    constructor_args: Vec<ConstructorArg>,
}

impl BasicBeanDeclaration {
    /// Create an empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class name.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    /// Set the factory name.
    #[must_use]
    pub fn with_factory(mut self, factory: impl Into<String>) -> Self {
        self.factory_name = Some(factory.into());
        self
    }

    /// Set the factory parameter.
    #[must_use]
    pub fn with_factory_parameter(mut self, parameter: impl Into<ConfigValue>) -> Self {
        self.factory_parameter = Some(parameter.into());
        self
    }

    /// Add a literal property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a nested bean.
    #[must_use]
    pub fn with_nested(
        mut self,
        name: impl Into<String>,
        declaration: impl BeanDeclaration + 'static,
    ) -> Self {
        self.nested
            .insert(name.into(), NestedDeclaration::Single(Arc::new(declaration)));
        self
    }

    /// Add a list of nested beans.
    #[must_use]
    pub fn with_nested_list<D>(
        mut self,
        name: impl Into<String>,
        declarations: impl IntoIterator<Item = D>,
    ) -> Self
    where
        D: BeanDeclaration + 'static,
    {
        let list = declarations
            .into_iter()
            .map(|d| Arc::new(d) as Arc<dyn BeanDeclaration>)
            .collect();
        self.nested.insert(name.into(), NestedDeclaration::List(list));
        self
    }

    /// Add a nested entry of either shape.
    #[must_use]
    pub fn with_nested_declaration(
        mut self,
        name: impl Into<String>,
        nested: NestedDeclaration,
    ) -> Self {
        self.nested.insert(name.into(), nested);
        self
    }

    /// Append a constructor argument.
    #[must_use]
    pub fn with_constructor_arg(mut self, arg: ConstructorArg) -> Self {
        self.constructor_args.push(arg);
        self
    }
}

impl BeanDeclaration for BasicBeanDeclaration {
    fn bean_class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    fn bean_factory_name(&self) -> Option<&str> {
        self.factory_name.as_deref()
    }

    fn bean_factory_parameter(&self) -> Option<&ConfigValue> {
        self.factory_parameter.as_ref()
    }

    fn bean_properties(&self) -> BTreeMap<String, ConfigValue> {
        self.properties.clone()
    }

    fn nested_bean_declarations(&self) -> BTreeMap<String, NestedDeclaration> {
        self.nested.clone()
    }

    fn constructor_args(&self) -> Vec<ConstructorArg> {
        self.constructor_args.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_display() {
        assert_eq!(
            ConstructorArg::typed(42, "int").to_string(),
            "(value=42, type=int)"
        );
        assert_eq!(
            ConstructorArg::value("x").to_string(),
            "(value=x, type=<none>)"
        );

        let nested = ConstructorArg::nested(BasicBeanDeclaration::new().with_class("Address"));
        assert!(nested.is_nested());
        assert_eq!(nested.to_string(), "(value=<bean Address>, type=<none>)");
    }

    #[test]
    fn test_defaults_are_empty() {
        struct Empty;
        impl BeanDeclaration for Empty {}

        let decl = Empty;
        assert!(decl.bean_class_name().is_none());
        assert!(decl.bean_factory_name().is_none());
        assert!(decl.bean_factory_parameter().is_none());
        assert!(decl.bean_properties().is_empty());
        assert!(decl.nested_bean_declarations().is_empty());
        assert!(decl.constructor_args().is_empty());
    }

    #[test]
    fn test_basic_declaration_builder() {
        let decl = BasicBeanDeclaration::new()
            .with_factory("pool")
            .with_factory_parameter(10)
            .with_property("name", "main")
            .with_nested_list(
                "members",
                [BasicBeanDeclaration::new(), BasicBeanDeclaration::new()],
            );

        assert_eq!(decl.bean_factory_name(), Some("pool"));
        assert_eq!(
            decl.bean_factory_parameter(),
            Some(&ConfigValue::Integer(10))
        );
        assert_eq!(
            decl.bean_properties().get("name"),
            Some(&ConfigValue::from("main"))
        );
        match decl.nested_bean_declarations().get("members") {
            Some(NestedDeclaration::List(list)) => assert_eq!(list.len(), 2),
            other => panic!("unexpected nested entry: {other:?}"),
        }
    }
}
