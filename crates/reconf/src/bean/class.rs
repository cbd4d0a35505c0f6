//! Class descriptions used in place of runtime reflection.
//!
//! A [`BeanClass`] tells the engine how to construct a type (its
//! constructors and their parameter types) and how to write its properties.
//! Classes are looked up by name in a [`ClassRegistry`].

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{BeanError, PropertyError};
use super::property::{BeanInstance, FromPropertyValue, PropertyValue};

/// Property access implemented by bean types.
///
/// Usually derived with `#[derive(Bean)]`:
///
/// ```rust
/// use reconf::Bean;
///
/// #[derive(Bean, Default)]
/// struct Server {
///     host: String,
///     #[bean(rename = "listenPort")]
///     port: u16,
/// }
/// ```
pub trait BeanProperties: Any + Send {
    /// Writes the property `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::NotWritable`] for unknown names and
    /// [`PropertyError::Conversion`] if the value does not fit the field.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError>;

    /// Names of all writable properties.
    fn property_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Default class for beans nested under `name`.
    fn property_class(name: &str) -> Option<&'static str>
    where
        Self: Sized;
}

/// Declared type of a constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Text.
    String,

    /// A boolean.
    Bool,

    /// Any integer type.
    Int,

    /// Any floating-point type.
    Float,

    /// A bean of the named class.
    Bean(String),

    /// Anything, including beans.
    Any,
}

impl ParamType {
    /// Maps a type name to a parameter type.
    ///
    /// Primitive names and their boxed or Rust spellings are the same type:
    /// `int`, `Integer`, `long`, `Long` and `i64` all map to
    /// [`ParamType::Int`]. Unknown names are bean class names.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "String" | "string" | "str" => Self::String,

            "boolean" | "Boolean" | "bool" => Self::Bool,

            "int" | "Integer" | "long" | "Long" | "short" | "Short" | "byte" | "Byte"
            | "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "usize" => Self::Int,

            "float" | "Float" | "double" | "Double" | "f32" | "f64" => Self::Float,

            "Object" | "any" | "Any" => Self::Any,

            other => Self::Bean(other.to_string()),
        }
    }

    /// Canonical name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bean(class) => class,
            Self::Any => "any",
        }
    }

    /// Returns `true` for the literal types.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::String | Self::Bool | Self::Int | Self::Float)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments passed to a constructor, already matched to its parameters.
///
/// Literals arrive converted to the parameter type: an `Int` parameter gets
/// an integer, a `String` parameter gets text, and so on.
#[derive(Debug)]
pub struct ConstructorArgs {
    class: String,
    values: Vec<Option<PropertyValue>>,
}

impl ConstructorArgs {
    pub(crate) fn new(class: &str, values: Vec<PropertyValue>) -> Self {
        Self {
            class: class.to_string(),
            values: values.into_iter().map(Some).collect(),
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a no-argument call.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes argument `index` converted to `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::ArgumentConversion`] if the argument is missing,
    /// was already taken, or does not convert.
    pub fn take<T: FromPropertyValue>(&mut self, index: usize) -> Result<T, BeanError> {
        let value = self.take_raw(index, T::TYPE_NAME)?;
        T::from_property_value(value).map_err(|err| self.conversion_error(index, T::TYPE_NAME, err))
    }

    /// Takes argument `index` as a nested bean of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::ArgumentConversion`] if the argument is missing or
    /// is not a bean of type `T`.
    pub fn take_bean<T: Any>(&mut self, index: usize) -> Result<T, BeanError> {
        let value = self.take_raw(index, type_name::<T>())?;
        value
            .into_bean::<T>()
            .map_err(|err| self.conversion_error(index, type_name::<T>(), err))
    }

    /// Takes argument `index` without conversion.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::ArgumentConversion`] if the argument is missing or
    /// was already taken.
    pub fn take_value(&mut self, index: usize) -> Result<PropertyValue, BeanError> {
        self.take_raw(index, "value")
    }

    fn take_raw(&mut self, index: usize, expected: &'static str) -> Result<PropertyValue, BeanError> {
        self.values
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| BeanError::ArgumentConversion {
                class: self.class.clone(),
                index,
                expected,
                value: "<missing>".to_string(),
            })
    }

    fn conversion_error(&self, index: usize, expected: &'static str, err: PropertyError) -> BeanError {
        let value = match err {
            PropertyError::Conversion { value, .. } => value,
            PropertyError::NotWritable => "<not writable>".to_string(),
        };
        BeanError::ArgumentConversion {
            class: self.class.clone(),
            index,
            expected,
            value,
        }
    }
}

type BuildFn = Arc<dyn Fn(ConstructorArgs) -> Result<BeanInstance, BeanError> + Send + Sync>;

/// A constructor: parameter types plus the function building the instance.
#[derive(Clone)]
pub struct Constructor {
    params: Vec<ParamType>,
    build: BuildFn,
}

impl Constructor {
    /// Declared parameter types.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Runs the constructor.
    ///
    /// # Errors
    ///
    /// Returns whatever the constructor function returns.
    pub fn invoke(&self, args: ConstructorArgs) -> Result<BeanInstance, BeanError> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

type SetFn = fn(&mut (dyn Any + Send), &str, PropertyValue) -> Result<(), PropertyError>;

#[derive(Clone, Copy)]
struct PropertyTable {
    set: SetFn,
    names: &'static [&'static str],
    class_of: fn(&str) -> Option<&'static str>,
}

fn set_erased<T: BeanProperties>(
    target: &mut (dyn Any + Send),
    name: &str,
    value: PropertyValue,
) -> Result<(), PropertyError> {
    match target.downcast_mut::<T>() {
        Some(bean) => bean.set_property(name, value),
        None => Err(PropertyError::NotWritable),
    }
}

/// Description of a bean type.
#[derive(Clone)]
pub struct BeanClass {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    constructors: Vec<Constructor>,
    properties: Option<PropertyTable>,
}

impl BeanClass {
    /// Start describing type `T` under `name`.
    pub fn builder<T: Any + Send>(name: impl Into<String>) -> BeanClassBuilder<T> {
        BeanClassBuilder {
            class: Self {
                name: name.into(),
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                constructors: Vec::new(),
                properties: None,
            },
            _marker: PhantomData,
        }
    }

    /// Class for a type with derived properties and a `Default` constructor.
    pub fn of<T: BeanProperties + Default>(name: impl Into<String>) -> Self {
        Self::builder::<T>(name)
            .with_properties()
            .default_constructor()
            .build()
    }

    /// The registered class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Rust type this class creates.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All constructors in declaration order.
    #[must_use]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// The no-argument constructor, if any.
    #[must_use]
    pub fn default_constructor(&self) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.params.is_empty())
    }

    /// Writable property names.
    #[must_use]
    pub fn property_names(&self) -> &'static [&'static str] {
        match self.properties {
            Some(table) => table.names,
            None => &[],
        }
    }

    /// Returns `true` if `name` can be written.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.property_names().contains(&name)
    }

    /// Default class for beans nested under property `name`.
    #[must_use]
    pub fn property_class(&self, name: &str) -> Option<&'static str> {
        self.properties.and_then(|table| (table.class_of)(name))
    }

    /// Writes property `name` of `bean`.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::PropertyNotWritable`] if the property does not
    /// exist (or `bean` is not an instance of this class) and
    /// [`BeanError::PropertyConversion`] if the value does not fit.
    pub fn set_property(
        &self,
        bean: &mut BeanInstance,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), BeanError> {
        let Some(table) = self.properties else {
            return Err(self.not_writable(name));
        };

        (table.set)(&mut **bean, name, value).map_err(|err| match err {
            PropertyError::NotWritable => self.not_writable(name),
            PropertyError::Conversion { expected, value } => BeanError::PropertyConversion {
                property: name.to_string(),
                class: self.name.clone(),
                expected,
                value,
            },
        })
    }

    fn not_writable(&self, property: &str) -> BeanError {
        BeanError::PropertyNotWritable {
            property: property.to_string(),
            class: self.name.clone(),
        }
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("constructors", &self.constructors)
            .field("properties", &self.property_names())
            .finish()
    }
}

/// Builder for [`BeanClass`].
pub struct BeanClassBuilder<T> {
    class: BeanClass,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send> BeanClassBuilder<T> {
    /// Adds a constructor taking `params`.
    ///
    /// `build` receives the arguments converted to the parameter types.
    #[must_use]
    pub fn constructor<F>(mut self, params: impl IntoIterator<Item = ParamType>, build: F) -> Self
    where
        F: Fn(ConstructorArgs) -> Result<T, BeanError> + Send + Sync + 'static,
    {
        self.class.constructors.push(Constructor {
            params: params.into_iter().collect(),
            build: Arc::new(move |args| build(args).map(|bean| Box::new(bean) as BeanInstance)),
        });
        self
    }

    /// Adds a no-argument constructor using `Default`.
    #[must_use]
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(std::iter::empty(), |_| Ok(T::default()))
    }

    /// Uses the type's [`BeanProperties`] for property access.
    #[must_use]
    pub fn with_properties(mut self) -> Self
    where
        T: BeanProperties,
    {
        self.class.properties = Some(PropertyTable {
            set: set_erased::<T>,
            names: T::property_names(),
            class_of: T::property_class,
        });
        self
    }

    /// Finish the description.
    #[must_use]
    pub fn build(self) -> BeanClass {
        self.class
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Name to class mapping, guarded by one read-write lock.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, Arc<BeanClass>>>,
}

impl ClassRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class` under its name, replacing a previous registration.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidArgument`] for an empty class name.
    pub fn register(&self, class: BeanClass) -> Result<Option<Arc<BeanClass>>, BeanError> {
        if class.name.trim().is_empty() {
            return Err(BeanError::invalid_argument("bean class name must not be empty"));
        }
        Ok(self
            .classes
            .write()
            .insert(class.name.clone(), Arc::new(class)))
    }

    /// Removes the class registered under `name`.
    pub fn deregister(&self, name: &str) -> Option<Arc<BeanClass>> {
        self.classes.write().remove(name)
    }

    /// Looks up a class by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<BeanClass>> {
        self.classes.read().get(name).cloned()
    }

    /// Looks up the class creating instances of `type_id`.
    ///
    /// If several names describe the same type, any of them may be returned.
    #[must_use]
    pub fn find_by_type(&self, type_id: TypeId) -> Option<Arc<BeanClass>> {
        self.classes
            .read()
            .values()
            .find(|class| class.type_id == type_id)
            .cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// All registered class names.
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.classes.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ConfigValue;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i64,
        label: String,
    }

    impl BeanProperties for Point {
        fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<(), PropertyError> {
            match name {
                "x" => self.x = FromPropertyValue::from_property_value(value)?,
                "label" => self.label = FromPropertyValue::from_property_value(value)?,
                _ => return Err(PropertyError::NotWritable),
            }
            Ok(())
        }

        fn property_names() -> &'static [&'static str] {
            &["x", "label"]
        }

        fn property_class(_name: &str) -> Option<&'static str> {
            None
        }
    }

    #[test]
    fn test_param_type_aliases() {
        for name in ["int", "Integer", "Long", "long", "i32", "u64"] {
            assert_eq!(ParamType::from_name(name), ParamType::Int, "{name}");
        }
        assert_eq!(ParamType::from_name("double"), ParamType::Float);
        assert_eq!(ParamType::from_name("boolean"), ParamType::Bool);
        assert_eq!(ParamType::from_name("str"), ParamType::String);
        assert_eq!(ParamType::from_name("Object"), ParamType::Any);
        assert_eq!(
            ParamType::from_name("Address"),
            ParamType::Bean("Address".to_string())
        );
    }

    #[test]
    fn test_class_of_sets_properties() {
        let class = BeanClass::of::<Point>("Point");
        assert!(class.default_constructor().is_some());
        assert!(class.has_property("label"));

        let mut bean = class
            .default_constructor()
            .unwrap()
            .invoke(ConstructorArgs::new("Point", Vec::new()))
            .unwrap();
        class
            .set_property(&mut bean, "x", ConfigValue::from("12").into())
            .unwrap();

        let point = bean.downcast::<Point>().unwrap();
        assert_eq!(point.x, 12);
    }

    #[test]
    fn test_set_property_errors_name_class_and_property() {
        let class = BeanClass::of::<Point>("Point");
        let mut bean: BeanInstance = Box::new(Point::default());

        let err = class
            .set_property(&mut bean, "y", ConfigValue::from(1).into())
            .unwrap_err();
        assert!(matches!(
            err,
            BeanError::PropertyNotWritable { ref property, ref class } if property == "y" && class == "Point"
        ));

        let err = class
            .set_property(&mut bean, "x", ConfigValue::from("abc").into())
            .unwrap_err();
        assert!(matches!(err, BeanError::PropertyConversion { expected: "i64", .. }));
    }

    #[test]
    fn test_class_without_properties() {
        let class = BeanClass::builder::<u32>("Counter")
            .constructor([ParamType::Int], |mut args| args.take::<u32>(0))
            .build();
        let mut bean: BeanInstance = Box::new(1u32);

        assert!(class.default_constructor().is_none());
        assert!(class.set_property(&mut bean, "x", ConfigValue::None.into()).is_err());
    }

    #[test]
    fn test_constructor_args_take() {
        let mut args = ConstructorArgs::new(
            "Point",
            vec![ConfigValue::from(5).into(), ConfigValue::from("a").into()],
        );
        assert_eq!(args.len(), 2);
        assert_eq!(args.take::<i64>(0).unwrap(), 5);
        assert!(args.take::<i64>(0).is_err());
        assert!(args.take::<u8>(1).is_err());
        assert!(args.take::<String>(2).is_err());
    }

    #[test]
    fn test_registry() {
        let registry = ClassRegistry::new();
        assert!(registry.register(BeanClass::of::<Point>("Point")).unwrap().is_none());
        assert!(registry.contains("Point"));
        assert_eq!(
            registry.find_by_type(TypeId::of::<Point>()).map(|c| c.name().to_string()),
            Some("Point".to_string())
        );

        let err = registry.register(BeanClass::of::<Point>(" ")).unwrap_err();
        assert!(matches!(err, BeanError::InvalidArgument { .. }));

        assert!(registry.deregister("Point").is_some());
        assert!(registry.names().is_empty());
    }
}
