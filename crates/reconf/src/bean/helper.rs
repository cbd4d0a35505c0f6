//! Entry point of the bean creation engine.

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use super::class::{BeanClass, ClassRegistry};
use super::declaration::{BeanDeclaration, NestedDeclaration};
use super::error::BeanError;
use super::factory::{BeanCreationContext, BeanFactory, DefaultBeanFactory};
use super::property::{BeanInstance, PropertyValue};

static GLOBAL: Lazy<BeanHelper> = Lazy::new(BeanHelper::new);

struct FactoryRegistry {
    named: HashMap<String, Arc<dyn BeanFactory>>,
    default: Arc<dyn BeanFactory>,
}

/// Creates beans from declarations.
///
/// Holds the factory registry (name to factory, plus one default factory)
/// and the class registry. Both can be changed while beans are being
/// created; a creation uses the factory and class it looked up first.
///
/// [`BeanHelper::global`] is a process-wide instance. Tests that change it
/// should restore what they change.
///
/// # Example
///
/// ```rust
/// use reconf::Bean;
/// use reconf::bean::{BasicBeanDeclaration, BeanClass, BeanHelper};
///
/// #[derive(Bean, Default)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// let helper = BeanHelper::new();
/// helper.register_class(BeanClass::of::<Server>("Server"))?;
///
/// let declaration = BasicBeanDeclaration::new()
///     .with_class("Server")
///     .with_property("host", "localhost")
///     .with_property("port", "8080");
///
/// let server: Server = helper.create_bean_as(&declaration)?;
/// assert_eq!(server.port, 8080);
/// # Ok::<(), reconf::bean::BeanError>(())
/// ```
pub struct BeanHelper {
    factories: RwLock<FactoryRegistry>,
    classes: ClassRegistry,
}

impl BeanHelper {
    /// A helper using [`DefaultBeanFactory`] as its default factory.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_factory(Arc::new(DefaultBeanFactory))
    }

    /// A helper using `factory` as its default factory.
    #[must_use]
    pub fn with_default_factory(factory: Arc<dyn BeanFactory>) -> Self {
        Self {
            factories: RwLock::new(FactoryRegistry {
                named: HashMap::new(),
                default: factory,
            }),
            classes: ClassRegistry::new(),
        }
    }

    /// The process-wide helper.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    // =========================================================================
    // Registries
    // =========================================================================

    /// Registers `factory` under `name`, returning the factory it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidArgument`] for an empty name.
    pub fn register_bean_factory(
        &self,
        name: impl Into<String>,
        factory: Arc<dyn BeanFactory>,
    ) -> Result<Option<Arc<dyn BeanFactory>>, BeanError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BeanError::invalid_argument("bean factory name must not be empty"));
        }
        debug!(factory = %name, "registering bean factory");
        Ok(self.factories.write().named.insert(name, factory))
    }

    /// Removes the factory registered under `name`.
    pub fn deregister_bean_factory(&self, name: &str) -> Option<Arc<dyn BeanFactory>> {
        self.factories.write().named.remove(name)
    }

    /// Names of all registered factories.
    #[must_use]
    pub fn registered_factory_names(&self) -> BTreeSet<String> {
        self.factories.read().named.keys().cloned().collect()
    }

    /// The factory used for declarations that name none.
    #[must_use]
    pub fn default_bean_factory(&self) -> Arc<dyn BeanFactory> {
        Arc::clone(&self.factories.read().default)
    }

    /// Replaces the default factory, returning the previous one.
    pub fn set_default_bean_factory(&self, factory: Arc<dyn BeanFactory>) -> Arc<dyn BeanFactory> {
        std::mem::replace(&mut self.factories.write().default, factory)
    }

    /// Registers a class, returning the class it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::InvalidArgument`] for an empty class name.
    pub fn register_class(&self, class: BeanClass) -> Result<Option<Arc<BeanClass>>, BeanError> {
        self.classes.register(class)
    }

    /// The class registry.
    #[must_use]
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates the bean described by `declaration`.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::UnknownFactory`], [`BeanError::ClassNotSpecified`]
    /// or [`BeanError::ClassNotFound`] if the declaration cannot be resolved,
    /// and [`BeanError::Creation`] wrapping whatever the factory reported.
    pub fn create_bean(&self, declaration: &dyn BeanDeclaration) -> Result<BeanInstance, BeanError> {
        self.create_bean_with(declaration, None, None)
    }

    /// Creates a bean with a fallback class and a parameter for the factory.
    ///
    /// The class is the declaration's class, else `default_class`, else the
    /// factory's default class.
    ///
    /// # Errors
    ///
    /// See [`create_bean`](Self::create_bean).
    pub fn create_bean_with(
        &self,
        declaration: &dyn BeanDeclaration,
        default_class: Option<&str>,
        parameter: Option<&(dyn Any + Send + Sync)>,
    ) -> Result<BeanInstance, BeanError> {
        self.create(declaration, default_class, parameter)
            .map(|(_, bean)| bean)
    }

    /// Creates a bean and downcasts it to `T`.
    ///
    /// If the declaration names no class, the class registered for `T` is
    /// used.
    ///
    /// # Errors
    ///
    /// See [`create_bean`](Self::create_bean); additionally
    /// [`BeanError::TypeMismatch`] if the bean is not a `T`.
    pub fn create_bean_as<T: Any>(&self, declaration: &dyn BeanDeclaration) -> Result<T, BeanError> {
        let default_class = self.classes.find_by_type(TypeId::of::<T>());
        let (class, bean) = self.create(
            declaration,
            default_class.as_ref().map(|class| class.name()),
            None,
        )?;
        bean.downcast::<T>()
            .map(|bean| *bean)
            .map_err(|_| BeanError::TypeMismatch {
                class,
                expected: type_name::<T>(),
            })
    }

    /// Sets the declaration's properties and nested beans on an existing
    /// bean. The bean's class is looked up by its type.
    ///
    /// # Errors
    ///
    /// Returns [`BeanError::ClassNotFound`] if no class is registered for the
    /// bean's type, and the errors of
    /// [`BeanCreationContext::init_bean`] otherwise.
    pub fn init_bean(
        &self,
        bean: &mut BeanInstance,
        declaration: &dyn BeanDeclaration,
    ) -> Result<(), BeanError> {
        let any: &dyn Any = &**bean;
        let type_id = any.type_id();
        let class = self
            .classes
            .find_by_type(type_id)
            .ok_or_else(|| BeanError::ClassNotFound {
                class: declaration
                    .bean_class_name()
                    .unwrap_or("<unregistered type>")
                    .to_string(),
            })?;
        self.init_bean_of_class(&class, bean, declaration)
    }

    fn create(
        &self,
        declaration: &dyn BeanDeclaration,
        default_class: Option<&str>,
        parameter: Option<&(dyn Any + Send + Sync)>,
    ) -> Result<(String, BeanInstance), BeanError> {
        let factory = self.factory_for(declaration)?;

        let class_name = declaration
            .bean_class_name()
            .or(default_class)
            .or_else(|| factory.default_bean_class())
            .ok_or(BeanError::ClassNotSpecified)?
            .to_string();

        let class = self
            .classes
            .get(&class_name)
            .ok_or_else(|| BeanError::ClassNotFound {
                class: class_name.clone(),
            })?;

        debug!(
            class = %class_name,
            factory = declaration.bean_factory_name().unwrap_or("<default>"),
            "creating bean"
        );

        let ctx = BeanCreationContext::new(self, class, declaration, parameter);
        let bean = factory
            .create_bean(&ctx)
            .map_err(|err| err.in_creation_of(&class_name))?;
        Ok((class_name, bean))
    }

    fn factory_for(&self, declaration: &dyn BeanDeclaration) -> Result<Arc<dyn BeanFactory>, BeanError> {
        let factories = self.factories.read();
        match declaration.bean_factory_name() {
            Some(name) => factories
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| BeanError::UnknownFactory {
                    name: name.to_string(),
                }),
            None => Ok(Arc::clone(&factories.default)),
        }
    }

    pub(crate) fn init_bean_of_class(
        &self,
        class: &BeanClass,
        bean: &mut BeanInstance,
        declaration: &dyn BeanDeclaration,
    ) -> Result<(), BeanError> {
        for (name, value) in declaration.bean_properties() {
            class.set_property(bean, &name, PropertyValue::Value(value))?;
        }

        for (name, nested) in declaration.nested_bean_declarations() {
            if !class.has_property(&name) {
                return Err(BeanError::PropertyNotWritable {
                    property: name,
                    class: class.name().to_string(),
                });
            }
            let default_class = class.property_class(&name);
            let value = match nested {
                NestedDeclaration::Single(decl) => {
                    PropertyValue::Bean(self.create_bean_with(decl.as_ref(), default_class, None)?)
                }
                NestedDeclaration::List(decls) => PropertyValue::Beans(
                    decls
                        .iter()
                        .map(|decl| self.create_bean_with(decl.as_ref(), default_class, None))
                        .collect::<Result<_, _>>()?,
                ),
            };
            class.set_property(bean, &name, value)?;
        }

        Ok(())
    }
}

impl Default for BeanHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BeanHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanHelper")
            .field("factories", &self.registered_factory_names())
            .field("classes", &self.classes.names())
            .finish()
    }
}
