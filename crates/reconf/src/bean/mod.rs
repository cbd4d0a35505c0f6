//! Declarative bean creation.
//!
//! A *bean* is an object created from a [`BeanDeclaration`]: a class name,
//! literal properties, nested declarations and constructor arguments. The
//! [`BeanHelper`] resolves the factory and class, lets the factory construct
//! the instance, and then writes the properties.
//!
//! Rust has no runtime reflection, so every creatable type is described by a
//! [`BeanClass`] registered under a name. `#[derive(Bean)]` generates the
//! property setters; constructors are added with [`BeanClass::builder`].
//!
//! # Example
//!
//! ```rust
//! use reconf::Bean;
//! use reconf::bean::{BasicBeanDeclaration, BeanClass, BeanHelper, ConstructorArg, ParamType};
//!
//! #[derive(Bean, Default)]
//! struct Address {
//!     city: String,
//! }
//!
//! #[derive(Bean)]
//! struct Person {
//!     #[bean(skip)]
//!     name: String,
//!     age: u32,
//!     #[bean(nested)]
//!     address: Option<Address>,
//! }
//!
//! let helper = BeanHelper::new();
//! helper.register_class(BeanClass::of::<Address>("Address"))?;
//! helper.register_class(
//!     BeanClass::builder::<Person>("Person")
//!         .with_properties()
//!         .constructor([ParamType::String], |mut args| {
//!             Ok(Person { name: args.take(0)?, age: 0, address: None })
//!         })
//!         .build(),
//! )?;
//!
//! let declaration = BasicBeanDeclaration::new()
//!     .with_class("Person")
//!     .with_constructor_arg(ConstructorArg::value("Ada"))
//!     .with_property("age", 36)
//!     .with_nested("address", BasicBeanDeclaration::new().with_property("city", "London"));
//!
//! let person: Person = helper.create_bean_as(&declaration)?;
//! assert_eq!(person.name, "Ada");
//! assert_eq!(person.address.map(|a| a.city).as_deref(), Some("London"));
//! # Ok::<(), reconf::bean::BeanError>(())
//! ```

mod class;
mod declaration;
mod error;
mod factory;
mod helper;
mod matching;
mod property;
mod tree;

pub use class::{
    BeanClass, BeanClassBuilder, BeanProperties, ClassRegistry, Constructor, ConstructorArgs,
    ParamType,
};
pub use declaration::{
    ArgValue, BasicBeanDeclaration, BeanDeclaration, ConstructorArg, NestedDeclaration,
};
pub use error::{BeanError, PropertyError};
pub use factory::{BeanCreationContext, BeanFactory, DefaultBeanFactory};
pub use helper::BeanHelper;
pub use matching::find_constructor;
pub use property::{BeanInstance, FromPropertyValue, PropertyValue};
pub use tree::{
    KEY_ARG_BEAN, KEY_ARG_TYPE, KEY_ARG_VALUE, KEY_CLASS, KEY_CONSTRUCTOR_ARG, KEY_FACTORY,
    KEY_FACTORY_PARAM, RESERVED_PREFIX,
};
