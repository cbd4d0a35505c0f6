//! # reconf_macro
//!
//! Procedural macro implementation for the `reconf` crate.
//!
//! This crate provides `#[derive(Bean)]`, which generates the property
//! setters the bean creation engine uses to initialise objects from
//! declarations. It is a proc-macro crate and can only export procedural
//! macros.
//!
//! **Note:** Users should depend on the `reconf` crate, not this one directly.
//! `reconf` re-exports the macro.
//!
//! # Module Structure
//!
//! - `parse` - Attribute parsing for `#[bean(...)]`
//! - `field` - Field classification (literal vs nested bean, and its shape)
//! - `expand` - Generation of the `BeanProperties` impl

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expand;
mod field;
mod parse;

/// Derive macro implementing `reconf::bean::BeanProperties`.
///
/// Every named field becomes a writable property. Literal fields are
/// converted with `FromPropertyValue`; fields marked `nested` receive beans
/// created from nested declarations.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `rename = "name"` | Property name (default: the field name) |
/// | `skip` | Not a property |
/// | `nested` | Field holds a bean: `T`, `Option<T>` or `Vec<T>` |
/// | `class = "Name"` | Class for nested declarations without one; implies `nested` |
///
/// Without `class`, nested declarations default to the class named like the
/// field's bean type.
///
/// # Example
///
/// ```ignore
/// use reconf::Bean;
///
/// #[derive(Bean, Default)]
/// struct Server {
///     host: String,
///
///     #[bean(rename = "listenPort")]
///     port: u16,
///
///     #[bean(nested)]
///     tls: Option<Tls>,
///
///     #[bean(class = "Backend")]
///     backends: Vec<Upstream>,
///
///     #[bean(skip)]
///     connections: usize,
/// }
/// ```
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::Expander::expand(&input).unwrap_or_else(|err| err.to_compile_error().into())
}
