//! Generation of the `BeanProperties` impl.
//!
//! For
//!
//! ```ignore
//! #[derive(Bean)]
//! struct Person {
//!     name: String,
//!     #[bean(nested)]
//!     address: Option<Address>,
//! }
//! ```
//!
//! the expander produces a setter dispatching on the property name, the list
//! of property names, and the default class of every nested property.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DeriveInput, Error as SynError, Field, Fields, Result as SynResult};

use crate::field::{BeanField, FieldKind, Shape};

/// The main orchestrator for macro expansion.
pub struct Expander;

impl Expander {
    /// Main entry point for expanding the derive macro.
    pub fn expand(input: &DeriveInput) -> SynResult<TokenStream> {
        let struct_name = &input.ident;
        let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

        let mut fields = Vec::new();
        for field in Self::extract_struct_fields(input)? {
            if let Some(bean_field) = BeanField::parse(field)? {
                fields.push(bean_field);
            }
        }
        Self::check_unique_names(input, &fields)?;

        let setters = fields.iter().map(Self::generate_setter);
        let names = fields.iter().map(|f| f.property.as_str());
        let classes = fields.iter().filter_map(|f| match &f.kind {
            FieldKind::Nested { class, .. } => {
                let property = &f.property;
                Some(quote! { #property => ::core::option::Option::Some(#class), })
            }
            FieldKind::Value => None,
        });

        let expanded = quote! {
            impl #impl_generics ::reconf::bean::BeanProperties for #struct_name #ty_generics #where_clause {
                fn set_property(
                    &mut self,
                    name: &str,
                    value: ::reconf::bean::PropertyValue,
                ) -> ::core::result::Result<(), ::reconf::bean::PropertyError> {
                    match name {
                        #(#setters)*
                        _ => return ::core::result::Result::Err(
                            ::reconf::bean::PropertyError::NotWritable
                        ),
                    }
                    ::core::result::Result::Ok(())
                }

                fn property_names() -> &'static [&'static str] {
                    &[#(#names),*]
                }

                fn property_class(name: &str) -> ::core::option::Option<&'static str> {
                    match name {
                        #(#classes)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        };

        Ok(expanded.into())
    }

    fn generate_setter(field: &BeanField) -> QuoteStream {
        let ident = &field.ident;
        let property = &field.property;

        let assign = match &field.kind {
            FieldKind::Value => {
                let ty = &field.ty;
                quote! {
                    self.#ident = <#ty as ::reconf::bean::FromPropertyValue>::from_property_value(value)?;
                }
            }
            FieldKind::Nested { shape: Shape::Single, bean, .. } => quote! {
                self.#ident = value.into_bean::<#bean>()?;
            },
            FieldKind::Nested { shape: Shape::Optional, bean, .. } => quote! {
                self.#ident = match value {
                    ::reconf::bean::PropertyValue::Value(::reconf::ConfigValue::None) => {
                        ::core::option::Option::None
                    }
                    other => ::core::option::Option::Some(other.into_bean::<#bean>()?),
                };
            },
            FieldKind::Nested { shape: Shape::List, bean, .. } => quote! {
                self.#ident = value.into_beans::<#bean>()?;
            },
        };

        quote! {
            #property => { #assign }
        }
    }

    fn check_unique_names(input: &DeriveInput, fields: &[BeanField]) -> SynResult<()> {
        let mut seen = HashSet::new();
        for field in fields {
            if !seen.insert(field.property.as_str()) {
                return Err(SynError::new_spanned(
                    &field.ident,
                    format!(
                        "duplicate property name `{}` in `{}`",
                        field.property, input.ident
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Extract named fields from the struct, rejecting invalid types.
    fn extract_struct_fields(input: &DeriveInput) -> SynResult<&Punctuated<Field, Comma>> {
        match &input.data {
            Data::Struct(data_struct) => match &data_struct.fields {
                Fields::Named(fields_named) => Ok(&fields_named.named),

                Fields::Unnamed(_) => Err(SynError::new_spanned(
                    input,
                    "Bean does not support tuple structs",
                )),

                Fields::Unit => Err(SynError::new_spanned(
                    input,
                    "Bean does not support unit structs",
                )),
            },

            Data::Enum(_) => Err(SynError::new_spanned(
                input,
                "Bean can only be derived for structs, not enums",
            )),

            Data::Union(_) => Err(SynError::new_spanned(
                input,
                "Bean can only be derived for structs, not unions",
            )),
        }
    }
}
