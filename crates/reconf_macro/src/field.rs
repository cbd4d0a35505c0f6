//! Field classification.
//!
//! A field is either a literal property or a nested bean. Nested beans come
//! in three shapes, decided by the field type:
//!
//! | Field type | Shape |
//! |------------|-------|
//! | `Option<T>` | [`Shape::Optional`] |
//! | `Vec<T>` | [`Shape::List`] |
//! | anything else | [`Shape::Single`] |

use syn::{Error as SynError, Field, GenericArgument, Ident, PathArguments, Result as SynResult, Type};

use crate::parse::Parser;

/// How a nested bean is stored in its field.
pub enum Shape {
    Single,
    Optional,
    List,
}

pub enum FieldKind {
    /// Converted with `FromPropertyValue`.
    Value,

    /// Holds beans of type `bean`.
    Nested {
        shape: Shape,
        bean: Type,
        class: String,
    },
}

/// A field that is a property.
pub struct BeanField {
    pub ident: Ident,
    pub ty: Type,
    pub property: String,
    pub kind: FieldKind,
}

impl BeanField {
    /// Classifies `field`; `None` for skipped fields.
    pub fn parse(field: &Field) -> SynResult<Option<Self>> {
        let attr = Parser::parse_field(field)?;
        if attr.skip {
            return Ok(None);
        }

        let ident = field
            .ident
            .clone()
            .ok_or_else(|| SynError::new_spanned(field, "Bean requires named fields"))?;

        let property = attr
            .rename
            .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

        let kind = if attr.nested {
            let (shape, bean) = if let Some(inner) = generic_inner(&field.ty, "Option") {
                (Shape::Optional, inner.clone())
            } else if let Some(inner) = generic_inner(&field.ty, "Vec") {
                (Shape::List, inner.clone())
            } else {
                (Shape::Single, field.ty.clone())
            };

            let class = match attr.class {
                Some(class) => class,
                None => type_ident(&bean)
                    .ok_or_else(|| {
                        SynError::new_spanned(
                            &bean,
                            "cannot derive a class name from this type; add #[bean(class = \"...\")]",
                        )
                    })?
                    .to_string(),
            };

            FieldKind::Nested { shape, bean, class }
        } else {
            FieldKind::Value
        };

        Ok(Some(Self {
            ident,
            ty: field.ty.clone(),
            property,
            kind,
        }))
    }
}

/// Returns `T` if `ty` is `wrapper<T>` (matched on the last path segment).
fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };

    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };

    let GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };

    Some(inner)
}

/// The last path segment's identifier, e.g. `Address` for `crate::model::Address`.
fn type_ident(ty: &Type) -> Option<&Ident> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    type_path.path.segments.last().map(|segment| &segment.ident)
}
