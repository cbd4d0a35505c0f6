//! Attribute parsing for `#[bean(rename = "x", skip, nested, class = "Name")]`.
//!
//! Options are collected one at a time by [`Parser::parse_meta`] and checked
//! for conflicts by [`Parser::build`]. Duplicate and unknown options are
//! reported with the span of the offending token.

use std::collections::HashSet;

use syn::meta::ParseNestedMeta;
use syn::{Error as SynError, Field, LitStr, Result as SynResult};

/// Parsed `#[bean(...)]` options of one field.
#[derive(Clone, Debug, Default)]
pub struct BeanAttr {
    /// Property name, if different from the field name.
    pub rename: Option<String>,

    /// The field is not a property.
    pub skip: bool,

    /// The field holds a bean.
    pub nested: bool,

    /// Default class for nested declarations.
    pub class: Option<String>,
}

/// Accumulates options from the `#[bean(...)]` attributes of a field.
#[derive(Default)]
pub struct Parser {
    seen: HashSet<&'static str>,
    attr: BeanAttr,
}

impl Parser {
    #[expect(
        clippy::needless_pass_by_value,
        reason = "ParseNestedMeta is passed by value per syn's parse_nested_meta callback signature"
    )]
    fn parse_meta(&mut self, meta: ParseNestedMeta) -> SynResult<()> {
        let ident = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("Expected Identifier"))?;
        let name = ident.to_string();

        let key: &'static str = match name.as_str() {
            "rename" => "rename",
            "skip" => "skip",
            "nested" => "nested",
            "class" => "class",
            _ => return Err(meta.error(format!("Unknown option `{name}`"))),
        };

        if !self.seen.insert(key) {
            return Err(meta.error(format!("Duplicate option: `{key}`")));
        }

        match key {
            "rename" => {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(SynError::new_spanned(lit, "property name must not be empty"));
                }
                self.attr.rename = Some(lit.value());
            }
            "class" => {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().trim().is_empty() {
                    return Err(SynError::new_spanned(lit, "class name must not be empty"));
                }
                self.attr.class = Some(lit.value());
                self.attr.nested = true;
            }
            "skip" => self.attr.skip = true,
            "nested" => self.attr.nested = true,
            _ => unreachable!("option names are checked above"),
        }

        Ok(())
    }

    fn build(self, field: &Field) -> SynResult<BeanAttr> {
        if self.attr.skip {
            let conflicts: Vec<_> = ["rename", "nested", "class"]
                .into_iter()
                .filter(|key| self.seen.contains(key))
                .collect();
            if !conflicts.is_empty() {
                return Err(SynError::new_spanned(
                    field,
                    format!("`skip` cannot be combined with: {}", conflicts.join(", ")),
                ));
            }
        }
        Ok(self.attr)
    }

    /// Parses all `#[bean(...)]` attributes of `field`.
    pub fn parse_field(field: &Field) -> SynResult<BeanAttr> {
        let mut parser = Self::default();
        for attr in &field.attrs {
            if attr.path().is_ident("bean") {
                attr.parse_nested_meta(|meta| parser.parse_meta(meta))?;
            }
        }
        parser.build(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_plain_field() {
        let field: Field = parse_quote!(host: String);
        let attr = Parser::parse_field(&field).unwrap();
        assert!(!attr.skip && !attr.nested);
        assert!(attr.rename.is_none());
    }

    #[test]
    fn test_class_implies_nested() {
        let field: Field = parse_quote!(#[bean(class = "Address", rename = "addr")] address: Location);
        let attr = Parser::parse_field(&field).unwrap();
        assert!(attr.nested);
        assert_eq!(attr.class.as_deref(), Some("Address"));
        assert_eq!(attr.rename.as_deref(), Some("addr"));
    }

    #[test]
    fn test_errors() {
        let unknown: Field = parse_quote!(#[bean(secret)] key: String);
        assert!(Parser::parse_field(&unknown).is_err());

        let duplicate: Field = parse_quote!(#[bean(nested, nested)] a: A);
        assert!(Parser::parse_field(&duplicate).is_err());

        let conflict: Field = parse_quote!(#[bean(skip, rename = "x")] a: A);
        let err = Parser::parse_field(&conflict).unwrap_err();
        assert!(err.to_string().contains("rename"));
    }
}
