//! Constructor overload resolution.
//!
//! Each argument is rated against each parameter as an exact match, a
//! convertible match, or incompatible:
//!
//! | Argument | Exact for | Convertible to |
//! |----------|-----------|----------------|
//! | any, with a type hint | the hinted type | |
//! | text | | `String`, `int`, `float`, `bool`, `any` |
//! | integer | `int` | `float`, `String`, `any` |
//! | float | `float` | `String`, `any` |
//! | boolean | `bool` | `String`, `any` |
//! | none | | `String`, beans, `any` |
//! | nested declaration | a bean of its class | a bean of any class if it names none, `any` |
//!
//! A constructor is a candidate if it has one parameter per argument and
//! every argument is compatible. The candidate with the most exact matches
//! wins; a tie is an ambiguity error.

use super::class::{BeanClass, Constructor, ParamType};
use super::declaration::{ArgValue, ConstructorArg};
use super::error::BeanError;
use crate::value::ConfigValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fit {
    Exact,
    Convertible,
}

fn literal_fit(value: &ConfigValue, param: &ParamType) -> Option<Fit> {
    use ConfigValue as V;
    use ParamType as P;

    match (value, param) {
        (_, P::Any) => Some(Fit::Convertible),

        (V::String(_), P::String | P::Int | P::Float | P::Bool) => Some(Fit::Convertible),

        (V::Integer(_) | V::UnsignedInteger(_), P::Int) => Some(Fit::Exact),
        (V::Integer(_) | V::UnsignedInteger(_), P::Float | P::String) => Some(Fit::Convertible),

        (V::Float(_), P::Float) => Some(Fit::Exact),
        (V::Boolean(_), P::Bool) => Some(Fit::Exact),
        (V::Float(_) | V::Boolean(_), P::String) => Some(Fit::Convertible),

        (V::None, P::String | P::Bean(_)) => Some(Fit::Convertible),

        _ => None,
    }
}

fn argument_fit(arg: &ConstructorArg, param: &ParamType) -> Option<Fit> {
    if let Some(hint) = arg.type_name() {
        let hinted = ParamType::from_name(hint);
        if hinted != *param {
            return None;
        }
        let shape_fits = match arg.arg_value() {
            ArgValue::Nested(_) => !param.is_scalar(),
            ArgValue::Literal(value) => param.is_scalar() || matches!(param, ParamType::Any) || value.is_none(),
        };
        return shape_fits.then_some(Fit::Exact);
    }

    match (arg.arg_value(), param) {
        (ArgValue::Literal(value), param) => literal_fit(value, param),
        (ArgValue::Nested(decl), ParamType::Bean(class)) => match decl.bean_class_name() {
            Some(name) if name == class => Some(Fit::Exact),
            Some(_) => None,
            None => Some(Fit::Convertible),
        },
        (ArgValue::Nested(_), ParamType::Any) => Some(Fit::Convertible),
        (ArgValue::Nested(_), _) => None,
    }
}

/// Number of exact matches, or `None` if some argument does not fit.
fn score(constructor: &Constructor, args: &[ConstructorArg]) -> Option<usize> {
    if constructor.arity() != args.len() {
        return None;
    }
    constructor
        .params()
        .iter()
        .zip(args)
        .try_fold(0, |exact, (param, arg)| {
            argument_fit(arg, param).map(|fit| exact + usize::from(fit == Fit::Exact))
        })
}

/// Formats the arguments as `[(value=a, type=<none>), (value=1, type=int)]`.
pub(crate) fn describe_arguments(args: &[ConstructorArg]) -> String {
    let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Selects the constructor to use for `args`.
///
/// Without arguments the no-argument constructor is used.
///
/// # Errors
///
/// Returns [`BeanError::NoMatchingConstructor`] if no constructor accepts the
/// arguments and [`BeanError::AmbiguousConstructor`] if several accept them
/// equally well.
pub fn find_constructor<'a>(
    class: &'a BeanClass,
    args: &[ConstructorArg],
) -> Result<&'a Constructor, BeanError> {
    let no_match = || BeanError::NoMatchingConstructor {
        class: class.name().to_string(),
        arguments: describe_arguments(args),
    };

    if args.is_empty() {
        return class.default_constructor().ok_or_else(no_match);
    }

    let mut best: Option<(usize, &Constructor)> = None;
    let mut tied = false;

    for constructor in class.constructors() {
        let Some(exact) = score(constructor, args) else {
            continue;
        };
        match best {
            Some((best_exact, _)) if exact < best_exact => {}
            Some((best_exact, _)) if exact == best_exact => tied = true,
            _ => {
                best = Some((exact, constructor));
                tied = false;
            }
        }
    }

    match best {
        None => Err(no_match()),
        Some(_) if tied => Err(BeanError::AmbiguousConstructor {
            class: class.name().to_string(),
            arguments: describe_arguments(args),
        }),
        Some((_, constructor)) => Ok(constructor),
    }
}

/// Converts a literal argument to the canonical form of `param`.
///
/// Returns `None` if the literal has no such form.
pub(crate) fn convert_literal(value: &ConfigValue, param: &ParamType) -> Option<ConfigValue> {
    match param {
        ParamType::String => match value {
            ConfigValue::None => Some(ConfigValue::None),
            other if other.is_scalar() => Some(ConfigValue::String(other.to_string())),
            _ => None,
        },
        ParamType::Int => match value {
            ConfigValue::UnsignedInteger(n) => Some(ConfigValue::UnsignedInteger(*n)),
            other => other
                .to_i64()
                .map(ConfigValue::Integer)
                .or_else(|| other.to_u64().map(ConfigValue::UnsignedInteger)),
        },
        ParamType::Float => value.to_f64().map(ConfigValue::Float),
        ParamType::Bool => value.to_bool().map(ConfigValue::Boolean),
        ParamType::Bean(_) | ParamType::Any => Some(value.clone()),
    }
}
