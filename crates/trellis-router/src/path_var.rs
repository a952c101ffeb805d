//! Path-variable declarations.
//!
//! A template such as `/users/{id:int}/files/{name:string}` declares typed
//! variables with `{name:type}`, where `type` is one of `int`, `string` or
//! `uuid`. [`parse_path_vars`] scans a template and returns the
//! declarations in order.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use trellis_core::PathValue;
use uuid::Uuid;

use crate::error::RouteError;

/// The value type of a path variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathVarType {
    /// Signed 64-bit integer (`int`).
    Int,
    /// Any non-empty segment (`string`).
    String,
    /// A UUID (`uuid`).
    Uuid,
}

impl PathVarType {
    /// Returns the tag used in templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::String => "string",
            Self::Uuid => "uuid",
        }
    }

    /// Parses a raw path segment as a value of this type.
    ///
    /// Returns `None` if the segment is empty or does not parse.
    #[must_use]
    pub fn parse_value(self, raw: &str) -> Option<PathValue> {
        if raw.is_empty() {
            return None;
        }
        match self {
            Self::Int => raw.parse::<i64>().ok().map(PathValue::Int),
            Self::String => Some(PathValue::String(raw.to_string())),
            Self::Uuid => Uuid::parse_str(raw).ok().map(PathValue::Uuid),
        }
    }
}

impl fmt::Display for PathVarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a type tag is not `int`, `string` or `uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown path variable type \"{0}\"")]
pub struct UnknownPathVarType(pub String);

impl FromStr for PathVarType {
    type Err = UnknownPathVarType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "string" => Ok(Self::String),
            "uuid" => Ok(Self::Uuid),
            other => Err(UnknownPathVarType(other.to_string())),
        }
    }
}

/// A variable declared in a path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathVar {
    name: String,
    var_type: PathVarType,
}

impl PathVar {
    /// Creates a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, var_type: PathVarType) -> Self {
        Self {
            name: name.into(),
            var_type,
        }
    }

    /// Returns the variable name. May be empty.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn var_type(&self) -> PathVarType {
        self.var_type
    }
}

impl fmt::Display for PathVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}:{}}}", self.name, self.var_type)
    }
}

/// Parses every `{name:type}` declaration in `template`, left to right.
///
/// Text outside braces is ignored. Reading stops at the first `}` after a
/// `{`, so braces do not nest.
///
/// # Errors
///
/// - [`RouteError::Unterminated`] if a `{` has no closing `}`.
/// - [`RouteError::InvalidFormat`] if a declaration does not contain
///   exactly one `:`.
/// - [`RouteError::InvalidType`] if the tag is not `int`, `string` or
///   `uuid`.
///
/// # Example
///
/// ```
/// use trellis_router::{parse_path_vars, PathVarType};
///
/// let vars = parse_path_vars("/users/{id:int}/posts/{slug:string}").unwrap();
/// assert_eq!(vars.len(), 2);
/// assert_eq!(vars[0].name(), "id");
/// assert_eq!(vars[0].var_type(), PathVarType::Int);
///
/// assert!(parse_path_vars("/users/{id:flot}").is_err());
/// ```
pub fn parse_path_vars(template: &str) -> Result<Vec<PathVar>, RouteError> {
    let mut vars = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(RouteError::Unterminated {
                template: template.to_string(),
                fragment: rest[open..].to_string(),
            });
        };

        vars.push(parse_declaration(template, &after[..close])?);
        rest = &after[close + 1..];
    }

    Ok(vars)
}

fn parse_declaration(template: &str, declaration: &str) -> Result<PathVar, RouteError> {
    let mut fields = declaration.split(':');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(name), Some(tag), None) => {
            let var_type = tag.parse().map_err(|_| RouteError::InvalidType {
                template: template.to_string(),
                tag: tag.to_string(),
                declaration: format!("{{{declaration}}}"),
            })?;
            Ok(PathVar::new(name, var_type))
        }
        _ => Err(RouteError::InvalidFormat {
            template: template.to_string(),
            fragment: format!("{{{declaration}}}"),
        }),
    }
}
