//! Compiled path templates.
//!
//! A template is split on `/` into segments. A segment is either a literal
//! or holds exactly one variable, optionally surrounded by literal text
//! inside the same segment (`/files/{name:string}.json`).
//!
//! Matching a concrete path succeeds when the path equals the template
//! string exactly, or when every segment lines up: literal segments compare
//! equal and each variable segment parses as its declared type. Path
//! segments are percent-decoded before comparison.

use trellis_core::{Params, PathValues};

use crate::error::RouteError;
use crate::path_var::{parse_path_vars, PathVar};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Var {
        prefix: String,
        suffix: String,
        index: usize,
    },
}

/// A parsed and validated path template.
#[derive(Debug, Clone)]
pub struct Template {
    raw: String,
    vars: Vec<PathVar>,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`parse_path_vars`], and
    /// [`RouteError::AmbiguousSegment`] if a segment declares more than one
    /// variable or a declaration spans a `/`.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let vars = parse_path_vars(raw)?;

        let mut segments = Vec::new();
        let mut index = 0;
        for segment in raw.split('/') {
            let Some(open) = segment.find('{') else {
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            };

            let ambiguous = || RouteError::AmbiguousSegment {
                template: raw.to_string(),
                segment: segment.to_string(),
            };
            let close = segment[open..]
                .find('}')
                .map(|offset| open + offset)
                .ok_or_else(ambiguous)?;
            let suffix = &segment[close + 1..];
            if suffix.contains('{') {
                return Err(ambiguous());
            }

            segments.push(Segment::Var {
                prefix: segment[..open].to_string(),
                suffix: suffix.to_string(),
                index,
            });
            index += 1;
        }
        debug_assert_eq!(index, vars.len());

        Ok(Self {
            raw: raw.to_string(),
            vars,
            segments,
        })
    }

    /// Returns the template as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the declared variables in order.
    #[must_use]
    pub fn vars(&self) -> &[PathVar] {
        &self.vars
    }

    /// Returns `true` if the template declares any variable.
    #[must_use]
    pub fn has_vars(&self) -> bool {
        !self.vars.is_empty()
    }

    /// Matches a request path against the template.
    ///
    /// Returns the raw and typed variable values on success. A literal
    /// match of the template string yields empty values.
    ///
    /// Path segments are percent-decoded after splitting on `/`, so an
    /// encoded `%2F` stays inside its segment. Bound values are decoded.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<(Params, PathValues)> {
        if self.raw == path {
            return Some((Params::new(), PathValues::new()));
        }

        let mut params = Params::new();
        let mut values = PathValues::new();
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = urlencoding::decode(parts.next()?).ok()?;
            match segment {
                Segment::Literal(literal) => {
                    if *literal != part {
                        return None;
                    }
                }
                Segment::Var {
                    prefix,
                    suffix,
                    index,
                } => {
                    let raw = part
                        .strip_prefix(prefix.as_str())?
                        .strip_suffix(suffix.as_str())?;
                    let var = self.vars.get(*index)?;
                    let value = var.var_type().parse_value(raw)?;
                    params.push(var.name(), raw);
                    values.push(var.name(), value);
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some((params, values))
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
