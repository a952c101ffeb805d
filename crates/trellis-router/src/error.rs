//! Route configuration errors.

use thiserror::Error;

/// An error raised while registering a route.
///
/// These are configuration errors: a router that fails to register a route
/// is not safe to serve, so callers propagate them and abort startup. Each
/// variant names the template and the exact fragment at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A declaration does not split into exactly `name:type`.
    #[error("invalid path variable format in `{template}` :: {fragment}")]
    InvalidFormat {
        /// The full path template.
        template: String,
        /// The offending declaration, braces included.
        fragment: String,
    },

    /// A `{` is never closed.
    #[error("invalid path variable format in `{template}`: unterminated declaration :: {fragment}")]
    Unterminated {
        /// The full path template.
        template: String,
        /// Everything from the unclosed `{` to the end of the template.
        fragment: String,
    },

    /// The type tag is not one of `int`, `string` or `uuid`.
    #[error("invalid type \"{tag}\" in path variable declaration `{declaration}` of `{template}`")]
    InvalidType {
        /// The full path template.
        template: String,
        /// The unrecognised tag.
        tag: String,
        /// The raw declaration, braces included.
        declaration: String,
    },

    /// A path segment declares more than one variable, or a variable spans
    /// segments, so the segment cannot be matched unambiguously.
    #[error("ambiguous path segment `{segment}` in `{template}`: a segment may declare at most one variable")]
    AmbiguousSegment {
        /// The full path template.
        template: String,
        /// The offending segment.
        segment: String,
    },
}

impl RouteError {
    /// Returns the template the error refers to.
    #[must_use]
    pub fn template(&self) -> &str {
        match self {
            Self::InvalidFormat { template, .. }
            | Self::Unterminated { template, .. }
            | Self::InvalidType { template, .. }
            | Self::AmbiguousSegment { template, .. } => template,
        }
    }

    /// Returns `true` for malformed declarations (wrong field count or
    /// missing closing brace).
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. } | Self::Unterminated { .. })
    }
}
