//! Error types for version parsing and version operations.

use crate::span::{offset_to_line_col, Span};
use std::cmp::Ordering;
use thiserror::Error;

/// Error during lexing/parsing of version text.
#[derive(Debug, Clone, Error)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = offset_to_line_col(source, self.span.start);
        let mut result = format!("error: {}\n", self.message);
        result.push_str(&format!("  --> line {}:{}\n", line, col));

        if let Some(source_line) = source.lines().nth(line - 1) {
            result.push_str(&format!("   |\n{:3}| {}\n   | ", line, source_line));
            result.push_str(&" ".repeat(col - 1));
            result.push('^');

            let remaining = source_line.chars().count().saturating_sub(col);
            let span_len = self.span.len().min(remaining + 1);
            if span_len > 1 {
                result.push_str(&"~".repeat(span_len - 1));
            }
            result.push('\n');
        }

        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }

        result
    }
}

/// Shape of a version component, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// `major.minor.micro[.qualifier]`
    Scalar,
    /// `[ v1, v2, ... ]`
    List,
    /// `{ "k": v, ... }`
    Map,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::List => write!(f, "list"),
            Shape::Map => write!(f, "map"),
        }
    }
}

/// Errors raised by operations on well-formed versions whose shapes do not fit.
///
/// These indicate a defect in the supplied graph or version data, not a
/// runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The two versions have shapes that can never be ordered.
    #[error("cannot compare {left} version with {right} version")]
    IncomparableShapes {
        /// Shape of the left operand.
        left: Shape,
        /// Shape of the right operand.
        right: Shape,
    },

    /// The shared keys of two maps order them against their sizes.
    #[error("map ordering conflict: shared keys compare {shared:?} but sizes compare {sizes:?}")]
    ConflictingMapOrder {
        /// Ordering over the keys present in both maps.
        shared: Ordering,
        /// Ordering of the map sizes.
        sizes: Ordering,
    },

    /// The operation is only defined on scalar versions.
    #[error("{operation} requires a scalar version, found {shape}")]
    NotScalar {
        /// Name of the operation.
        operation: &'static str,
        /// Shape that was found.
        shape: Shape,
    },

    /// Positional replace beyond the end of a list.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// Keyed access on a version that is not a map.
    #[error("keyed access on {shape} version")]
    KeyedAccess {
        /// Shape that was found.
        shape: Shape,
    },

    /// Positional access on a map version.
    #[error("positional access on map version")]
    IndexedAccessOnMap,

    /// Source and destination are identical, so there is nothing in transition.
    #[error("no transition between identical versions {version}")]
    NoDifference {
        /// Canonical form of the version.
        version: String,
    },

    /// The micro number cannot be incremented any further.
    #[error("no next version after {version}")]
    MicroOverflow {
        /// Canonical form of the version.
        version: String,
    },
}
