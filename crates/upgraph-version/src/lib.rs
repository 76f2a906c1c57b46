//! Upgraph version model
//!
//! Versions identify the state of a persistent store. They are immutable,
//! comparable and hierarchical, so independently versioned sub-systems can be
//! composed into one identifier.
//!
//! # Grammar
//!
//! ```text
//! 1.2.3                     scalar, bare
//! "1.2.3.beta"              scalar, quoted, with qualifier
//! ["0.0.1", "0.2.0"]        ordered composite
//! {"core": "1.0.0", "search": ["0.0.1"]}   keyed composite
//! ```
//!
//! `Display` always yields the canonical form: quoted scalars and `, `
//! separators.
//!
//! # Usage
//!
//! ```rust
//! use upgraph_version::Version;
//! use std::cmp::Ordering;
//!
//! let current = Version::lookup("[0.0.1, 0.0.1]").unwrap();
//! let target = Version::lookup("[0.0.1, 0.0.2]").unwrap();
//! assert_eq!(current.compare(&target).unwrap(), Ordering::Less);
//!
//! let marker = current.transition_to(&target).unwrap();
//! assert_eq!(marker.to_string(), r#"["0.0.1", "0.0.1.transition"]"#);
//! assert!(Version::lookup("1.2.3.4.5").is_none());
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod scalar;
pub mod span;
pub mod version;

pub use error::{ParseError, Shape, VersionError};
pub use scalar::{ScalarVersion, TRANSITION_MARKER};
pub use span::Span;
pub use version::{Component, Selector, Version};

/// Parse version text with a diagnostic on failure.
///
/// # Example
///
/// ```rust
/// use upgraph_version::parse;
///
/// let err = parse("[0.0.1, latest]").unwrap_err();
/// assert!(err.format_with_source("[0.0.1, latest]").contains("line 1"));
/// ```
pub fn parse(source: &str) -> Result<Version, ParseError> {
    parser::parse(source)
}
