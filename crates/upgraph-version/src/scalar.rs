//! Scalar `major.minor.micro[.qualifier]` versions.

use crate::error::ParseError;
use crate::span::Span;
use std::fmt;

/// Marker appended to a qualifier while a store is between two versions.
pub const TRANSITION_MARKER: &str = "transition";

/// A scalar version: three numeric components and an optional qualifier.
///
/// Ordering is numeric on `major`, `minor`, `micro`, then lexicographic on the
/// qualifier, with the empty qualifier sorting first. Field order matters for
/// the derived `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScalarVersion {
    major: u32,
    minor: u32,
    micro: u32,
    qualifier: String,
}

impl ScalarVersion {
    /// `0.0.0`, the version of a store nothing has been applied to.
    pub const INITIAL: ScalarVersion = ScalarVersion::new(0, 0, 0);

    /// Create a scalar version without a qualifier.
    pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Replace the qualifier.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> u32 {
        self.micro
    }

    /// The qualifier, empty when absent.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// True for `0.0.0` without a qualifier.
    pub fn is_initial(&self) -> bool {
        *self == Self::INITIAL
    }

    /// The next micro version; the qualifier is dropped. `None` when the
    /// micro number is exhausted.
    pub fn next(&self) -> Option<Self> {
        let micro = self.micro.checked_add(1)?;
        Some(Self::new(self.major, self.minor, micro))
    }

    /// This version marked as being in transition.
    ///
    /// The qualifier becomes `transition`, or `<prior>-transition` when one was
    /// already present.
    pub fn transition(&self) -> Self {
        let qualifier = if self.qualifier.is_empty() {
            TRANSITION_MARKER.to_string()
        } else {
            format!("{}-{}", self.qualifier, TRANSITION_MARKER)
        };
        self.clone().with_qualifier(qualifier)
    }

    /// True when the qualifier mentions `transition` in any case.
    pub fn is_transition(&self) -> bool {
        self.qualifier.to_ascii_lowercase().contains(TRANSITION_MARKER)
    }

    /// Parse scalar text that has already been isolated from the input.
    ///
    /// `span` locates `text` in the full source for diagnostics.
    pub(crate) fn parse_spanned(text: &str, span: Span) -> Result<Self, ParseError> {
        let parts: Vec<&str> = text.split('.').collect();
        if parts.len() < 3 || parts.len() > 4 {
            return Err(ParseError::new(
                format!("scalar version `{}` has {} components", text, parts.len()),
                span,
            )
            .with_hint("expected MAJOR.MINOR.MICRO[.QUALIFIER]"));
        }

        let number = |part: &str, name: &str| -> Result<u32, ParseError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::new(
                    format!("{} component `{}` is not a number", name, part),
                    span,
                ));
            }
            part.parse::<u32>().map_err(|_| {
                ParseError::new(format!("{} component `{}` is out of range", name, part), span)
            })
        };

        let major = number(parts[0], "major")?;
        let minor = number(parts[1], "minor")?;
        let micro = number(parts[2], "micro")?;

        let qualifier = match parts.get(3) {
            Some(q) if is_valid_qualifier(q) => q.to_string(),
            Some(q) => {
                return Err(ParseError::new(format!("invalid qualifier `{}`", q), span)
                    .with_hint("qualifiers use letters, digits, `_` and `-`"))
            }
            None => String::new(),
        };

        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

fn is_valid_qualifier(q: &str) -> bool {
    !q.is_empty()
        && q
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl fmt::Display for ScalarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ScalarVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_spanned(s, Span::new(0, s.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let v: ScalarVersion = "1.2.3".parse().unwrap();
        assert_eq!((v.major(), v.minor(), v.micro()), (1, 2, 3));
        assert_eq!(v.qualifier(), "");

        let v: ScalarVersion = "1.2.3.rc-1".parse().unwrap();
        assert_eq!(v.qualifier(), "rc-1");
        assert_eq!(v.to_string(), "1.2.3.rc-1");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("1.2".parse::<ScalarVersion>().is_err());
        assert!("1.2.3.4.5".parse::<ScalarVersion>().is_err());
        assert!("a.b.c".parse::<ScalarVersion>().is_err());
        assert!("1.2.3.".parse::<ScalarVersion>().is_err());
        assert!("1.2.99999999999".parse::<ScalarVersion>().is_err());
        assert!("1.-2.3".parse::<ScalarVersion>().is_err());
    }

    #[test]
    fn test_ordering() {
        let a = ScalarVersion::new(1, 2, 3);
        let b = ScalarVersion::new(1, 10, 0);
        assert!(a < b);

        // Numeric, not lexicographic
        assert!(ScalarVersion::new(0, 0, 9) < ScalarVersion::new(0, 0, 10));

        // Qualified sorts after unqualified, before the next micro
        let q = a.clone().with_qualifier("transition");
        assert!(a < q);
        assert!(q < a.next().unwrap());
    }

    #[test]
    fn test_next_drops_qualifier() {
        let v = ScalarVersion::new(0, 0, 1).with_qualifier("beta");
        assert_eq!(v.next(), Some(ScalarVersion::new(0, 0, 2)));
    }

    #[test]
    fn test_next_at_micro_limit() {
        assert_eq!(ScalarVersion::new(1, 0, u32::MAX).next(), None);
    }

    #[test]
    fn test_transition_qualifier() {
        let v = ScalarVersion::new(0, 0, 1);
        assert_eq!(v.transition().qualifier(), "transition");
        assert!(v.transition().is_transition());
        assert!(!v.is_transition());

        let v = v.with_qualifier("beta");
        assert_eq!(v.transition().qualifier(), "beta-transition");
    }

    #[test]
    fn test_transition_detection_is_case_insensitive() {
        let v = ScalarVersion::new(1, 0, 0).with_qualifier("In-TRANSITION");
        assert!(v.is_transition());
    }

    #[test]
    fn test_initial() {
        assert!(ScalarVersion::INITIAL.is_initial());
        assert!(!ScalarVersion::new(0, 0, 1).is_initial());
        assert!(!ScalarVersion::INITIAL.with_qualifier("x").is_initial());
    }
}
