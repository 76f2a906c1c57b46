//! The hierarchical `Version` type.

use crate::error::{ParseError, Shape, VersionError};
use crate::parser;
use crate::scalar::ScalarVersion;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Addresses one sub-component of a composite version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Position in an ordered (list) version.
    Index(usize),
    /// Key in a keyed (map) version.
    Key(String),
}

impl From<usize> for Selector {
    fn from(index: usize) -> Self {
        Selector::Index(index)
    }
}

impl From<&str> for Selector {
    fn from(key: &str) -> Self {
        Selector::Key(key.to_string())
    }
}

impl From<String> for Selector {
    fn from(key: String) -> Self {
        Selector::Key(key)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "[{}]", i),
            Selector::Key(k) => write!(f, "{{\"{}\"}}", escape_key(k)),
        }
    }
}

/// The three shapes a version can take.
#[derive(Debug)]
pub enum Component {
    Scalar(ScalarVersion),
    /// Ordered components, compared element-wise.
    List(Vec<Version>),
    /// Keyed components in insertion order.
    Map(Vec<(String, Version)>),
}

impl Component {
    pub fn shape(&self) -> Shape {
        match self {
            Component::Scalar(_) => Shape::Scalar,
            Component::List(_) => Shape::List,
            Component::Map(_) => Shape::Map,
        }
    }
}

/// An immutable, hierarchical version identifier.
///
/// Cloning is cheap and instances are shareable across threads. Every
/// operation that "modifies" a version returns a new one and leaves the
/// receiver untouched; untouched sub-components are shared.
#[derive(Clone)]
pub struct Version(Arc<Component>);

impl Version {
    fn from_component(component: Component) -> Self {
        Version(Arc::new(component))
    }

    /// `"0.0.0"`, the version of a store nothing has been applied to.
    pub fn initial() -> Self {
        ScalarVersion::INITIAL.into()
    }

    /// A scalar version without a qualifier.
    pub fn scalar(major: u32, minor: u32, micro: u32) -> Self {
        ScalarVersion::new(major, minor, micro).into()
    }

    /// An ordered composite.
    pub fn list(items: impl IntoIterator<Item = Version>) -> Self {
        Self::from_component(Component::List(items.into_iter().collect()))
    }

    /// A keyed composite. A repeated key overwrites the earlier value in place.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Version)>) -> Self {
        let mut out: Vec<(String, Version)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        Self::from_component(Component::Map(out))
    }

    /// Parse version text, yielding `None` for anything malformed.
    ///
    /// Use [`str::parse`] for a diagnostic instead.
    pub fn lookup(text: &str) -> Option<Self> {
        parser::parse(text).ok()
    }

    pub fn component(&self) -> &Component {
        &self.0
    }

    pub fn shape(&self) -> Shape {
        self.0.shape()
    }

    pub fn as_scalar(&self) -> Option<&ScalarVersion> {
        match self.component() {
            Component::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// True for the bare `"0.0.0"` scalar.
    pub fn is_initial(&self) -> bool {
        self.as_scalar().is_some_and(ScalarVersion::is_initial)
    }

    /// Number of direct sub-components; a scalar counts as one.
    pub fn len(&self) -> usize {
        match self.component() {
            Component::Scalar(_) => 1,
            Component::List(items) => items.len(),
            Component::Map(entries) => entries.len(),
        }
    }

    /// True for an empty list or map.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth: 0 for a scalar.
    pub fn depth(&self) -> usize {
        match self.component() {
            Component::Scalar(_) => 0,
            Component::List(items) => 1 + items.iter().map(Version::depth).max().unwrap_or(0),
            Component::Map(entries) => {
                1 + entries.iter().map(|(_, v)| v.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Read one sub-component.
    ///
    /// Missing positions and keys read as INITIAL. A scalar behaves as a
    /// one-element list for positional access and, when INITIAL, as an empty
    /// map for keyed access.
    pub fn get(&self, selector: impl Into<Selector>) -> Result<Version, VersionError> {
        match selector.into() {
            Selector::Index(index) => self.get_index(index),
            Selector::Key(key) => self.get_key(&key),
        }
    }

    fn get_index(&self, index: usize) -> Result<Version, VersionError> {
        match self.component() {
            Component::List(items) => Ok(items.get(index).cloned().unwrap_or_else(Version::initial)),
            Component::Scalar(_) if index == 0 => Ok(self.clone()),
            Component::Scalar(_) => Ok(Version::initial()),
            Component::Map(_) => Err(VersionError::IndexedAccessOnMap),
        }
    }

    fn get_key(&self, key: &str) -> Result<Version, VersionError> {
        match self.component() {
            Component::Map(entries) => Ok(entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_else(Version::initial)),
            Component::Scalar(s) if s.is_initial() => Ok(Version::initial()),
            other => Err(VersionError::KeyedAccess {
                shape: other.shape(),
            }),
        }
    }

    /// A copy with one sub-component replaced.
    ///
    /// Positional replace sets in place or appends when `index == len`. Keyed
    /// replace overwrites or inserts at the end.
    pub fn replace(
        &self,
        selector: impl Into<Selector>,
        value: Version,
    ) -> Result<Version, VersionError> {
        match selector.into() {
            Selector::Index(index) => {
                let mut items = match self.component() {
                    Component::List(items) => items.clone(),
                    Component::Scalar(_) => vec![self.clone()],
                    Component::Map(_) => return Err(VersionError::IndexedAccessOnMap),
                };
                match index.cmp(&items.len()) {
                    Ordering::Less => items[index] = value,
                    Ordering::Equal => items.push(value),
                    Ordering::Greater => {
                        return Err(VersionError::IndexOutOfBounds {
                            index,
                            len: items.len(),
                        })
                    }
                }
                Ok(Self::from_component(Component::List(items)))
            }
            Selector::Key(key) => {
                let mut entries = match self.component() {
                    Component::Map(entries) => entries.clone(),
                    Component::Scalar(s) if s.is_initial() => Vec::new(),
                    other => {
                        return Err(VersionError::KeyedAccess {
                            shape: other.shape(),
                        })
                    }
                };
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((key, value)),
                }
                Ok(Self::from_component(Component::Map(entries)))
            }
        }
    }

    /// The next micro version of a scalar.
    pub fn next(&self) -> Result<Version, VersionError> {
        match self.component() {
            Component::Scalar(s) => match s.next() {
                Some(next) => Ok(next.into()),
                None => Err(VersionError::MicroOverflow {
                    version: self.to_string(),
                }),
            },
            other => Err(VersionError::NotScalar {
                operation: "next",
                shape: other.shape(),
            }),
        }
    }

    /// The marker version recorded while moving from `self` to `destination`.
    ///
    /// A scalar source is marked directly. Composite sources descend to the
    /// first sub-component that differs from the destination and mark that
    /// one; where the nesting depth differs, the shallower scalar is marked.
    pub fn transition_to(&self, destination: &Version) -> Result<Version, VersionError> {
        match (self.component(), destination.component()) {
            (Component::Scalar(s), _) => Ok(s.transition().into()),
            (Component::List(a), Component::List(b)) => self.transition_list(a, b),
            (Component::List(a), Component::Scalar(_)) => {
                self.transition_list(a, std::slice::from_ref(destination))
            }
            (Component::Map(a), Component::Map(b)) => self.transition_map(a, b),
            (l, r) => Err(VersionError::IncomparableShapes {
                left: l.shape(),
                right: r.shape(),
            }),
        }
    }

    fn transition_list(&self, a: &[Version], b: &[Version]) -> Result<Version, VersionError> {
        let initial = Version::initial();
        for index in 0..a.len().max(b.len()) {
            let from = a.get(index).unwrap_or(&initial);
            let to = b.get(index).unwrap_or(&initial);
            if from != to {
                let marked = from.transition_to(to)?;
                let mut items = a.to_vec();
                items.resize(items.len().max(index), Version::initial());
                if index < items.len() {
                    items[index] = marked;
                } else {
                    items.push(marked);
                }
                return Ok(Self::from_component(Component::List(items)));
            }
        }
        Err(VersionError::NoDifference {
            version: self.to_string(),
        })
    }

    fn transition_map(
        &self,
        a: &[(String, Version)],
        b: &[(String, Version)],
    ) -> Result<Version, VersionError> {
        let keys = b
            .iter()
            .map(|(k, _)| k)
            .chain(a.iter().map(|(k, _)| k).filter(|k| find(b, k).is_none()));

        for key in keys {
            let from = find(a, key).cloned().unwrap_or_else(Version::initial);
            let to = find(b, key).cloned().unwrap_or_else(Version::initial);
            if from != to {
                let marked = from.transition_to(&to)?;
                return self.replace(key.as_str(), marked);
            }
        }
        Err(VersionError::NoDifference {
            version: self.to_string(),
        })
    }

    /// Compare two versions.
    ///
    /// Scalars compare numerically then by qualifier. Lists compare
    /// element-wise, then by length; a scalar compares against a list as a
    /// one-element list. Maps compare over their shared keys, and a map never
    /// compares against a list or scalar.
    pub fn compare(&self, other: &Version) -> Result<Ordering, VersionError> {
        match (self.component(), other.component()) {
            (Component::Scalar(a), Component::Scalar(b)) => Ok(a.cmp(b)),
            (Component::List(a), Component::List(b)) => compare_lists(a, b),
            (Component::List(a), Component::Scalar(_)) => {
                compare_lists(a, std::slice::from_ref(other))
            }
            (Component::Scalar(_), Component::List(b)) => {
                compare_lists(std::slice::from_ref(self), b)
            }
            (Component::Map(a), Component::Map(b)) => compare_maps(a, b),
            (l, r) => Err(VersionError::IncomparableShapes {
                left: l.shape(),
                right: r.shape(),
            }),
        }
    }

    /// True when any scalar inside carries a transition qualifier.
    pub fn is_transition(&self) -> bool {
        match self.component() {
            Component::Scalar(s) => s.is_transition(),
            Component::List(items) => items.iter().any(Version::is_transition),
            Component::Map(entries) => entries.iter().any(|(_, v)| v.is_transition()),
        }
    }
}

fn find<'a>(entries: &'a [(String, Version)], key: &str) -> Option<&'a Version> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn compare_lists(a: &[Version], b: &[Version]) -> Result<Ordering, VersionError> {
    for (x, y) in a.iter().zip(b) {
        match x.compare(y)? {
            Ordering::Equal => continue,
            unequal => return Ok(unequal),
        }
    }
    Ok(a.len().cmp(&b.len()))
}

fn compare_maps(
    a: &[(String, Version)],
    b: &[(String, Version)],
) -> Result<Ordering, VersionError> {
    let mut shared = Ordering::Equal;
    for (key, x) in a {
        if let Some(y) = find(b, key) {
            shared = x.compare(y)?;
            if shared != Ordering::Equal {
                break;
            }
        }
    }

    match (shared, a.len().cmp(&b.len())) {
        (Ordering::Equal, sizes) => Ok(sizes),
        (shared, Ordering::Equal) => Ok(shared),
        (shared, sizes) if shared == sizes => Ok(shared),
        (shared, sizes) => Err(VersionError::ConflictingMapOrder { shared, sizes }),
    }
}

impl From<ScalarVersion> for Version {
    fn from(scalar: ScalarVersion) -> Self {
        Version::from_component(Component::Scalar(scalar))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (self.component(), other.component()) {
            (Component::Scalar(a), Component::Scalar(b)) => a == b,
            (Component::List(a), Component::List(b)) => a == b,
            (Component::Map(a), Component::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| find(b, k) == Some(v))
            }
            _ => false,
        }
    }
}

impl Eq for Version {}

// Map equality ignores insertion order, so entries are hashed in key order.
impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.component() {
            Component::Scalar(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Component::List(items) => {
                1u8.hash(state);
                items.hash(state);
            }
            Component::Map(entries) => {
                2u8.hash(state);
                let mut sorted: Vec<&(String, Version)> = entries.iter().collect();
                sorted.sort_by(|x, y| x.0.cmp(&y.0));
                sorted.len().hash(state);
                for (k, v) in sorted {
                    k.hash(state);
                    v.hash(state);
                }
            }
        }
    }
}

fn escape_key(key: &str) -> String {
    key.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component() {
            Component::Scalar(s) => write!(f, "\"{}\"", s),
            Component::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Component::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", escape_key(key), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self)
    }
}

impl std::str::FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(text: &str) -> Version {
        Version::lookup(text).unwrap()
    }

    #[test]
    fn test_lookup_round_trips_canonical_form() {
        assert_eq!(v("1.2.3").to_string(), "\"1.2.3\"");
        assert_eq!(v("[1.0.0,\"2.0.0\"]").to_string(), r#"["1.0.0", "2.0.0"]"#);
        assert_eq!(
            v(r#"{"a":1.0.0,"b":[0.0.1]}"#).to_string(),
            r#"{"a": "1.0.0", "b": ["0.0.1"]}"#
        );
        let canonical = v(r#"{"a": ["0.0.1", {"x": "1.0.0.rc"}]}"#).to_string();
        assert_eq!(v(&canonical).to_string(), canonical);
    }

    #[test]
    fn test_lookup_rejects_invalid() {
        assert!(Version::lookup("1.2.3.4.5").is_none());
        assert!(Version::lookup("latest").is_none());
        assert!(Version::lookup("[1.2.3").is_none());
    }

    #[test]
    fn test_list_indexing() {
        let list = v("[0.0.1, 0.0.2]");
        assert_eq!(list.get(1).unwrap(), v("0.0.2"));
        assert_eq!(list.get(5).unwrap(), Version::initial());

        let appended = list.replace(2, v("0.0.3")).unwrap();
        assert_eq!(appended.to_string(), r#"["0.0.1", "0.0.2", "0.0.3"]"#);
        // The receiver is untouched
        assert_eq!(list.len(), 2);

        assert_eq!(
            list.replace(4, v("0.0.3")),
            Err(VersionError::IndexOutOfBounds { index: 4, len: 2 })
        );
    }

    #[test]
    fn test_map_access() {
        let map = v(r#"{"A": 0.0.1}"#);
        assert_eq!(map.get("A").unwrap(), v("0.0.1"));
        assert_eq!(map.get("B").unwrap(), Version::initial());

        let updated = map.replace("B", v("0.0.2")).unwrap().replace("A", v("0.0.3")).unwrap();
        assert_eq!(updated.to_string(), r#"{"A": "0.0.3", "B": "0.0.2"}"#);

        assert_eq!(map.get(0), Err(VersionError::IndexedAccessOnMap));
    }

    #[test]
    fn test_scalar_as_composite() {
        let initial = Version::initial();
        assert_eq!(initial.get(0).unwrap(), initial);
        assert_eq!(initial.get("A").unwrap(), initial);
        assert_eq!(initial.replace(1, v("0.0.1")).unwrap().to_string(), r#"["0.0.0", "0.0.1"]"#);
        assert_eq!(initial.replace("A", v("0.0.1")).unwrap().to_string(), r#"{"A": "0.0.1"}"#);

        let scalar = v("1.0.0");
        assert_eq!(
            scalar.get("A"),
            Err(VersionError::KeyedAccess { shape: Shape::Scalar })
        );
        assert_eq!(v("[0.0.1]").get("A"), Err(VersionError::KeyedAccess { shape: Shape::List }));
    }

    #[test]
    fn test_next_is_scalar_only() {
        assert_eq!(v("1.2.3.rc").next().unwrap(), v("1.2.4"));
        assert!(matches!(
            v("[1.2.3]").next(),
            Err(VersionError::NotScalar { shape: Shape::List, .. })
        ));

        let last = Version::scalar(1, 2, u32::MAX);
        assert_eq!(
            last.next(),
            Err(VersionError::MicroOverflow {
                version: last.to_string()
            })
        );
    }

    #[test]
    fn test_compare_scalars_and_lists() {
        assert_eq!(v("0.0.1").compare(&v("0.0.2")), Ok(Ordering::Less));
        assert_eq!(v("[0.0.1, 0.0.2]").compare(&v("[0.0.1, 0.0.1]")), Ok(Ordering::Greater));
        assert_eq!(v("[0.0.1]").compare(&v("[0.0.1, 0.0.0]")), Ok(Ordering::Less));

        // Scalar promotes to a one-element list
        assert_eq!(v("0.0.1").compare(&v("[0.0.1]")), Ok(Ordering::Equal));
        assert_eq!(v("[0.0.1, 0.0.1]").compare(&v("0.0.1")), Ok(Ordering::Greater));
        assert_eq!(v("0.0.2").compare(&v("[0.0.1, 0.0.5]")), Ok(Ordering::Greater));
    }

    #[test]
    fn test_compare_maps() {
        let a = v(r#"{"A": 0.0.1, "B": 0.0.1}"#);
        let b = v(r#"{"B": 0.0.2, "A": 0.0.1}"#);
        assert_eq!(a.compare(&b), Ok(Ordering::Less));
        assert_eq!(b.compare(&a), Ok(Ordering::Greater));

        // Larger map agrees with the shared-key ordering
        let partial = v(r#"{"A": 0.0.1}"#);
        assert_eq!(a.compare(&partial), Ok(Ordering::Greater));
        assert_eq!(partial.compare(&a), Ok(Ordering::Less));

        // Smaller map is ahead on the shared keys
        let ahead = v(r#"{"A": 0.0.2}"#);
        assert_eq!(
            ahead.compare(&a),
            Err(VersionError::ConflictingMapOrder {
                shared: Ordering::Greater,
                sizes: Ordering::Less,
            })
        );
    }

    #[test]
    fn test_compare_maps_with_unshared_keys() {
        // Same size: only the shared keys decide
        let left = v(r#"{"A": 0.0.1, "B": 0.0.1}"#);
        let right = v(r#"{"A": 0.0.2, "C": 0.0.1}"#);
        assert_eq!(left.compare(&right), Ok(Ordering::Less));
        assert_eq!(right.compare(&left), Ok(Ordering::Greater));

        // Shared keys equal: the larger map wins
        let wide = v(r#"{"A": 0.0.1, "B": 0.0.1, "D": 0.0.1}"#);
        let narrow = v(r#"{"A": 0.0.1, "C": 0.0.1}"#);
        assert_eq!(wide.compare(&narrow), Ok(Ordering::Greater));
        assert_eq!(narrow.compare(&wide), Ok(Ordering::Less));

        // Nothing shared, same size
        assert_eq!(
            v(r#"{"A": 0.0.1}"#).compare(&v(r#"{"B": 0.0.9}"#)),
            Ok(Ordering::Equal)
        );
    }

    #[test]
    fn test_map_never_compares_with_other_shapes() {
        let map = v(r#"{"A": 0.0.1}"#);
        assert!(matches!(
            map.compare(&v("0.0.1")),
            Err(VersionError::IncomparableShapes { left: Shape::Map, right: Shape::Scalar })
        ));
        assert!(matches!(
            v("[0.0.1]").compare(&map),
            Err(VersionError::IncomparableShapes { left: Shape::List, right: Shape::Map })
        ));
    }

    #[test]
    fn test_transition_scalar() {
        let source = v("0.0.1");
        let dest = v("0.0.2");
        let marked = source.transition_to(&dest).unwrap();
        assert_eq!(marked, v("0.0.1.transition"));
        assert!(marked.is_transition());
        assert_ne!(marked, source);
        assert_ne!(marked, dest);
        assert_eq!(source.compare(&marked), Ok(Ordering::Less));
        assert_eq!(marked.compare(&dest), Ok(Ordering::Less));

        assert_eq!(
            v("0.0.1.beta").transition_to(&dest).unwrap(),
            v("0.0.1.beta-transition")
        );
    }

    #[test]
    fn test_transition_list_marks_first_difference() {
        let source = v("[0.0.1, 0.0.1, 0.0.1]");
        let dest = v("[0.0.1, 0.0.2, 0.0.2]");
        assert_eq!(
            source.transition_to(&dest).unwrap(),
            v("[0.0.1, 0.0.1.transition, 0.0.1]")
        );

        // Destination longer than source
        let marked = v("[0.0.1]").transition_to(&v("[0.0.1, 0.0.1]")).unwrap();
        assert_eq!(marked, v("[0.0.1, 0.0.0.transition]"));

        // Differing depth marks the shallower scalar
        let marked = v("[0.0.1]").transition_to(&v("[[0.0.1, 0.0.2]]")).unwrap();
        assert_eq!(marked, v("[0.0.1.transition]"));
    }

    #[test]
    fn test_transition_map() {
        let source = v(r#"{"A": 0.0.1}"#);
        let dest = v(r#"{"A": 0.0.1, "B": 0.0.1}"#);
        assert_eq!(
            source.transition_to(&dest).unwrap(),
            v(r#"{"A": 0.0.1, "B": 0.0.0.transition}"#)
        );

        assert!(matches!(
            source.transition_to(&source),
            Err(VersionError::NoDifference { .. })
        ));
        assert!(source.transition_to(&v("[0.0.1]")).is_err());
    }

    #[test]
    fn test_equality_and_hash_ignore_map_order() {
        use std::collections::HashSet;

        let a = v(r#"{"A": 0.0.1, "B": 0.0.2}"#);
        let b = v(r#"{"B": 0.0.2, "A": 0.0.1}"#);
        assert_eq!(a, b);

        let set: HashSet<Version> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);

        // Structural equality does not promote scalars
        assert_ne!(v("0.0.1"), v("[0.0.1]"));
    }

    #[test]
    fn test_depth() {
        assert_eq!(v("0.0.1").depth(), 0);
        assert_eq!(v("[]").depth(), 1);
        assert_eq!(v(r#"[{"a": [0.0.1]}]"#).depth(), 3);
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let version = v(r#"{"A": [0.0.1]}"#);
        let json = serde_json::to_string(&version).unwrap();
        assert_eq!(json, r#""{\"A\": [\"0.0.1\"]}""#);

        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, version);

        assert!(serde_json::from_str::<Version>(r#""nope""#).is_err());
    }
}
