use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator used by the textual form of a [`PathKey`].
pub const SEPARATOR: char = '/';

/// Hierarchical address of an element: an ordered sequence of name segments.
///
/// The empty sequence is the root ([`PathKey::ROOT`]). Keys are plain values,
/// freely cloned and shared. Ordering is segment-wise lexicographic, so a key
/// sorts before every key it is a proper prefix of.
///
/// The textual form is absolute and `/`-separated: `"/"` is the root and
/// `"/sol/proj1"` has two segments.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PathKey {
    segments: Vec<String>,
}

impl PathKey {
    /// The root key (zero segments).
    pub const ROOT: PathKey = PathKey {
        segments: Vec::new(),
    };

    /// Build a key from segments, validating each one.
    pub fn new<I, S>(segments: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Returns `true` if this is the root key.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments. The root has zero.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segments of this key, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, or `None` for the root.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The key of a direct child named `segment`.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is empty or contains the separator, in every build
    /// profile. Use [`try_append`](Self::try_append) for untrusted input.
    pub fn append(&self, segment: impl Into<String>) -> PathKey {
        let segment = segment.into();
        if let Err(e) = validate_segment(&segment) {
            panic!("PathKey::append: {e}");
        }
        self.push_unchecked(segment)
    }

    /// Like [`append`](Self::append), but rejects invalid segments.
    pub fn try_append(&self, segment: impl Into<String>) -> Result<PathKey, TypeError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        Ok(self.push_unchecked(segment))
    }

    fn push_unchecked(&self, segment: String) -> PathKey {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        PathKey { segments }
    }

    /// The key of the parent element.
    ///
    /// Fails with [`TypeError::InvalidOperation`] on the root.
    pub fn parent(&self) -> Result<PathKey, TypeError> {
        match self.segments.split_last() {
            Some((_, rest)) => Ok(PathKey {
                segments: rest.to_vec(),
            }),
            None => Err(TypeError::InvalidOperation(
                "the root has no parent".into(),
            )),
        }
    }

    /// The first `count` segments of this key (clamped to its length).
    pub fn up_to(&self, count: usize) -> PathKey {
        let count = count.min(self.segments.len());
        PathKey {
            segments: self.segments[..count].to_vec(),
        }
    }

    /// Ancestor-or-equal test: `true` if `self` is a prefix of `other`.
    pub fn is_prefix_of(&self, other: &PathKey) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments[..] == other.segments[..self.segments.len()]
    }

    /// Strict ancestor test: `true` if `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &PathKey) -> bool {
        self.segments.len() < other.segments.len() && self.is_prefix_of(other)
    }

    /// The longest key that is a prefix of both `self` and `other`.
    pub fn common_prefix(&self, other: &PathKey) -> PathKey {
        let shared = self
            .segments
            .iter()
            .zip(&other.segments)
            .take_while(|(a, b)| a == b)
            .count();
        self.up_to(shared)
    }
}

/// Check that `segment` can be used as a single path segment.
///
/// Segments must be non-empty and must not contain the separator.
pub fn validate_segment(segment: &str) -> Result<(), TypeError> {
    if segment.is_empty() {
        return Err(TypeError::InvalidSegment {
            segment: segment.to_string(),
            reason: "segment must not be empty".into(),
        });
    }
    if segment.contains(SEPARATOR) {
        return Err(TypeError::InvalidSegment {
            segment: segment.to_string(),
            reason: format!("segment must not contain {SEPARATOR:?}"),
        });
    }
    Ok(())
}

impl FromStr for PathKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix(SEPARATOR) else {
            return Err(TypeError::InvalidPath {
                path: s.to_string(),
                reason: "path must be absolute".into(),
            });
        };
        let rest = rest.strip_suffix(SEPARATOR).unwrap_or(rest);
        if rest.is_empty() {
            return Ok(PathKey::ROOT);
        }
        PathKey::new(rest.split(SEPARATOR)).map_err(|e| TypeError::InvalidPath {
            path: s.to_string(),
            reason: e.to_string(),
        })
    }
}

impl TryFrom<Vec<String>> for PathKey {
    type Error = TypeError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        PathKey::new(segments)
    }
}

impl From<PathKey> for Vec<String> {
    fn from(path: PathKey) -> Self {
        path.segments
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{SEPARATOR}");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(s: &str) -> PathKey {
        s.parse().unwrap()
    }

    // -----------------------------------------------------------------------
    // Construction and parsing
    // -----------------------------------------------------------------------

    #[test]
    fn root_has_no_segments() {
        assert!(PathKey::ROOT.is_root());
        assert_eq!(PathKey::ROOT.segment_count(), 0);
        assert_eq!(PathKey::ROOT.last_segment(), None);
        assert_eq!(PathKey::ROOT, PathKey::default());
    }

    #[test]
    fn append_builds_child_keys() {
        let proj = PathKey::ROOT.append("sol").append("proj1");
        assert_eq!(proj.segment_count(), 2);
        assert_eq!(proj.last_segment(), Some("proj1"));
        assert_eq!(proj, key("/sol/proj1"));
    }

    #[test]
    fn parse_accepts_root_and_trailing_separator() {
        assert_eq!(key("/"), PathKey::ROOT);
        assert_eq!(key("/a/b/"), key("/a/b"));
    }

    #[test]
    fn parse_rejects_relative_and_empty_segments() {
        assert!(matches!(
            "a/b".parse::<PathKey>(),
            Err(TypeError::InvalidPath { .. })
        ));
        assert!(matches!(
            "/a//b".parse::<PathKey>(),
            Err(TypeError::InvalidPath { .. })
        ));
        assert!(matches!(
            "".parse::<PathKey>(),
            Err(TypeError::InvalidPath { .. })
        ));
    }

    #[test]
    fn try_append_rejects_bad_segments() {
        assert!(PathKey::ROOT.try_append("").is_err());
        assert!(PathKey::ROOT.try_append("a/b").is_err());
        assert_eq!(PathKey::ROOT.try_append("ok").unwrap(), key("/ok"));
    }

    #[test]
    #[should_panic(expected = "must not contain")]
    fn append_rejects_separator_in_every_build() {
        let _ = PathKey::ROOT.append("a/b");
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn append_rejects_empty_segment_in_every_build() {
        let _ = key("/a").append("");
    }

    #[test]
    fn appended_keys_survive_display_parse() {
        let k = PathKey::ROOT.append("a").append("b c").append("x.y");
        assert_eq!(k.to_string().parse::<PathKey>().unwrap(), k);
        assert_eq!(k.segment_count(), 3);
    }

    #[test]
    fn display_is_absolute() {
        assert_eq!(PathKey::ROOT.to_string(), "/");
        assert_eq!(key("/sol/proj0/folder1").to_string(), "/sol/proj0/folder1");
        assert_eq!(format!("{:?}", key("/x")), "PathKey(/x)");
    }

    // -----------------------------------------------------------------------
    // Path arithmetic
    // -----------------------------------------------------------------------

    #[test]
    fn parent_of_root_is_invalid() {
        assert!(matches!(
            PathKey::ROOT.parent(),
            Err(TypeError::InvalidOperation(_))
        ));
    }

    #[test]
    fn parent_strips_last_segment() {
        assert_eq!(key("/a/b/c").parent().unwrap(), key("/a/b"));
        assert_eq!(key("/a").parent().unwrap(), PathKey::ROOT);
    }

    #[test]
    fn ancestor_is_strict_prefix_is_not() {
        let a = key("/a");
        let ab = key("/a/b");
        assert!(a.is_ancestor_of(&ab));
        assert!(!ab.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(a.is_prefix_of(&a));
        assert!(PathKey::ROOT.is_ancestor_of(&a));
        assert!(!key("/ab").is_prefix_of(&key("/abc/d")));
    }

    #[test]
    fn common_prefix_falls_back_to_root() {
        assert_eq!(key("/a/b/c").common_prefix(&key("/a/b/d")), key("/a/b"));
        assert_eq!(key("/a/b").common_prefix(&key("/x")), PathKey::ROOT);
        assert_eq!(key("/a").common_prefix(&key("/a/b")), key("/a"));
    }

    #[test]
    fn up_to_clamps() {
        let k = key("/a/b/c");
        assert_eq!(k.up_to(1), key("/a"));
        assert_eq!(k.up_to(10), k);
        assert_eq!(k.up_to(0), PathKey::ROOT);
    }

    #[test]
    fn ordering_is_segment_wise() {
        let mut keys = vec![key("/b"), key("/a/z"), key("/a"), PathKey::ROOT, key("/a/b")];
        keys.sort();
        assert_eq!(
            keys,
            vec![PathKey::ROOT, key("/a"), key("/a/b"), key("/a/z"), key("/b")]
        );
    }

    #[test]
    fn serde_roundtrip_validates() {
        let k = key("/sol/proj1");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, r#"["sol","proj1"]"#);
        let parsed: PathKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, k);
        assert!(serde_json::from_str::<PathKey>(r#"["a/b"]"#).is_err());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_key() -> impl Strategy<Value = PathKey> {
        prop::collection::vec("[a-c]{1,2}", 0..5).prop_map(|segs| PathKey::new(segs).unwrap())
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(k in arb_key()) {
            prop_assert_eq!(k.to_string().parse::<PathKey>().unwrap(), k);
        }

        #[test]
        fn prefix_sorts_first(k in arb_key(), seg in "[a-c]{1,2}") {
            let child = k.append(seg);
            prop_assert!(k < child);
            prop_assert!(k.is_ancestor_of(&child));
            prop_assert_eq!(child.parent().unwrap(), k);
        }

        #[test]
        fn common_prefix_is_prefix_of_both(a in arb_key(), b in arb_key()) {
            let c = a.common_prefix(&b);
            prop_assert!(c.is_prefix_of(&a));
            prop_assert!(c.is_prefix_of(&b));
        }
    }
}
