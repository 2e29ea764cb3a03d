//! Slash-delimited paths into the hierarchical document store.
//!
//! Paths are stored without leading or trailing slashes; `"/profile/u1/"`
//! and `"profile/u1"` parse to the same [`DocPath`]. The empty path is the
//! store root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

const RESERVED: &[char] = &['.', '#', '$', '[', ']', '/'];

/// Check that `segment` can be used as one path component.
pub(crate) fn check_segment(segment: &str) -> std::result::Result<(), String> {
    if segment.is_empty() {
        return Err("empty segment".into());
    }
    if let Some(c) = segment
        .chars()
        .find(|c| RESERVED.contains(c) || c.is_control())
    {
        return Err(format!("reserved character {c:?}"));
    }
    Ok(())
}

/// A validated path into the document store.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// The store root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-delimited path.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            check_segment(segment).map_err(|reason| TypeError::InvalidPath {
                path: raw.to_string(),
                reason,
            })?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Append a single segment.
    pub fn child(&self, segment: impl AsRef<str>) -> Result<Self> {
        let segment = segment.as_ref();
        check_segment(segment).map_err(|reason| TypeError::InvalidPath {
            path: format!("{self}/{segment}"),
            reason,
        })?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Append every segment of `other`.
    pub fn join(&self, other: &DocPath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Last segment, or `None` for the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// `true` if `self` equals `other` or is one of its ancestors.
    pub fn is_prefix_of(&self, other: &DocPath) -> bool {
        self.segments.len() <= other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// `true` if one path contains the other.
    pub fn overlaps(&self, other: &DocPath) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }
}

impl fmt::Debug for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocPath(/{})", self.segments.join("/"))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl FromStr for DocPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DocPath> for String {
    fn from(path: DocPath) -> String {
        path.segments.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_strips_slashes() {
        let a = DocPath::parse("/profile/u1/").unwrap();
        let b = DocPath::parse("profile/u1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_string(), "/profile/u1");
    }

    #[test]
    fn empty_is_root() {
        assert!(DocPath::parse("").unwrap().is_root());
        assert!(DocPath::parse("/").unwrap().is_root());
        assert_eq!(DocPath::root().parent(), None);
    }

    #[test]
    fn rejects_empty_inner_segment() {
        let err = DocPath::parse("profile//u1").unwrap_err();
        assert!(matches!(err, TypeError::InvalidPath { .. }));
    }

    #[test]
    fn child_and_join() {
        let root = DocPath::parse("profile/u1").unwrap();
        let links = DocPath::parse("links/custom").unwrap();
        let joined = root.join(&links).child("abc").unwrap();
        assert_eq!(joined.to_string(), "/profile/u1/links/custom/abc");
        assert_eq!(joined.last(), Some("abc"));
        assert_eq!(joined.parent().unwrap().last(), Some("custom"));
    }

    #[test]
    fn prefix_and_overlap() {
        let profile = DocPath::parse("profile/u1").unwrap();
        let theme = DocPath::parse("profile/u1/theme").unwrap();
        let other = DocPath::parse("profile/u2").unwrap();
        assert!(profile.is_prefix_of(&theme));
        assert!(!theme.is_prefix_of(&profile));
        assert!(theme.overlaps(&profile));
        assert!(!other.overlaps(&profile));
        assert!(DocPath::root().is_prefix_of(&other));
    }

    #[test]
    fn serde_uses_plain_string() {
        let path = DocPath::parse("a/b").unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"a/b\"");
        let back: DocPath = serde_json::from_str("\"/a/b\"").unwrap();
        assert_eq!(back, path);
    }

    fn segments() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[A-Za-z0-9_-]{1,8}", 0..6)
    }

    proptest! {
        #[test]
        fn display_parses_back(parts in segments()) {
            let path = DocPath::parse(&parts.join("/")).unwrap();
            prop_assert_eq!(path.len(), parts.len());
            prop_assert_eq!(DocPath::parse(&path.to_string()).unwrap(), path.clone());
            let stored: String = path.clone().into();
            prop_assert_eq!(DocPath::try_from(stored).unwrap(), path);
        }

        #[test]
        fn join_extends_the_left_path(a in segments(), b in segments()) {
            let left = DocPath::parse(&a.join("/")).unwrap();
            let right = DocPath::parse(&b.join("/")).unwrap();
            let joined = left.join(&right);
            prop_assert!(left.is_prefix_of(&joined));
            prop_assert!(joined.overlaps(&left));
            prop_assert_eq!(joined.len(), a.len() + b.len());
        }

        #[test]
        fn reserved_characters_are_rejected(head in "[a-z]{1,4}", c in prop::sample::select(vec!['.', '#', '$', '[', ']'])) {
            let segment = format!("{head}{c}");
            prop_assert!(DocPath::parse(&segment).is_err());
            prop_assert!(DocPath::root().child(segment).is_err());
        }
    }
}
