// src/path.rs

//! Absolute slash-delimited path values and their prefix algebra
//!
//! A [`TreePath`] is an immutable, non-empty sequence of components, each
//! free of the separator character. Paths are pure values: they carry no
//! knowledge of what exists in any tree. The tree layer is built entirely
//! on three primitives defined here: [`depth`](TreePath::depth),
//! [`prefix`](TreePath::prefix), and
//! [`shared_prefix_depth`](TreePath::shared_prefix_depth).
//!
//! Paths order like component tuples: compare component by component,
//! and when one path is a proper prefix of the other, the shorter sorts
//! first. `/a` < `/a/b` < `/ab`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The component separator in parsed and rendered paths
pub const SEPARATOR: char = '/';

/// An absolute, normalized path in a file tree
///
/// Parsing accepts `a/b/c` and `/a/b/c` as the same path; every path is
/// absolute, so the leading separator is implied. Doubled separators,
/// trailing separators, and empty inputs are malformed. Components may
/// contain any character except the separator.
///
/// The canonical rendering always carries the leading separator:
///
/// ```
/// use filetree::TreePath;
///
/// let path: TreePath = "usr/local/bin".parse().unwrap();
/// assert_eq!(path.to_string(), "/usr/local/bin");
/// assert_eq!(path.depth(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath {
    components: Vec<String>,
}

impl TreePath {
    /// Parse a path string into its component sequence
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadPath`] for empty input, a bare separator, or
    /// any empty component (doubled or trailing separators).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(Error::BadPath("empty path".to_string()));
        }
        // Every path is absolute; one leading separator is accepted and
        // implied.
        let body = raw.strip_prefix(SEPARATOR).unwrap_or(raw);
        if body.is_empty() {
            return Err(Error::BadPath(format!("no components in '{raw}'")));
        }
        let mut components = Vec::new();
        for component in body.split(SEPARATOR) {
            if component.is_empty() {
                return Err(Error::BadPath(format!("empty component in '{raw}'")));
            }
            components.push(component.to_string());
        }
        Ok(Self { components })
    }

    /// Number of components; always at least 1
    #[inline]
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// The components in order, root-most first
    #[inline]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The final component
    #[inline]
    pub fn basename(&self) -> &str {
        // Parsing guarantees at least one component.
        &self.components[self.components.len() - 1]
    }

    /// The path formed by the first `n` components
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchPath`] when `n` is zero or exceeds the
    /// depth; prefixes are never empty and never extend the path.
    pub fn prefix(&self, n: usize) -> Result<Self> {
        if n < 1 || n > self.depth() {
            return Err(Error::NoSuchPath(format!(
                "no prefix of depth {n} in '{self}'"
            )));
        }
        Ok(Self {
            components: self.components[..n].to_vec(),
        })
    }

    /// Length of the longest common leading component run of two paths
    ///
    /// Zero means the paths disagree already at the first component.
    /// `self.shared_prefix_depth(other) == self.depth()` exactly when
    /// `self` is a prefix of `other` (or equal to it).
    pub fn shared_prefix_depth(&self, other: &TreePath) -> usize {
        self.components
            .iter()
            .zip(&other.components)
            .take_while(|(a, b)| a == b)
            .count()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for component in &self.components {
            write!(f, "{SEPARATOR}{component}")?;
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> TreePath {
        TreePath::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let p = path("a/b/c");
        assert_eq!(p.depth(), 3);
        assert_eq!(p.components(), &["a", "b", "c"]);
    }

    #[test]
    fn test_parse_leading_separator() {
        assert_eq!(path("/a/b"), path("a/b"));
        assert_eq!(path("/a").depth(), 1);
    }

    #[test]
    fn test_parse_single_component() {
        let p = path("etc");
        assert_eq!(p.depth(), 1);
        assert_eq!(p.basename(), "etc");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(TreePath::parse(""), Err(Error::BadPath(_))));
    }

    #[test]
    fn test_parse_bare_separator() {
        assert!(matches!(TreePath::parse("/"), Err(Error::BadPath(_))));
    }

    #[test]
    fn test_parse_doubled_separator() {
        assert!(matches!(TreePath::parse("a//b"), Err(Error::BadPath(_))));
        assert!(matches!(TreePath::parse("//a"), Err(Error::BadPath(_))));
    }

    #[test]
    fn test_parse_trailing_separator() {
        assert!(matches!(TreePath::parse("a/b/"), Err(Error::BadPath(_))));
        assert!(matches!(TreePath::parse("/a/"), Err(Error::BadPath(_))));
    }

    #[test]
    fn test_parse_unusual_components() {
        // Anything except the separator is a legal component character.
        let p = path("a b/.hidden/..");
        assert_eq!(p.components(), &["a b", ".hidden", ".."]);
    }

    #[test]
    fn test_display_canonical() {
        assert_eq!(path("a/b/c").to_string(), "/a/b/c");
        assert_eq!(path("/a/b/c").to_string(), "/a/b/c");
        assert_eq!(path("a").to_string(), "/a");
    }

    #[test]
    fn test_from_str_round_trip() {
        let p: TreePath = "/usr/bin".parse().unwrap();
        assert_eq!(p, path("usr/bin"));
        assert!("".parse::<TreePath>().is_err());
    }

    #[test]
    fn test_prefix() {
        let p = path("a/b/c");
        assert_eq!(p.prefix(1).unwrap(), path("a"));
        assert_eq!(p.prefix(2).unwrap(), path("a/b"));
        assert_eq!(p.prefix(3).unwrap(), p);
    }

    #[test]
    fn test_prefix_out_of_range() {
        let p = path("a/b");
        assert!(matches!(p.prefix(0), Err(Error::NoSuchPath(_))));
        assert!(matches!(p.prefix(3), Err(Error::NoSuchPath(_))));
    }

    #[test]
    fn test_shared_prefix_depth() {
        let p = path("a/b/c");
        assert_eq!(p.shared_prefix_depth(&path("a/b/d")), 2);
        assert_eq!(p.shared_prefix_depth(&path("a/b/c")), 3);
        assert_eq!(p.shared_prefix_depth(&path("a")), 1);
        assert_eq!(p.shared_prefix_depth(&path("x/b/c")), 0);
    }

    #[test]
    fn test_shared_prefix_requires_full_components() {
        // "ab" and "a" share no component even though one string starts
        // with the other.
        assert_eq!(path("ab/c").shared_prefix_depth(&path("a/c")), 0);
    }

    #[test]
    fn test_order_siblings() {
        assert!(path("a/b") < path("a/c"));
        assert!(path("a/b/z") < path("a/c/a"));
    }

    #[test]
    fn test_order_prefix_sorts_first() {
        assert!(path("a") < path("a/b"));
        assert!(path("a/b") < path("a/b/c"));
    }

    #[test]
    fn test_order_componentwise_not_stringwise() {
        // As strings "/a/b" < "/ab", and the tuple order agrees, but for
        // the right reason: "a" < "ab" at the first component.
        assert!(path("a/b") < path("ab"));
        assert!(path("a/z/z") < path("ab/a"));
    }

    #[test]
    fn test_equality_ignores_leading_separator_form() {
        let bare: TreePath = "x/y".parse().unwrap();
        let slashed: TreePath = "/x/y".parse().unwrap();
        assert_eq!(bare, slashed);
        assert_eq!(bare.cmp(&slashed), std::cmp::Ordering::Equal);
    }
}
