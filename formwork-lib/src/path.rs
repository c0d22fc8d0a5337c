//! Dotted/indexed node paths.
//!
//! `"emailGroup.email"` addresses a field inside a group,
//! `"addresses.0.city"` (or `"addresses[0].city"`) a field inside an array
//! element. The empty path addresses the root group.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named child of a group.
    Key(String),
    /// A positional element of an array.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// A parsed path from the root group to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The path of the root group.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dotted/indexed path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw_trimmed = raw.trim();
        if raw_trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for part in raw_trimmed.split('.') {
            if part.is_empty() {
                return Err(PathError::syntax(raw, "empty segment"));
            }

            // `name[0][1]` is sugar for `name.0.1`
            let (head, mut rest) = match part.find('[') {
                Some(at) => part.split_at(at),
                None => (part, ""),
            };
            if !head.is_empty() {
                segments.push(Self::plain_segment(head));
            } else if rest.is_empty() {
                return Err(PathError::syntax(raw, "empty segment"));
            }

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(PathError::syntax(raw, "unexpected text after ']'"));
                };
                let Some(close) = inner.find(']') else {
                    return Err(PathError::syntax(raw, "unclosed '['"));
                };
                let index = inner[..close]
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| PathError::syntax(raw, "index is not a number"))?;
                segments.push(Segment::Index(index));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self { segments })
    }

    fn plain_segment(part: &str) -> Segment {
        match part.parse::<usize>() {
            Ok(index) => Segment::Index(index),
            Err(_) => Segment::Key(part.to_string()),
        }
    }

    /// Returns the segments in order from the root.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path with one more segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns the path with a named child appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(Segment::Key(key.into()))
    }

    /// Returns the path with an index appended.
    pub fn index(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Returns the path truncated to its first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            segments: self.segments[..len.min(self.segments.len())].to_vec(),
        }
    }

    /// Returns `true` if `self` equals `other` or lies below it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Anything that can name a node: a [`Path`] or a path string.
pub trait IntoPath {
    /// Converts into a parsed path.
    fn into_path(self) -> Result<Path, PathError>;
}

impl IntoPath for Path {
    fn into_path(self) -> Result<Path, PathError> {
        Ok(self)
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Result<Path, PathError> {
        Ok(self.clone())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<Path, PathError> {
        Path::parse(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_paths() {
        let path = Path::parse("emailGroup.email").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("emailGroup".into()),
                Segment::Key("email".into())
            ]
        );
        assert_eq!(path.to_string(), "emailGroup.email");
    }

    #[test]
    fn test_indexed_paths_are_equivalent() {
        let dotted = Path::parse("addresses.0.city").unwrap();
        let bracketed = Path::parse("addresses[0].city").unwrap();
        assert_eq!(dotted, bracketed);
        assert_eq!(bracketed.to_string(), "addresses.0.city");
    }

    #[test]
    fn test_root_path() {
        assert!(Path::parse("").unwrap().is_root());
        assert!(Path::parse("  ").unwrap().is_root());
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(Path::parse("a..b"), Err(PathError::Syntax { .. })));
        assert!(matches!(Path::parse("a."), Err(PathError::Syntax { .. })));
        assert!(matches!(Path::parse("a[0"), Err(PathError::Syntax { .. })));
        assert!(matches!(Path::parse("a[x]"), Err(PathError::Syntax { .. })));
        assert!(matches!(Path::parse("a[0]b"), Err(PathError::Syntax { .. })));
    }

    #[test]
    fn test_parent_and_prefix() {
        let path = Path::parse("a.1.b").unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "a.1");
        assert_eq!(path.prefix(1).to_string(), "a");
        assert!(path.starts_with(&path.prefix(2)));
        assert!(!path.prefix(2).starts_with(&path));
    }
}
