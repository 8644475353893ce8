//! Key paths addressing a location inside root state.
//!
//! A path starts at a top-level entry of the root state and then walks into
//! the persistent container stored there. Each segment is either a map key
//! or a list index.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single segment of a key path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Map key.
    Key(String),
    /// List index.
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Get the key if this is a key segment.
    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            Seg::Index(_) => None,
        }
    }

    /// Get the index if this is an index segment.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Key(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }

    /// The name of the top-level entry this segment addresses when it leads a path.
    ///
    /// Root state is keyed by strings, so an index names the entry spelled
    /// by its decimal form.
    pub fn root_key(&self) -> Cow<'_, str> {
        match self {
            Seg::Key(k) => Cow::Borrowed(k),
            Seg::Index(i) => Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<&String> for Seg {
    fn from(s: &String) -> Self {
        Seg::Key(s.clone())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// An ordered sequence of segments.
///
/// # Examples
///
/// ```
/// use tirea_link::Path;
///
/// let path = Path::new().key("todos").index(0).key("title");
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.to_string(), "todos[0].title");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path.
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path.
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn first(&self) -> Option<&Seg> {
        self.0.first()
    }

    /// Split into the leading segment and the remainder.
    #[inline]
    pub fn split_first(&self) -> Option<(&Seg, &[Seg])> {
        self.0.split_first()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Seg::Key(k) if i == 0 => write!(f, "{}", k)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

impl From<&[Seg]> for Path {
    fn from(segments: &[Seg]) -> Self {
        Path(segments.to_vec())
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = Seg;
    type IntoIter = std::vec::IntoIter<Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of segments.
///
/// String-like arguments become key segments, `usize` arguments become
/// index segments.
///
/// ```
/// use tirea_link::path;
///
/// let p = path!("todos", 2usize, "done");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::new()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::new();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}

/// The path argument accepted by `Linker::bind`.
///
/// Mirrors the shapes a caller can hand over: nothing at all, a single key,
/// or an explicit sequence of segments. Validation happens in
/// [`KeyPath::into_path`], so conversions themselves never fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPath {
    /// No key was supplied.
    Missing,
    /// A single top-level key.
    Single(Seg),
    /// An explicit sequence, possibly empty.
    Many(Vec<Seg>),
}

impl KeyPath {
    /// Normalize into a non-empty `Path`.
    pub fn into_path(self) -> crate::LinkResult<Path> {
        match self {
            KeyPath::Missing => Err(crate::LinkError::MissingKey),
            KeyPath::Single(Seg::Key(k)) if k.is_empty() => Err(crate::LinkError::MissingKey),
            KeyPath::Single(seg) => Ok(Path(vec![seg])),
            KeyPath::Many(segs) if segs.is_empty() => Err(crate::LinkError::EmptyPath),
            KeyPath::Many(segs) => Ok(Path(segs)),
        }
    }
}

impl From<&str> for KeyPath {
    fn from(s: &str) -> Self {
        KeyPath::Single(Seg::from(s))
    }
}

impl From<String> for KeyPath {
    fn from(s: String) -> Self {
        KeyPath::Single(Seg::Key(s))
    }
}

impl From<usize> for KeyPath {
    fn from(i: usize) -> Self {
        KeyPath::Single(Seg::Index(i))
    }
}

impl From<Seg> for KeyPath {
    fn from(seg: Seg) -> Self {
        KeyPath::Single(seg)
    }
}

impl From<Path> for KeyPath {
    fn from(path: Path) -> Self {
        KeyPath::Many(path.0)
    }
}

impl From<&Path> for KeyPath {
    fn from(path: &Path) -> Self {
        KeyPath::Many(path.0.clone())
    }
}

impl<T: Into<Seg>> From<Vec<T>> for KeyPath {
    fn from(segs: Vec<T>) -> Self {
        KeyPath::Many(segs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Seg>, const N: usize> From<[T; N]> for KeyPath {
    fn from(segs: [T; N]) -> Self {
        KeyPath::Many(segs.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<KeyPath>> From<Option<T>> for KeyPath {
    fn from(key: Option<T>) -> Self {
        key.map_or(KeyPath::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkError;

    #[test]
    fn test_path_construction() {
        let path = Path::new().key("users").index(0).key("name");
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], Seg::Key("users".into()));
        assert_eq!(path[1], Seg::Index(0));
        assert_eq!(path[2], Seg::Key("name".into()));
    }

    #[test]
    fn test_path_display() {
        let path = path!("users", 0usize, "name");
        assert_eq!(path.to_string(), "users[0].name");
        assert_eq!(path!(3usize, "x").to_string(), "[3].x");
    }

    #[test]
    fn test_root_key_of_index() {
        assert_eq!(Seg::index(7).root_key(), "7");
        assert_eq!(Seg::key("a").root_key(), "a");
    }

    #[test]
    fn test_key_path_single_is_wrapped() {
        let path = KeyPath::from("a").into_path().unwrap();
        assert_eq!(path, path!("a"));
    }

    #[test]
    fn test_key_path_missing() {
        assert!(matches!(
            KeyPath::from(None::<&str>).into_path(),
            Err(LinkError::MissingKey)
        ));
        assert!(matches!(
            KeyPath::from("").into_path(),
            Err(LinkError::MissingKey)
        ));
    }

    #[test]
    fn test_key_path_empty_sequence() {
        assert!(matches!(
            KeyPath::from(Vec::<&str>::new()).into_path(),
            Err(LinkError::EmptyPath)
        ));
        assert!(matches!(
            KeyPath::from(Path::new()).into_path(),
            Err(LinkError::EmptyPath)
        ));
    }

    #[test]
    fn test_key_path_sequence_keeps_empty_first_key() {
        // Only a bare key is checked for emptiness; a sequence is taken as given.
        let path = KeyPath::from([""]).into_path().unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_path_serde() {
        let path = path!("users", 0usize);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["users",0]"#);
        let parsed: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(path, parsed);
    }
}
