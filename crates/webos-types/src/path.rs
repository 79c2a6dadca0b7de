//! Filesystem path algebra.
//!
//! A [`Path`] is either [`Absolute`] (anchored at `/`) or [`Relative`]. Both
//! are plain segment lists: parsing only splits on `/` and drops empty
//! segments. `.` and `..` are kept as literal segments and only mean
//! something once a backend resolves the path.
//!
//! ```text
//! "/a//b"   → Absolute(["a", "b"])
//! "a/../b"  → Relative(["a", "..", "b"])
//! "~/docs"  → Absolute(home ++ ["docs"])   (of_shell only)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SEPARATOR: char = '/';
const HOME: &str = "~";

/// Errors from converting between path variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Expected an absolute path.
    #[error("not an absolute path: {0}")]
    NotAbsolute(String),

    /// Expected a relative path.
    #[error("not a relative path: {0}")]
    NotRelative(String),
}

/// An absolute or relative filesystem path.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Path {
    Absolute(Absolute),
    Relative(Relative),
}

/// A path anchored at the root. `Absolute::root()` has no segments.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Absolute {
    segments: Vec<String>,
}

/// A path interpreted against some base directory.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Relative {
    segments: Vec<String>,
}

/// Flatten segments into their `/`-free, non-empty parts.
fn non_empty<I, S>(segments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    segments
        .into_iter()
        .flat_map(|segment| {
            let segment: String = segment.into();
            segment
                .split(SEPARATOR)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

impl Path {
    /// Parse slash-separated text. A leading `/` makes the path absolute.
    pub fn of(text: &str) -> Path {
        match text.strip_prefix(SEPARATOR) {
            Some(rest) => Path::Absolute(Absolute::from_segments(rest.split(SEPARATOR))),
            None => Path::Relative(Relative::from_segments(text.split(SEPARATOR))),
        }
    }

    /// Build a path from pre-split segments.
    ///
    /// An empty list is the root; an empty first segment, or one starting
    /// with `/`, marks an absolute path (the shape `"/a/b".split('/')`
    /// produces). Segments containing `/` are split further.
    pub fn of_segments<I, S>(segments: I) -> Path
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        match segments.first() {
            None => Path::Absolute(Absolute::root()),
            Some(first) if first.is_empty() || first.starts_with(SEPARATOR) => {
                Path::Absolute(Absolute::from_segments(segments))
            }
            Some(_) => Path::Relative(Relative::from_segments(segments)),
        }
    }

    /// Parse shell input, substituting a leading `~` with `home`.
    /// Without `~` this is [`Path::of`].
    pub fn of_shell(text: &str, home: &Absolute) -> Path {
        match text.split(SEPARATOR).next() {
            Some(HOME) => Self::of_shell_segments(text.split(SEPARATOR), home),
            _ => Self::of(text),
        }
    }

    /// Shell parsing over pre-split segments.
    pub fn of_shell_segments<I, S>(segments: I, home: &Absolute) -> Path
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        match segments.split_first() {
            Some((first, rest)) if first == HOME => {
                Path::Absolute(home.join_all(Relative::from_segments(rest.iter().cloned())))
            }
            _ => Self::of_segments(segments),
        }
    }

    /// The root path `/`.
    pub fn root() -> Path {
        Path::Absolute(Absolute::root())
    }

    /// Resolve `other` against `self`.
    ///
    /// An absolute `other` wins outright. A relative `other` is appended and
    /// the result keeps `self`'s variant.
    pub fn resolve(&self, other: &Path) -> Path {
        match self {
            Path::Absolute(base) => Path::Absolute(base.resolve(other)),
            Path::Relative(base) => base.resolve(other),
        }
    }

    /// Make this path absolute using `cwd` as the base for relative paths.
    pub fn to_absolute(&self, cwd: &Absolute) -> Absolute {
        cwd.resolve(self)
    }

    pub fn segments(&self) -> &[String] {
        match self {
            Path::Absolute(p) => p.segments(),
            Path::Relative(p) => p.segments(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self, Path::Absolute(_))
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Path::Relative(_))
    }
}

impl Absolute {
    /// The root directory `/`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build from segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: non_empty(segments),
        }
    }

    /// Parse text that must start with `/`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        match Path::of(text) {
            Path::Absolute(p) => Ok(p),
            Path::Relative(_) => Err(PathError::NotAbsolute(text.to_string())),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments (root has depth 0).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, `None` for root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Strip the last segment. The root is its own parent.
    pub fn parent(&self) -> Absolute {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Append one segment. A segment containing `/` appends each of its
    /// parts; empty parts leave the path unchanged.
    pub fn join(&self, segment: impl Into<String>) -> Absolute {
        let mut joined = self.clone();
        joined.segments.extend(non_empty([segment]));
        joined
    }

    /// Append every segment of `relative`.
    pub fn join_all(&self, relative: Relative) -> Absolute {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments);
        Self { segments }
    }

    /// Resolve `other` against this directory. Absolute `other` wins.
    pub fn resolve(&self, other: &Path) -> Absolute {
        match other {
            Path::Absolute(p) => p.clone(),
            Path::Relative(p) => self.join_all(p.clone()),
        }
    }

    /// True when `prefix`'s segments are a prefix of this path's segments.
    pub fn starts_with(&self, prefix: &Absolute) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Re-anchor this path below `prefix`: `/mnt/x` minus `/mnt` is `/x`.
    pub fn strip_prefix(&self, prefix: &Absolute) -> Option<Absolute> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
            })
    }

    /// True when no segment is `.` or `..`.
    pub fn is_normalized(&self) -> bool {
        !self.segments.iter().any(|s| is_dot_segment(s))
    }

    /// Shortest relative path leading from `self` to `target`.
    ///
    /// One `..` per segment of `self` past the common prefix, followed by
    /// the remainder of `target`.
    pub fn relativize(&self, target: &Absolute) -> Relative {
        let common = self
            .segments
            .iter()
            .zip(&target.segments)
            .take_while(|(a, b)| a == b)
            .count();
        let ups = self.segments.len() - common;
        let segments = std::iter::repeat_n("..".to_string(), ups)
            .chain(target.segments[common..].iter().cloned())
            .collect();
        Relative { segments }
    }
}

impl Relative {
    /// The empty relative path; resolves to its base unchanged.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: non_empty(segments),
        }
    }

    /// Parse text that must not start with `/`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        match Path::of(text) {
            Path::Relative(p) => Ok(p),
            Path::Absolute(_) => Err(PathError::NotRelative(text.to_string())),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve `other` against this path. Absolute `other` wins.
    pub fn resolve(&self, other: &Path) -> Path {
        match other {
            Path::Absolute(p) => Path::Absolute(p.clone()),
            Path::Relative(p) => {
                let mut segments = self.segments.clone();
                segments.extend(p.segments.iter().cloned());
                Path::Relative(Relative { segments })
            }
        }
    }
}

// ── Display / conversions ───────────────────────────────────────────────────

impl fmt::Display for Absolute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Relative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Absolute(p) => fmt::Display::fmt(p, f),
            Path::Relative(p) => fmt::Display::fmt(p, f),
        }
    }
}

impl From<Absolute> for Path {
    fn from(p: Absolute) -> Self {
        Path::Absolute(p)
    }
}

impl From<Relative> for Path {
    fn from(p: Relative) -> Self {
        Path::Relative(p)
    }
}

impl From<Path> for String {
    fn from(p: Path) -> Self {
        p.to_string()
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::of(&s)
    }
}

impl From<Absolute> for String {
    fn from(p: Absolute) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Absolute {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Absolute::parse(&s)
    }
}

impl From<Relative> for String {
    fn from(p: Relative) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Relative {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Relative::parse(&s)
    }
}

impl TryFrom<Path> for Absolute {
    type Error = PathError;

    fn try_from(p: Path) -> Result<Self, Self::Error> {
        match p {
            Path::Absolute(p) => Ok(p),
            Path::Relative(p) => Err(PathError::NotAbsolute(p.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Absolute {
        Absolute::parse("/home").unwrap()
    }

    fn abs(text: &str) -> Absolute {
        Absolute::parse(text).unwrap()
    }

    #[test]
    fn test_relative_classification() {
        let home = home();
        for path in [
            Path::of("a/b"),
            Path::of("."),
            Path::of_segments(["a", "b"]),
            Path::of_shell("a/b", &home),
            Path::of_shell(".", &home),
            Path::of_shell_segments(["a", "b"], &home),
        ] {
            assert!(path.is_relative(), "{path:?} should be relative");
        }
    }

    #[test]
    fn test_absolute_classification() {
        let home = home();
        for path in [
            Path::of("/a/b"),
            Path::of("/"),
            Path::of_segments(Vec::<String>::new()),
            Path::of_segments(["", "a"]),
            Path::of_shell("/b/c", &home),
        ] {
            assert!(path.is_absolute(), "{path:?} should be absolute");
        }
    }

    #[test]
    fn test_string_round_trip() {
        for text in ["/", "/a/b", "a/b", ".", "..", "a/../b", "/home/."] {
            assert_eq!(Path::of(text).to_string(), text);
            assert_eq!(Path::of_shell(text, &home()).to_string(), text);
            let parsed = Path::of(text);
            assert_eq!(Path::of(&parsed.to_string()), parsed);
        }
    }

    #[test]
    fn test_segment_round_trip() {
        let home = home();
        for path in [
            Path::of_segments(["a/b"]),
            Path::of_segments(["", "x/y", "z"]),
            Path::of_segments(["/a", "b//c"]),
            Path::of_shell_segments(["~", "x/y"], &home),
            Path::of_shell_segments(["docs/a", ".."], &home),
            Path::Absolute(Absolute::root().join("x/y")),
        ] {
            assert!(
                path.segments().iter().all(|s| !s.is_empty() && !s.contains('/')),
                "{path:?} holds a raw separator"
            );
            assert_eq!(Path::of(&path.to_string()), path);
        }
        assert_eq!(Path::of_segments(["a/b"]).segments(), ["a", "b"]);
        assert_eq!(Path::of_segments(["", "x/y", "z"]), Path::of("/x/y/z"));
        assert_eq!(Absolute::root().join("x/y"), abs("/x/y"));
        assert_eq!(Absolute::root().join(""), Absolute::root());
    }

    #[test]
    fn test_shell_without_home_matches_of() {
        let home = home();
        for text in ["", "a", "/a", "./x", "../y", "a~"] {
            assert_eq!(Path::of_shell(text, &home), Path::of(text));
        }
        assert!(Path::of_shell("", &home).is_relative());
    }

    #[test]
    fn test_empty_relative_round_trip() {
        let empty = Path::Relative(Relative::empty());
        assert_eq!(empty.to_string(), "");
        assert_eq!(Path::of(&empty.to_string()), empty);
    }

    #[test]
    fn test_redundant_separators_dropped() {
        assert_eq!(Path::of("c//d"), Path::of("c/d"));
        assert_eq!(Path::of("/a//b/"), Path::of("/a/b"));
        assert_eq!(Path::of("c//d").segments(), ["c", "d"]);
    }

    #[test]
    fn test_shell_home_substitution() {
        let home = home();
        for (input, expected) in [
            ("~/a", "/home/a"),
            ("~", "/home"),
            ("~/.", "/home/."),
            ("/a", "/a"),
            ("a", "a"),
        ] {
            assert_eq!(Path::of_shell(input, &home).to_string(), expected);
        }
    }

    #[test]
    fn test_tilde_is_literal_outside_shell() {
        let path = Path::of("~/a");
        assert!(path.is_relative());
        assert_eq!(path.segments(), ["~", "a"]);
    }

    #[test]
    fn test_resolve() {
        for (base, other, expected) in [
            ("/a/b", "c/d", "/a/b/c/d"),
            ("/a/b", "/c/d", "/c/d"),
            ("/a/", "c", "/a/c"),
        ] {
            let resolved = Path::of(base).resolve(&Path::of(other));
            assert!(resolved.is_absolute());
            assert_eq!(resolved.to_string(), expected);
        }
    }

    #[test]
    fn test_resolve_relative_base_stays_relative() {
        let resolved = Path::of("a").resolve(&Path::of("b/c"));
        assert_eq!(resolved, Path::of("a/b/c"));
        assert!(resolved.is_relative());

        let absolute_wins = Path::of("a").resolve(&Path::of("/x"));
        assert_eq!(absolute_wins, Path::of("/x"));
    }

    #[test]
    fn test_relativize() {
        for (from, to, expected) in [
            ("/a/b", "/a", ".."),
            ("/a", "/a/b", "b"),
            ("/a/b", "/a/c", "../c"),
            ("/", "/x/y", "x/y"),
        ] {
            assert_eq!(Path::from(abs(from).relativize(&abs(to))), Path::of(expected));
        }
    }

    #[test]
    fn test_relativize_self_is_empty() {
        let p = abs("/a/b");
        assert!(p.relativize(&p).is_empty());
    }

    #[test]
    fn test_relativize_climbs_multiple_levels() {
        let from = abs("/a/b/c");
        let to = abs("/a/x");
        let relative = from.relativize(&to);
        assert_eq!(relative.to_string(), "../../x");
    }

    #[test]
    fn test_parent_and_prefix() {
        let p = abs("/mnt/x/y");
        assert_eq!(p.parent(), abs("/mnt/x"));
        assert_eq!(Absolute::root().parent(), Absolute::root());
        assert!(p.starts_with(&abs("/mnt")));
        assert!(!p.starts_with(&abs("/mn")));
        assert_eq!(p.strip_prefix(&abs("/mnt")), Some(abs("/x/y")));
        assert_eq!(p.strip_prefix(&Absolute::root()), Some(p.clone()));
        assert_eq!(p.file_name(), Some("y"));
    }

    #[test]
    fn test_variant_parse_errors() {
        assert!(matches!(Absolute::parse("a/b"), Err(PathError::NotAbsolute(_))));
        assert!(matches!(Relative::parse("/a"), Err(PathError::NotRelative(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let p = abs("/home/amy");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/home/amy\"");
        let parsed: Absolute = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);

        let rejected: Result<Absolute, _> = serde_json::from_str("\"home/amy\"");
        assert!(rejected.is_err());
    }
}
