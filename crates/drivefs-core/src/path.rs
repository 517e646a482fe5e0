//! Drive path grammar.
//!
//! Paths arrive as URLs of the form `scheme://a/b/c`. The scheme token and the
//! following `:/` are stripped, leaving `/a/b/c`, which is split on `/`.
//! Empty segments are dropped, so `scheme://`, `/` and the empty string all
//! name the root, and `/a//b/` names the same object as `/a/b`.
//!
//! Segments are matched literally against object titles; `.` and `..` have
//! no special meaning because the drive allows them as titles.

use crate::error::{DriveError, DriveResult};
use std::fmt;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// A parsed path inside the drive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DrivePath {
    segments: Vec<String>,
}

pub(crate) fn is_scheme_token(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl DrivePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a URL (`scheme://a/b`) or a bare path (`/a/b`).
    ///
    /// A URL with a scheme other than `scheme` is rejected.
    pub fn parse(raw: &str, scheme: &str) -> DriveResult<Self> {
        let rest = match raw.find("://") {
            Some(idx) if is_scheme_token(&raw[..idx]) => {
                if !raw[..idx].eq_ignore_ascii_case(scheme) {
                    return Err(DriveError::invalid_path(format!(
                        "{raw}: expected scheme '{scheme}'"
                    )));
                }
                // Keep one slash of "://": "gdrive://a" becomes "/a".
                &raw[idx + 2..]
            }
            _ => raw,
        };
        Ok(Self::from_segments(rest.split(SEPARATOR)))
    }

    /// Build a path from raw segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: segments
                .into_iter()
                .filter(|s| !s.as_ref().is_empty())
                .map(|s| s.as_ref().to_string())
                .collect(),
        }
    }

    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The final segment; `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The containing directory; `None` for the root.
    pub fn parent(&self) -> Option<DrivePath> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// This path extended by one segment.
    pub fn join(&self, name: &str) -> DrivePath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// True if `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &DrivePath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Render as `scheme://a/b`.
    pub fn to_url(&self, scheme: &str) -> String {
        format!("{scheme}:/{self}")
    }
}

impl fmt::Display for DrivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> DrivePath {
        DrivePath::parse(raw, "gdrive").unwrap()
    }

    #[test]
    fn test_parse_url() {
        let path = parse("gdrive://aaa/bbb4/file.txt");
        assert_eq!(path.segments(), ["aaa", "bbb4", "file.txt"]);
        assert_eq!(path.to_string(), "/aaa/bbb4/file.txt");
        assert_eq!(path.file_name(), Some("file.txt"));
    }

    #[test]
    fn test_root_forms() {
        for raw in ["gdrive://", "gdrive:///", "/", ""] {
            assert!(parse(raw).is_root(), "{raw:?} should be root");
        }
        assert_eq!(DrivePath::root().to_string(), "/");
        assert_eq!(DrivePath::root().to_url("gdrive"), "gdrive://");
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(parse("/a//b/"), parse("/a/b"));
        assert_eq!(parse("gdrive://a/b"), parse("/a/b"));
    }

    #[test]
    fn test_foreign_scheme_rejected() {
        let err = DrivePath::parse("s3://bucket/key", "gdrive").unwrap_err();
        assert!(matches!(err, DriveError::InvalidPath(_)));
    }

    #[test]
    fn test_colon_in_title_is_not_a_scheme() {
        let path = parse("/notes: 2024/a");
        assert_eq!(path.segments(), ["notes: 2024", "a"]);
    }

    #[test]
    fn test_parent_and_join() {
        let path = parse("/a/b/c");
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "/a/b");
        assert_eq!(parent.join("c"), path);
        assert!(path.starts_with(&parent));
        assert!(!parent.starts_with(&path));
        assert_eq!(parse("/a").parent(), Some(DrivePath::root()));
        assert_eq!(DrivePath::root().parent(), None);
    }

    #[test]
    fn test_to_url() {
        assert_eq!(parse("/a/b").to_url("gdrive"), "gdrive://a/b");
    }
}
