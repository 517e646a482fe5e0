//! Path → MIME type registry used when new files are created.

use crate::path::{DrivePath, SEPARATOR};
use indexmap::IndexMap;

/// MIME type used when no registration matches.
pub const DEFAULT_MIME_TYPE: &str = "text/plain";

/// Ordered map from drive paths to content types.
///
/// Keys are normalized, so `gdrive://a/b.csv`, `/a/b.csv` and `a//b.csv`
/// register the same entry. Later registrations replace earlier ones for the
/// same path and keep their original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeRegistry {
    entries: IndexMap<String, String>,
    default: String,
}

impl Default for MimeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MIME_TYPE)
    }
}

fn normalize_key(path: &str) -> String {
    let path = path.find("://").map_or(path, |idx| &path[idx + 3..]);
    DrivePath::from_segments(path.split(SEPARATOR)).to_string()
}

impl MimeRegistry {
    /// Empty registry falling back to `default`.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            entries: IndexMap::new(),
            default: default.into(),
        }
    }

    pub fn register(&mut self, path: &str, mime_type: impl Into<String>) {
        self.entries.insert(normalize_key(path), mime_type.into());
    }

    /// Content type for `path`, or the default.
    pub fn lookup(&self, path: &DrivePath) -> &str {
        self.entries
            .get(&path.to_string())
            .filter(|mime| !mime.is_empty())
            .map_or(self.default.as_str(), String::as_str)
    }

    pub fn default_type(&self) -> &str {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
