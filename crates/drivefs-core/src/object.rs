//! The remote object model.
//!
//! A drive stores files and directories as the same kind of record: a
//! [`RemoteObject`] tagged with a MIME type and a list of parent references.
//! There is no stored path. Directories are objects whose MIME type is
//! [`FOLDER_MIME_TYPE`], and a directory's children are whatever objects name
//! it as a parent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type that marks an object as a directory.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Reference from an object to one of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    /// Id of the parent object.
    pub id: String,
}

impl ParentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One stored object: a file or a directory.
///
/// `id` is `None` for an object that exists only in memory and has not been
/// inserted into the store yet (a file opened for writing that has not been
/// written to).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Single path segment. Not unique among siblings.
    pub title: String,
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_names: Vec<String>,
    /// Opaque locator for the content. Only file objects with content have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl RemoteObject {
    /// An unsaved directory object under `parent_id`.
    pub fn new_directory(title: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            parents: vec![ParentRef::new(parent_id)],
            ..Self::default()
        }
    }

    /// An unsaved file object under `parent_id`.
    pub fn new_file(
        title: impl Into<String>,
        mime_type: impl Into<String>,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            mime_type: mime_type.into(),
            parents: vec![ParentRef::new(parent_id)],
            ..Self::default()
        }
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True once the store has assigned an id.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Last known content size; 0 when the store reported none.
    #[inline]
    pub fn size(&self) -> u64 {
        self.file_size.unwrap_or(0)
    }

    pub fn first_parent_id(&self) -> Option<&str> {
        self.parents.first().map(|p| p.id.as_str())
    }

    pub fn has_parent(&self, id: &str) -> bool {
        self.parents.iter().any(|p| p.id == id)
    }

    /// Replace every parent reference with a single one.
    pub fn set_parent(&mut self, id: impl Into<String>) {
        self.parents = vec![ParentRef::new(id)];
    }
}

/// Object type predicate used when listing children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    #[default]
    Any,
    Directory,
    File,
}

impl TypeFilter {
    pub fn matches(self, object: &RemoteObject) -> bool {
        match self {
            TypeFilter::Any => true,
            TypeFilter::Directory => object.is_dir(),
            TypeFilter::File => object.is_file(),
        }
    }

    /// Drive search query selecting the children of `parent_id`.
    ///
    /// HTTP-backed clients send this as the `q` parameter of a files list call.
    pub fn to_query(self, parent_id: &str) -> String {
        let mut q = format!("\"{parent_id}\" in parents");
        match self {
            TypeFilter::Any => {}
            TypeFilter::Directory => {
                q.push_str(&format!(" and mimeType = \"{FOLDER_MIME_TYPE}\""));
            }
            TypeFilter::File => {
                q.push_str(&format!(" and mimeType != \"{FOLDER_MIME_TYPE}\""));
            }
        }
        q
    }
}
