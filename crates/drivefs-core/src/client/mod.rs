//! The object graph client boundary.
//!
//! Everything above this trait speaks paths; everything below it speaks
//! object ids. A production deployment implements [`ObjectGraphClient`] on
//! top of the drive's HTTP API. [`MemoryDrive`] is a complete in-process
//! implementation used by the tests and the command-line front end.

mod memory;

pub use memory::{CallCounts, DriveOp, MemoryDrive};

use crate::error::RemoteResult;
use crate::object::{RemoteObject, TypeFilter};

/// Content attached to an insert or update.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub data: &'a [u8],
    pub mime_type: &'a str,
}

impl<'a> Upload<'a> {
    pub fn new(data: &'a [u8], mime_type: &'a str) -> Self {
        Self { data, mime_type }
    }
}

/// Options for [`ObjectGraphClient::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions<'a> {
    /// Replace the object's content.
    pub upload: Option<Upload<'a>>,
    /// Take `modified_time` from the submitted object instead of "now".
    pub set_modified_date: bool,
    /// Stamp the last-viewed time with "now".
    pub update_viewed_date: bool,
}

impl<'a> UpdateOptions<'a> {
    /// Metadata-only update.
    pub fn metadata() -> Self {
        Self::default()
    }

    /// Update that replaces the content.
    pub fn with_upload(upload: Upload<'a>) -> Self {
        Self {
            upload: Some(upload),
            ..Self::default()
        }
    }

    /// Update that only refreshes timestamps.
    pub fn touch() -> Self {
        Self {
            upload: None,
            set_modified_date: true,
            update_viewed_date: true,
        }
    }
}

/// Narrow interface to the remote object store.
///
/// All calls block until the store answers. Implementations report failures
/// as [`RemoteError`](crate::error::RemoteError) and do not retry on behalf of
/// the caller.
pub trait ObjectGraphClient: Send + Sync {
    /// The drive's root directory object.
    fn root(&self) -> RemoteResult<RemoteObject>;

    /// Children of `parent_id` that match `filter`, in listing order.
    fn children(&self, parent_id: &str, filter: TypeFilter) -> RemoteResult<Vec<RemoteObject>>;

    /// A single object by id.
    fn get(&self, id: &str) -> RemoteResult<RemoteObject>;

    /// Store a new object. The returned object carries the assigned id.
    fn insert(&self, object: &RemoteObject, upload: Option<Upload<'_>>)
    -> RemoteResult<RemoteObject>;

    /// Overwrite the metadata (title, parents, MIME type, and
    /// `modified_time` when requested) of `id`, optionally replacing content.
    fn update(
        &self,
        id: &str,
        object: &RemoteObject,
        options: UpdateOptions<'_>,
    ) -> RemoteResult<RemoteObject>;

    fn delete(&self, id: &str) -> RemoteResult<()>;

    /// Fetch the full content behind a download locator.
    fn download(&self, locator: &str) -> RemoteResult<Vec<u8>>;
}
