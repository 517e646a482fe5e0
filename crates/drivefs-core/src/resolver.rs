//! Path → object resolution.
//!
//! The store has no notion of a path. To find `/a/b/c` the resolver starts at
//! the cached root and, for each segment, lists the children of the current
//! object and picks the one whose title matches. Sibling titles are not
//! unique; when several children match, the last one listed wins.
//!
//! Every segment's query carries the same [`TypeFilter`]. With
//! [`TypeFilter::Directory`] that is exactly right; with
//! [`TypeFilter::File`] only single-segment paths can ever resolve, so
//! callers that want "a file anywhere" resolve with [`TypeFilter::Any`] and
//! check the result.

use crate::error::{DriveError, DriveResult};
use crate::object::{RemoteObject, TypeFilter};
use crate::path::DrivePath;
use crate::session::DriveSession;
use tracing::{trace, warn};

/// Walks paths against the object graph of one session.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    session: &'a DriveSession,
}

impl<'a> PathResolver<'a> {
    pub fn new(session: &'a DriveSession) -> Self {
        Self { session }
    }

    /// Resolve `path`, reporting remote failures.
    ///
    /// `Ok(None)` means some segment has no matching child.
    pub fn lookup(&self, path: &DrivePath, filter: TypeFilter) -> DriveResult<Option<RemoteObject>> {
        Ok(self
            .lookup_chain(path, filter)?
            .and_then(|mut chain| chain.pop()))
    }

    /// Resolve `path` and return every object along the way, root first and
    /// the target last.
    pub fn lookup_chain(
        &self,
        path: &DrivePath,
        filter: TypeFilter,
    ) -> DriveResult<Option<Vec<RemoteObject>>> {
        let root = self.session.root()?;
        let mut chain = Vec::with_capacity(path.depth() + 1);
        chain.push(root);

        for segment in path.segments() {
            let Some(parent_id) = chain.last().and_then(RemoteObject::id) else {
                return Err(DriveError::not_found(path.to_string()));
            };
            let children = self.session.client().children(parent_id, filter)?;
            // Last match wins.
            let Some(found) = children.into_iter().rev().find(|c| &c.title == segment) else {
                trace!(%path, %segment, "segment not found");
                return Ok(None);
            };
            trace!(%segment, id = ?found.id, "segment resolved");
            chain.push(found);
        }
        Ok(Some(chain))
    }

    /// Resolve `path`, treating any failure as "not found".
    ///
    /// Suitable for existence checks. Remote failures are logged.
    pub fn resolve(&self, path: &DrivePath, filter: TypeFilter) -> Option<RemoteObject> {
        self.lookup(path, filter).unwrap_or_else(|e| {
            warn!(%path, error = %e, "resolution failed");
            None
        })
    }

    /// [`resolve`](Self::resolve) returning the ancestor chain.
    pub fn resolve_chain(&self, path: &DrivePath, filter: TypeFilter) -> Option<Vec<RemoteObject>> {
        self.lookup_chain(path, filter).unwrap_or_else(|e| {
            warn!(%path, error = %e, "resolution failed");
            None
        })
    }

    pub fn exists(&self, path: &DrivePath, filter: TypeFilter) -> bool {
        self.resolve(path, filter).is_some()
    }

    /// Rebuild the path of a resolved chain from its titles.
    pub fn path_of(chain: &[RemoteObject]) -> DrivePath {
        DrivePath::from_segments(chain.iter().skip(1).map(|object| object.title.as_str()))
    }
}
