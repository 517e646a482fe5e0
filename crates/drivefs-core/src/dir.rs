//! Directory listing cursors.

use crate::error::{DriveError, DriveResult};
use crate::object::{RemoteObject, TypeFilter};
use crate::path::SEPARATOR;
use crate::session::DriveSession;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// An open directory.
///
/// The child titles are fetched on the first [`next`](Self::next) and then
/// served from that snapshot; the cursor does not see later mutations until
/// it is rewound.
pub struct DirectoryCursor {
    session: Arc<DriveSession>,
    url: String,
    directory: RemoteObject,
    entries: Option<Vec<String>>,
    index: usize,
}

impl fmt::Debug for DirectoryCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryCursor")
            .field("url", &self.url)
            .field("id", &self.directory.id)
            .field("entries", &self.entries.as_ref().map(Vec::len))
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl DirectoryCursor {
    /// Open the directory named by `url`.
    ///
    /// Entries are reported as `url` joined with the child title, so the
    /// caller gets back paths in the same form it passed in. A file at `url`
    /// is reported as `NotADirectory`.
    #[instrument(level = "debug", name = "dir::open", skip_all, fields(url = %url))]
    pub fn open(session: Arc<DriveSession>, url: &str) -> DriveResult<Self> {
        let path = session.parse_path(url)?;
        let resolver = session.resolver();
        let Some(directory) = resolver.lookup(&path, TypeFilter::Directory)? else {
            return match resolver.lookup(&path, TypeFilter::Any)? {
                Some(_) => Err(DriveError::not_a_directory(url)),
                None => Err(DriveError::not_found(url)),
            };
        };
        Ok(Self {
            session,
            url: url.to_string(),
            directory,
            entries: None,
            index: 0,
        })
    }

    #[inline]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[inline]
    pub fn directory(&self) -> &RemoteObject {
        &self.directory
    }

    fn entry_path(&self, title: &str) -> String {
        if self.url.ends_with(SEPARATOR) {
            format!("{}{title}", self.url)
        } else {
            format!("{}{SEPARATOR}{title}", self.url)
        }
    }

    fn load(&mut self) -> DriveResult<()> {
        if self.entries.is_some() {
            return Ok(());
        }
        let id = self
            .directory
            .id()
            .ok_or_else(|| DriveError::not_found(self.url.clone()))?;
        let children = self.session.client().children(id, TypeFilter::Any)?;
        debug!(url = %self.url, count = children.len(), "listed directory");
        self.entries = Some(children.into_iter().map(|child| child.title).collect());
        self.index = 0;
        Ok(())
    }

    /// The next entry path, or `None` at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> DriveResult<Option<String>> {
        self.load()?;
        let title = self
            .entries
            .as_ref()
            .and_then(|entries| entries.get(self.index))
            .cloned();
        let Some(title) = title else {
            return Ok(None);
        };
        self.index += 1;
        Ok(Some(self.entry_path(&title)))
    }

    /// Drop the snapshot; the next call to [`next`](Self::next) lists again.
    pub fn rewind(&mut self) {
        self.entries = None;
        self.index = 0;
    }

    /// Drain the remaining entries.
    pub fn collect_remaining(&mut self) -> DriveResult<Vec<String>> {
        let mut out = Vec::new();
        while let Some(entry) = self.next()? {
            out.push(entry);
        }
        Ok(out)
    }

    pub fn close(self) {
        debug!(url = %self.url, "directory closed");
    }
}
