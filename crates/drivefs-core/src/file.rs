//! Open files.
//!
//! A [`FileHandle`] turns the store's fetch-whole-object API into a seekable
//! byte stream. The body is materialized on first access and kept in a
//! [`BodyBuffer`]; every write or truncate uploads the entire buffer straight
//! away, so `flush` and `close` never touch the store.
//!
//! Behaviour is driven by the [`OpenMode`] picked from an fopen-style mode
//! string:
//!
//! | mode | existing object | missing object | initial body   | write    |
//! |------|-----------------|----------------|----------------|----------|
//! | `r`  | opened          | `NotFound`     | downloaded     | ignored  |
//! | `w`  | opened          | created        | empty          | append   |
//! | `a`  | opened          | created        | downloaded     | append   |
//! | `x`  | `AlreadyExists` | created        | empty          | append   |
//! | `c`  | opened          | created        | downloaded     | splice   |
//!
//! "Created" objects live only in memory until the first write or truncate.

use crate::buffer::BodyBuffer;
use crate::client::{UpdateOptions, Upload};
use crate::error::{DriveError, DriveResult};
use crate::object::{RemoteObject, TypeFilter};
use crate::path::DrivePath;
use crate::session::DriveSession;
use crate::stat::StatRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// File access mode, selected by the first character of a mode string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// `r`: read only. `r+` is accepted and still read only.
    Read,
    /// `w`: write, starting from an empty body.
    Write,
    /// `a`: write at the end of the existing content.
    Append,
    /// `x`: write to a file that must not exist yet.
    CreateNew,
    /// `c`: read and overwrite in place.
    Update,
}

impl OpenMode {
    /// Parse an fopen-style mode string such as `"rb"`, `"w+"` or `"c"`.
    ///
    /// Only the first character selects the mode; `+`, `b` and `t` may
    /// follow and are ignored.
    pub fn parse(mode: &str) -> DriveResult<Self> {
        let mut chars = mode.chars();
        let parsed = match chars.next() {
            Some('r') => OpenMode::Read,
            Some('w') => OpenMode::Write,
            Some('a') => OpenMode::Append,
            Some('x') => OpenMode::CreateNew,
            Some('c') => OpenMode::Update,
            _ => return Err(DriveError::InvalidMode(mode.to_string())),
        };
        if !chars.all(|c| matches!(c, '+' | 'b' | 't')) {
            return Err(DriveError::InvalidMode(mode.to_string()));
        }
        Ok(parsed)
    }

    pub fn as_char(self) -> char {
        match self {
            OpenMode::Read => 'r',
            OpenMode::Write => 'w',
            OpenMode::Append => 'a',
            OpenMode::CreateNew => 'x',
            OpenMode::Update => 'c',
        }
    }

    #[inline]
    pub fn is_writable(self) -> bool {
        self != OpenMode::Read
    }

    /// True if the body starts from the stored content rather than empty.
    #[inline]
    pub fn loads_existing(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::Append | OpenMode::Update)
    }

    pub fn write_policy(self) -> WritePolicy {
        match self {
            OpenMode::Update => WritePolicy::Splice,
            _ => WritePolicy::Append,
        }
    }
}

impl FromStr for OpenMode {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Where written bytes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritePolicy {
    /// Overwrite at the cursor, keeping any bytes past the written range.
    Splice,
    /// Add at the end of the body whatever the cursor says.
    Append,
}

/// Reference point for [`FileHandle::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekWhence {
    Set,
    Current,
    End,
}

impl SeekWhence {
    /// Map a C `whence` value (`SEEK_SET`, `SEEK_CUR`, `SEEK_END`).
    pub fn from_raw(whence: i32) -> Option<Self> {
        match whence {
            libc::SEEK_SET => Some(SeekWhence::Set),
            libc::SEEK_CUR => Some(SeekWhence::Current),
            libc::SEEK_END => Some(SeekWhence::End),
            _ => None,
        }
    }
}

/// Arithmetic used for [`SeekWhence::Current`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeekPolicy {
    /// `position + offset`.
    #[default]
    Relative,
    /// `position + SEEK_CUR`, ignoring the offset.
    ///
    /// Reproduces stream wrappers that add the whence constant instead of
    /// the offset. Only useful for parity with existing data.
    AddWhenceConstant,
}

/// Advisory lock request. Locking is never supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOperation {
    Shared,
    Exclusive,
    Unlock,
}

/// Stream tuning request. None of these are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOption {
    Blocking(bool),
    ReadTimeout(Duration),
    ReadBuffer(usize),
    WriteBuffer(usize),
}

/// State of one open file.
///
/// Two handles on the same path are independent: each has its own body, and
/// whichever uploads last wins.
pub struct FileHandle {
    session: Arc<DriveSession>,
    path: DrivePath,
    mode: OpenMode,
    object: RemoteObject,
    body: Option<BodyBuffer>,
    position: u64,
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("id", &self.object.id)
            .field("position", &self.position)
            .field("loaded", &self.body.is_some())
            .finish_non_exhaustive()
    }
}

impl FileHandle {
    /// Open `path` in `mode`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` for [`OpenMode::CreateNew`] on an existing object
    /// - `NotFound` for [`OpenMode::Read`] on a missing object, or when the
    ///   parent directory of a new file is missing
    /// - `NotAFile` when `path` names a directory
    #[instrument(level = "debug", name = "file::open", skip_all, fields(path = %path, mode = %mode))]
    pub fn open(session: Arc<DriveSession>, path: &DrivePath, mode: OpenMode) -> DriveResult<Self> {
        let resolver = session.resolver();
        let object = match (resolver.lookup(path, TypeFilter::Any)?, mode) {
            (Some(_), OpenMode::CreateNew) => {
                return Err(DriveError::already_exists(path.to_string()));
            }
            (Some(existing), _) if existing.is_dir() => {
                return Err(DriveError::not_a_file(path.to_string()));
            }
            (Some(existing), _) => existing,
            (None, OpenMode::Read) => return Err(DriveError::not_found(path.to_string())),
            (None, _) => {
                let (Some(name), Some(parent_path)) = (path.file_name(), path.parent()) else {
                    return Err(DriveError::not_a_file(path.to_string()));
                };
                let parent = resolver
                    .lookup(&parent_path, TypeFilter::Directory)?
                    .ok_or_else(|| DriveError::not_found(parent_path.to_string()))?;
                let parent_id = parent
                    .id()
                    .ok_or_else(|| DriveError::not_found(parent_path.to_string()))?;
                debug!(parent = %parent_id, "new file held in memory until first write");
                RemoteObject::new_file(name, session.mime_type_for(path), parent_id)
            }
        };

        Ok(Self {
            session,
            path: path.clone(),
            mode,
            object,
            body: None,
            position: 0,
        })
    }

    #[inline]
    pub fn path(&self) -> &DrivePath {
        &self.path
    }

    #[inline]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// The object as last reported by the store (or as constructed, before
    /// the first upload).
    #[inline]
    pub fn object(&self) -> &RemoteObject {
        &self.object
    }

    /// Last known remote size. Seek and eof are measured against this.
    #[inline]
    pub fn remote_size(&self) -> u64 {
        self.object.size()
    }

    /// Current cursor position.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.position
    }

    pub fn eof(&self) -> bool {
        self.position >= self.remote_size()
    }

    fn fetch_body(&mut self) -> DriveResult<BodyBuffer> {
        let content = match self.object.download_url.as_deref() {
            Some(locator) if self.mode.loads_existing() && self.object.is_persisted() => {
                let data = self.session.client().download(locator)?;
                debug!(bytes = data.len(), "downloaded body");
                data
            }
            _ => Vec::new(),
        };
        if self.mode == OpenMode::Append {
            self.position = content.len() as u64;
        }
        Ok(BodyBuffer::new(content))
    }

    /// Load the body on first access. Append mode moves the cursor here.
    fn materialize(&mut self) -> DriveResult<()> {
        if self.body.is_none() {
            let body = self.fetch_body()?;
            self.body = Some(body);
        }
        Ok(())
    }

    /// Copy of the current body to edit before upload.
    fn staged_body(&self) -> BodyBuffer {
        self.body.clone().unwrap_or_default()
    }

    /// Upload `content` as the whole body: insert when the object has no id
    /// yet, update otherwise. The store's answer replaces the handle's object.
    fn persist(&mut self, content: &[u8]) -> DriveResult<()> {
        let upload = Upload::new(content, &self.object.mime_type);
        let client = self.session.client();
        let stored = match self.object.id() {
            Some(id) => client.update(id, &self.object, UpdateOptions::with_upload(upload))?,
            None => client.insert(&self.object, Some(upload))?,
        };
        debug!(id = ?stored.id, size = content.len(), "uploaded body");
        self.object = stored;
        Ok(())
    }

    /// Read up to `count` bytes at the cursor.
    ///
    /// The cursor advances by the number of bytes returned. `count == 0`
    /// returns nothing and does not load the body.
    pub fn read(&mut self, count: usize) -> DriveResult<Vec<u8>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.materialize()?;
        let data = self
            .body
            .as_ref()
            .map(|body| body.read(self.position, count).to_vec())
            .unwrap_or_default();
        self.position += data.len() as u64;
        Ok(data)
    }

    /// Write `data` according to the mode's [`WritePolicy`] and upload.
    ///
    /// Returns the number of bytes accepted; read-only handles accept none.
    /// A failed upload leaves the body and the cursor as they were.
    #[instrument(level = "debug", name = "file::write", skip_all, fields(path = %self.path, len = data.len()))]
    pub fn write(&mut self, data: &[u8]) -> DriveResult<usize> {
        if !self.mode.is_writable() {
            debug!("write ignored on read-only handle");
            return Ok(0);
        }
        self.materialize()?;
        let mut staged = self.staged_body();
        let written = match self.mode.write_policy() {
            WritePolicy::Splice => staged.splice(self.position, data),
            WritePolicy::Append => staged.append(data),
        };
        self.persist(staged.content())?;
        self.body = Some(staged);
        self.position += written as u64;
        Ok(written)
    }

    /// Move the cursor and return the new position.
    ///
    /// The result is clamped into `[0, remote_size]`.
    pub fn seek(&mut self, offset: i64, whence: SeekWhence) -> u64 {
        let size = i64::try_from(self.remote_size()).unwrap_or(i64::MAX);
        let current = i64::try_from(self.position).unwrap_or(i64::MAX);
        let target = match whence {
            SeekWhence::Set => offset,
            SeekWhence::Current => match self.session.config().seek_policy {
                SeekPolicy::Relative => current.saturating_add(offset),
                SeekPolicy::AddWhenceConstant => current.saturating_add(i64::from(libc::SEEK_CUR)),
            },
            SeekWhence::End => size.saturating_add(offset),
        };
        self.position = u64::try_from(target.clamp(0, size)).unwrap_or(0);
        self.position
    }

    /// Keep the first `size` bytes and upload. Never extends the file, and
    /// changes nothing locally when the upload fails.
    #[instrument(level = "debug", name = "file::truncate", skip_all, fields(path = %self.path, size = size))]
    pub fn truncate(&mut self, size: u64) -> DriveResult<()> {
        self.materialize()?;
        let mut staged = self.staged_body();
        staged.truncate(size);
        self.persist(staged.content())?;
        self.body = Some(staged);
        self.position = self.position.min(size);
        Ok(())
    }

    /// Nothing is buffered between writes, so this always succeeds.
    pub fn flush(&mut self) -> DriveResult<()> {
        Ok(())
    }

    /// Stat of the handle's current object.
    pub fn stat(&self, now: DateTime<Utc>) -> StatRecord {
        StatRecord::from_object(&self.object, now)
    }

    pub fn lock(&mut self, _operation: LockOperation) -> DriveResult<()> {
        Err(DriveError::Unsupported("lock"))
    }

    pub fn set_option(&mut self, _option: StreamOption) -> DriveResult<()> {
        Err(DriveError::Unsupported("set_option"))
    }

    /// There is no underlying OS resource to hand out.
    pub fn cast(&self) -> DriveResult<()> {
        Err(DriveError::Unsupported("cast"))
    }

    /// Release the handle. No remote I/O happens here.
    pub fn close(self) {
        debug!(path = %self.path, persisted = self.object.is_persisted(), "file closed");
    }
}
