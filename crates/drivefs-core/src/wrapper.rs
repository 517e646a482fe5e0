//! The filesystem-call surface a host runtime drives.
//!
//! One [`StreamWrapper`] is one stream: it holds at most one open file and at
//! most one open directory. Every call follows filesystem-call conventions:
//! failures come back as `false`, `None` or `0`, are logged at `warn`, and
//! leave their [`ErrorCategory`] in [`StreamWrapper::last_error`] for
//! bindings that want an errno.

use crate::dir::DirectoryCursor;
use crate::error::{DriveError, DriveResult, ErrorCategory};
use crate::file::{FileHandle, LockOperation, SeekWhence, StreamOption};
use crate::ops::{DriveOperations, MetadataOption};
use crate::session::DriveSession;
use crate::stat::StatRecord;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Per-stream state.
#[derive(Debug)]
pub struct StreamWrapper {
    ops: DriveOperations,
    file: Option<FileHandle>,
    dir: Option<DirectoryCursor>,
    last_error: Option<ErrorCategory>,
}

impl StreamWrapper {
    pub fn new(session: Arc<DriveSession>) -> Self {
        Self {
            ops: DriveOperations::new(session),
            file: None,
            dir: None,
            last_error: None,
        }
    }

    /// Classification of the most recent failure, if the last call failed.
    pub fn last_error(&self) -> Option<ErrorCategory> {
        self.last_error
    }

    /// The open file, if any.
    pub fn file(&self) -> Option<&FileHandle> {
        self.file.as_ref()
    }

    fn report<T>(&mut self, call: &'static str, result: DriveResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                let category = e.category();
                warn!(call, error = %e, errno = category.to_errno(), "call failed");
                self.last_error = Some(category);
                None
            }
        }
    }

    fn with_file<T>(
        &mut self,
        call: &'static str,
        f: impl FnOnce(&mut FileHandle) -> DriveResult<T>,
    ) -> Option<T> {
        let result = match self.file.as_mut() {
            Some(file) => f(file),
            None => Err(DriveError::invalid_path("no open file")),
        };
        self.report(call, result)
    }

    // Files

    #[instrument(level = "debug", name = "stream_open", skip_all, fields(url = %url, mode = %mode))]
    pub fn stream_open(&mut self, url: &str, mode: &str) -> bool {
        let result = self.ops.open_file(url, mode);
        match self.report("stream_open", result) {
            Some(file) => {
                if let Some(previous) = self.file.replace(file) {
                    previous.close();
                }
                true
            }
            None => false,
        }
    }

    /// Read up to `count` bytes. `None` on failure or when `count` is 0.
    pub fn stream_read(&mut self, count: usize) -> Option<Vec<u8>> {
        if count == 0 {
            return None;
        }
        self.with_file("stream_read", |file| file.read(count))
    }

    /// Bytes accepted; 0 on failure or on a read-only stream.
    pub fn stream_write(&mut self, data: &[u8]) -> usize {
        self.with_file("stream_write", |file| file.write(data))
            .unwrap_or(0)
    }

    /// Seek with a C `whence`. Unknown `whence` values fail.
    pub fn stream_seek(&mut self, offset: i64, whence: i32) -> bool {
        self.with_file("stream_seek", |file| {
            let whence = SeekWhence::from_raw(whence)
                .ok_or(DriveError::Unsupported("seek whence"))?;
            Ok(file.seek(offset, whence))
        })
        .is_some()
    }

    pub fn stream_tell(&self) -> u64 {
        self.file.as_ref().map_or(0, FileHandle::tell)
    }

    pub fn stream_eof(&self) -> bool {
        self.file.as_ref().is_none_or(FileHandle::eof)
    }

    pub fn stream_truncate(&mut self, size: u64) -> bool {
        self.with_file("stream_truncate", |file| file.truncate(size))
            .is_some()
    }

    pub fn stream_stat(&mut self) -> Option<StatRecord> {
        let now = Utc::now();
        self.with_file("stream_stat", |file| Ok(file.stat(now)))
    }

    pub fn stream_flush(&mut self) -> bool {
        self.with_file("stream_flush", FileHandle::flush).is_some()
    }

    pub fn stream_lock(&mut self, operation: LockOperation) -> bool {
        self.with_file("stream_lock", |file| file.lock(operation))
            .is_some()
    }

    pub fn stream_set_option(&mut self, option: StreamOption) -> bool {
        self.with_file("stream_set_option", |file| file.set_option(option))
            .is_some()
    }

    pub fn stream_cast(&mut self) -> bool {
        self.with_file("stream_cast", |file| file.cast()).is_some()
    }

    pub fn stream_close(&mut self) {
        if let Some(file) = self.file.take() {
            file.close();
        }
    }

    // Directories

    /// Open a directory, closing any directory this stream already had open.
    #[instrument(level = "debug", name = "dir_opendir", skip_all, fields(url = %url))]
    pub fn dir_opendir(&mut self, url: &str) -> bool {
        if self.dir.is_some() {
            debug!("closing previously opened directory");
            self.dir_closedir();
        }
        let result = self.ops.open_dir(url);
        self.dir = self.report("dir_opendir", result);
        self.dir.is_some()
    }

    /// Next entry as a full path, or `None` at the end or on failure.
    pub fn dir_readdir(&mut self) -> Option<String> {
        let result = match self.dir.as_mut() {
            Some(dir) => dir.next(),
            None => Err(DriveError::invalid_path("no open directory")),
        };
        self.report("dir_readdir", result).flatten()
    }

    pub fn dir_rewinddir(&mut self) -> bool {
        match self.dir.as_mut() {
            Some(dir) => {
                dir.rewind();
                true
            }
            None => false,
        }
    }

    pub fn dir_closedir(&mut self) -> bool {
        if let Some(dir) = self.dir.take() {
            dir.close();
        }
        true
    }

    // Paths

    pub fn mkdir(&mut self, url: &str, mode: u32, recursive: bool) -> bool {
        let result = self.ops.mkdir(url, mode, recursive);
        self.report("mkdir", result).is_some()
    }

    pub fn rmdir(&mut self, url: &str) -> bool {
        let result = self.ops.rmdir(url);
        self.report("rmdir", result).is_some()
    }

    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        let result = self.ops.rename(from, to);
        self.report("rename", result).is_some()
    }

    pub fn unlink(&mut self, url: &str) -> bool {
        let result = self.ops.unlink(url);
        self.report("unlink", result).is_some()
    }

    /// Stat by path. A missing path is an ordinary answer, not a warning.
    pub fn url_stat(&mut self, url: &str) -> Option<StatRecord> {
        match self.ops.url_stat(url) {
            Err(DriveError::NotFound(_)) => {
                self.last_error = Some(ErrorCategory::NotFound);
                None
            }
            result => self.report("url_stat", result),
        }
    }

    pub fn stream_metadata(&mut self, url: &str, option: MetadataOption) -> bool {
        let result = self.ops.set_metadata(url, option);
        self.report("stream_metadata", result).is_some()
    }
}
