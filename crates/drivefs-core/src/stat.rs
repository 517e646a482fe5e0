//! Object metadata → stat record.

use crate::object::RemoteObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File type bits of `mode`.
pub const S_IFMT: u32 = 0o170_000;
/// Directory type bits.
pub const S_IFDIR: u32 = 0o040_000;
/// Regular file type bits.
pub const S_IFREG: u32 = 0o100_000;

/// Permission bits reported for every object. The store has no permission
/// model that maps onto POSIX bits.
pub const DEFAULT_PERMISSIONS: u32 = 0o600;

/// A `stat(2)`-shaped view of one object.
///
/// Times are Unix seconds. `uid` carries the first owner's display name
/// since the store has no numeric user ids. `blksize` and `blocks` are -1:
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: String,
    pub gid: u32,
    pub rdev: u64,
    pub size: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub blksize: i64,
    pub blocks: i64,
}

impl StatRecord {
    /// Translate `object`. Missing timestamps are reported as `now`.
    pub fn from_object(object: &RemoteObject, now: DateTime<Utc>) -> Self {
        let file_type = if object.is_dir() { S_IFDIR } else { S_IFREG };
        let seconds = |t: Option<DateTime<Utc>>| t.unwrap_or(now).timestamp();
        Self {
            dev: 0,
            ino: 0,
            mode: file_type | DEFAULT_PERMISSIONS,
            nlink: 0,
            uid: object.owner_names.first().cloned().unwrap_or_default(),
            gid: 0,
            rdev: 0,
            size: object.size(),
            atime: seconds(object.last_viewed_time),
            mtime: seconds(object.modified_time),
            ctime: seconds(object.created_time),
            blksize: -1,
            blocks: -1,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    #[inline]
    pub fn permissions(&self) -> u32 {
        self.mode & !S_IFMT
    }

    /// `mtime` as a timestamp, if representable.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.mtime, 0)
    }
}
