//! Path-level operations that do not need an open handle.
//!
//! [`DriveOperations`] composes the resolver and the client into the
//! filesystem calls a host runtime issues by path: mkdir, rmdir, rename,
//! unlink, metadata changes and stat. It is also the entry point for opening
//! files and directories.

use crate::client::UpdateOptions;
use crate::dir::DirectoryCursor;
use crate::error::{DriveError, DriveResult};
use crate::file::{FileHandle, OpenMode};
use crate::object::{RemoteObject, TypeFilter};
use crate::path::DrivePath;
use crate::resolver::PathResolver;
use crate::session::DriveSession;
use crate::stat::StatRecord;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Mode used for parent directories created implicitly by `rename`.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// A metadata change requested through `touch`, `chown`, `chgrp` or `chmod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOption {
    /// Refresh timestamps. `mtime` defaults to now. The store always stamps
    /// the viewed time with now, so `atime` is accepted but not applied.
    Touch {
        mtime: Option<DateTime<Utc>>,
        atime: Option<DateTime<Utc>>,
    },
    Owner(u32),
    OwnerName(String),
    Group(u32),
    GroupName(String),
    Access(u32),
}

impl MetadataOption {
    /// Touch with both times set to now.
    pub fn touch() -> Self {
        MetadataOption::Touch {
            mtime: None,
            atime: None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MetadataOption::Touch { .. } => "touch",
            MetadataOption::Owner(_) => "chown",
            MetadataOption::OwnerName(_) => "chown by name",
            MetadataOption::Group(_) => "chgrp",
            MetadataOption::GroupName(_) => "chgrp by name",
            MetadataOption::Access(_) => "chmod",
        }
    }
}

/// Path-addressed operations over one session.
#[derive(Debug, Clone)]
pub struct DriveOperations {
    session: Arc<DriveSession>,
}

impl DriveOperations {
    pub fn new(session: Arc<DriveSession>) -> Self {
        Self { session }
    }

    #[inline]
    pub fn session(&self) -> &Arc<DriveSession> {
        &self.session
    }

    fn resolver(&self) -> PathResolver<'_> {
        self.session.resolver()
    }

    fn lookup(&self, path: &DrivePath) -> DriveResult<RemoteObject> {
        self.resolver()
            .lookup(path, TypeFilter::Any)?
            .ok_or_else(|| DriveError::not_found(path.to_string()))
    }

    /// Open a file. See [`FileHandle::open`].
    pub fn open_file(&self, url: &str, mode: &str) -> DriveResult<FileHandle> {
        let path = self.session.parse_path(url)?;
        FileHandle::open(Arc::clone(&self.session), &path, OpenMode::parse(mode)?)
    }

    /// Open a directory listing. See [`DirectoryCursor::open`].
    pub fn open_dir(&self, url: &str) -> DriveResult<DirectoryCursor> {
        DirectoryCursor::open(Arc::clone(&self.session), url)
    }

    /// Create the directory `url` and return it.
    ///
    /// Existing directories along the way are descended into. A missing
    /// segment is created only when it is the last one or `recursive` is
    /// set; otherwise the call fails with `NotFound` without having created
    /// anything. An existing directory at `url` is returned as is.
    #[instrument(level = "info", name = "ops::mkdir", skip_all, fields(path = %url, mode = mode, recursive = recursive))]
    pub fn mkdir(&self, url: &str, mode: u32, recursive: bool) -> DriveResult<RemoteObject> {
        let path = self.session.parse_path(url)?;
        self.mkdir_path(&path, mode, recursive)
    }

    fn mkdir_path(&self, path: &DrivePath, mode: u32, recursive: bool) -> DriveResult<RemoteObject> {
        let client = self.session.client();
        let mut current = self.session.root()?;
        let mut walked = DrivePath::root();

        for (i, segment) in path.segments().iter().enumerate() {
            walked = walked.join(segment);
            let parent_id = current
                .id()
                .map(str::to_string)
                .ok_or_else(|| DriveError::not_found(walked.to_string()))?;

            let existing = client
                .children(&parent_id, TypeFilter::Directory)?
                .into_iter()
                .rev()
                .find(|child| &child.title == segment);
            if let Some(dir) = existing {
                trace!(path = %walked, "directory exists");
                current = dir;
                continue;
            }

            let is_last = i + 1 == path.depth();
            if !is_last && !recursive {
                return Err(DriveError::not_found(walked.to_string()));
            }
            current = client.insert(&RemoteObject::new_directory(segment.as_str(), parent_id), None)?;
            debug!(path = %walked, id = ?current.id, "created directory");
            self.apply_permissions(&walked, mode);
        }
        Ok(current)
    }

    /// Best-effort `chmod` after creating a directory. The store has no
    /// POSIX permissions, so this never changes anything.
    fn apply_permissions(&self, path: &DrivePath, mode: u32) {
        if let Err(e) = self.set_metadata_path(path, MetadataOption::Access(mode)) {
            trace!(%path, mode, error = %e, "permissions not applied");
        }
    }

    /// Delete the empty directory `url`.
    #[instrument(level = "info", name = "ops::rmdir", skip_all, fields(path = %url))]
    pub fn rmdir(&self, url: &str) -> DriveResult<()> {
        let path = self.session.parse_path(url)?;
        if path.is_root() {
            return Err(DriveError::invalid_path("the root directory cannot be removed"));
        }
        if !self.lookup(&path)?.is_dir() {
            return Err(DriveError::not_a_directory(path.to_string()));
        }

        let mut cursor = self.open_dir(url)?;
        let mut count = 0usize;
        while cursor.next()?.is_some() {
            count += 1;
        }
        if count > 0 {
            return Err(DriveError::not_empty(path.to_string()));
        }

        let id = cursor
            .directory()
            .id()
            .ok_or_else(|| DriveError::not_found(path.to_string()))?;
        self.session.client().delete(id)?;
        cursor.close();
        Ok(())
    }

    /// Move or rename the directory `from` to `to`.
    ///
    /// The object keeps its id; only its title and parent change. A missing
    /// parent of `to` is created, but only one level of it.
    #[instrument(level = "info", name = "ops::rename", skip_all, fields(from = %from, to = %to))]
    pub fn rename(&self, from: &str, to: &str) -> DriveResult<RemoteObject> {
        let from_path = self.session.parse_path(from)?;
        let to_path = self.session.parse_path(to)?;

        let source = self.lookup(&from_path)?;
        if source.is_file() {
            return Err(DriveError::Unsupported("rename of files"));
        }
        if from_path.is_root() {
            return Err(DriveError::invalid_path("the root directory cannot be renamed"));
        }
        if to_path.starts_with(&from_path) {
            return Err(DriveError::invalid_path(format!(
                "cannot move {from_path} into itself ({to_path})"
            )));
        }
        if self.resolver().lookup(&to_path, TypeFilter::Any)?.is_some() {
            return Err(DriveError::already_exists(to_path.to_string()));
        }
        let (Some(name), Some(parent_path)) = (to_path.file_name(), to_path.parent()) else {
            return Err(DriveError::already_exists(to_path.to_string()));
        };

        let parent = self.mkdir_path(&parent_path, DEFAULT_DIR_MODE, false)?;
        let parent_id = parent
            .id()
            .ok_or_else(|| DriveError::not_found(parent_path.to_string()))?;
        let id = source
            .id()
            .ok_or_else(|| DriveError::not_found(from_path.to_string()))?;

        let mut moved = source.clone();
        moved.title = name.to_string();
        moved.set_parent(parent_id);
        let stored = self
            .session
            .client()
            .update(id, &moved, UpdateOptions::metadata())?;
        debug!(%id, "directory moved");
        Ok(stored)
    }

    /// Delete the file `url`.
    #[instrument(level = "info", name = "ops::unlink", skip_all, fields(path = %url))]
    pub fn unlink(&self, url: &str) -> DriveResult<()> {
        let path = self.session.parse_path(url)?;
        let object = self.lookup(&path)?;
        if object.is_dir() {
            return Err(DriveError::not_a_file(path.to_string()));
        }
        let id = object
            .id()
            .ok_or_else(|| DriveError::not_found(path.to_string()))?;
        self.session.client().delete(id)?;
        Ok(())
    }

    /// Apply a metadata change to `url`.
    ///
    /// Only [`MetadataOption::Touch`] is supported. Touching a missing path
    /// creates an empty file when its parent directory exists.
    #[instrument(level = "info", name = "ops::metadata", skip_all, fields(path = %url, option = option.name()))]
    pub fn set_metadata(&self, url: &str, option: MetadataOption) -> DriveResult<()> {
        let path = self.session.parse_path(url)?;
        self.set_metadata_path(&path, option)
    }

    fn set_metadata_path(&self, path: &DrivePath, option: MetadataOption) -> DriveResult<()> {
        let (mtime, atime) = match option {
            MetadataOption::Touch { mtime, atime } => (mtime, atime),
            other => return Err(DriveError::Unsupported(other.name())),
        };
        if atime.is_some() {
            trace!(%path, "explicit atime ignored");
        }

        let Some(mut object) = self.resolver().lookup(path, TypeFilter::Any)? else {
            let mut file = FileHandle::open(Arc::clone(&self.session), path, OpenMode::CreateNew)?;
            file.truncate(0)?;
            file.close();
            return Ok(());
        };
        let id = object
            .id()
            .map(str::to_string)
            .ok_or_else(|| DriveError::not_found(path.to_string()))?;
        object.modified_time = Some(mtime.unwrap_or_else(Utc::now));
        self.session
            .client()
            .update(&id, &object, UpdateOptions::touch())?;
        Ok(())
    }

    /// Stat `url`, with "now" taken from the clock.
    pub fn url_stat(&self, url: &str) -> DriveResult<StatRecord> {
        self.url_stat_at(url, Utc::now())
    }

    /// Stat `url`, reporting missing timestamps as `now`.
    #[instrument(level = "debug", name = "ops::url_stat", skip_all, fields(path = %url))]
    pub fn url_stat_at(&self, url: &str, now: DateTime<Utc>) -> DriveResult<StatRecord> {
        let path = self.session.parse_path(url)?;
        let object = self.lookup(&path)?;
        Ok(StatRecord::from_object(&object, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{DriveOp, MemoryDrive};
    use crate::config::DriveConfig;
    use crate::error::RemoteError;
    use chrono::TimeZone;

    fn setup() -> (Arc<MemoryDrive>, DriveOperations) {
        let drive = Arc::new(MemoryDrive::new());
        let session = DriveSession::new(drive.clone(), DriveConfig::default()).into_shared();
        (drive, DriveOperations::new(session))
    }

    fn write(ops: &DriveOperations, url: &str, data: &[u8]) {
        let mut file = ops.open_file(url, "w").unwrap();
        file.write(data).unwrap();
        file.close();
    }

    #[test]
    fn test_mkdir_single_and_existing() {
        let (drive, ops) = setup();
        let a = ops.mkdir("gdrive://a", 0o755, false).unwrap();
        assert!(a.is_dir());
        assert_eq!(drive.object_count(), 2);

        let again = ops.mkdir("gdrive://a", 0o755, false).unwrap();
        assert_eq!(again.id, a.id);
        assert_eq!(drive.object_count(), 2);
    }

    #[test]
    fn test_mkdir_non_recursive_creates_nothing() {
        let (drive, ops) = setup();
        let err = ops.mkdir("/x/y/z", 0o755, false).unwrap_err();
        assert!(matches!(err, DriveError::NotFound(_)));
        assert_eq!(drive.object_count(), 1);
        assert_eq!(drive.calls().insert, 0);
    }

    #[test]
    fn test_mkdir_recursive() {
        let (drive, ops) = setup();
        ops.mkdir("/x", 0o755, false).unwrap();
        let z = ops.mkdir("/x/y/z", 0o755, true).unwrap();
        assert_eq!(z.title, "z");
        assert_eq!(drive.object_count(), 4);
        assert!(ops.url_stat("/x/y/z").unwrap().is_dir());
    }

    #[test]
    fn test_mkdir_remote_failure_propagates() {
        let (drive, ops) = setup();
        drive.fail_next(DriveOp::Insert, RemoteError::RateLimited("quota".into()));
        let err = ops.mkdir("/a", 0o755, false).unwrap_err();
        assert!(matches!(err, DriveError::Remote(RemoteError::RateLimited(_))));
        assert_eq!(drive.calls().insert, 1);
    }

    #[test]
    fn test_rmdir() {
        let (drive, ops) = setup();
        ops.mkdir("/a/b", 0o755, true).unwrap();

        assert!(matches!(ops.rmdir("/a"), Err(DriveError::NotEmpty(_))));
        assert_eq!(drive.calls().delete, 0);

        ops.rmdir("/a/b").unwrap();
        ops.rmdir("/a").unwrap();
        assert_eq!(drive.object_count(), 1);
        assert!(matches!(ops.rmdir("/a"), Err(DriveError::NotFound(_))));
    }

    #[test]
    fn test_rmdir_rejects_files_and_root() {
        let (_drive, ops) = setup();
        write(&ops, "/f.txt", b"x");
        assert!(matches!(ops.rmdir("/f.txt"), Err(DriveError::NotADirectory(_))));
        assert!(matches!(ops.rmdir("gdrive://"), Err(DriveError::InvalidPath(_))));
    }

    #[test]
    fn test_rename_directory_keeps_id() {
        let (_drive, ops) = setup();
        let b = ops.mkdir("/a/b", 0o755, true).unwrap();
        ops.mkdir("/a/b/inner", 0o755, false).unwrap();

        let moved = ops.rename("/a/b", "/a/c").unwrap();
        assert_eq!(moved.id, b.id);
        assert_eq!(moved.title, "c");
        assert!(matches!(ops.url_stat("/a/b"), Err(DriveError::NotFound(_))));
        assert!(ops.url_stat("/a/c/inner").unwrap().is_dir());
    }

    #[test]
    fn test_rename_creates_one_missing_parent() {
        let (_drive, ops) = setup();
        ops.mkdir("/a", 0o755, false).unwrap();

        ops.rename("/a", "/new/a2").unwrap();
        assert!(ops.url_stat("/new/a2").unwrap().is_dir());

        ops.mkdir("/b", 0o755, false).unwrap();
        assert!(matches!(
            ops.rename("/b", "/deep/er/b2"),
            Err(DriveError::NotFound(_))
        ));
        assert!(ops.url_stat("/b").is_ok());
    }

    #[test]
    fn test_rename_rejections() {
        let (_drive, ops) = setup();
        ops.mkdir("/a/b", 0o755, true).unwrap();
        ops.mkdir("/c", 0o755, false).unwrap();
        write(&ops, "/f.txt", b"x");

        assert!(matches!(
            ops.rename("/f.txt", "/g.txt"),
            Err(DriveError::Unsupported(_))
        ));
        assert!(matches!(ops.rename("/a", "/c"), Err(DriveError::AlreadyExists(_))));
        assert!(matches!(ops.rename("/a", "/a/b/x"), Err(DriveError::InvalidPath(_))));
        assert!(matches!(ops.rename("/missing", "/m"), Err(DriveError::NotFound(_))));
    }

    #[test]
    fn test_unlink() {
        let (drive, ops) = setup();
        ops.mkdir("/d", 0o755, false).unwrap();
        write(&ops, "/d/f.txt", b"bye");

        assert!(matches!(ops.unlink("/d"), Err(DriveError::NotAFile(_))));
        ops.unlink("/d/f.txt").unwrap();
        assert!(matches!(ops.unlink("/d/f.txt"), Err(DriveError::NotFound(_))));
        assert_eq!(drive.object_count(), 2);
    }

    #[test]
    fn test_touch_existing_sets_mtime() {
        let (_drive, ops) = setup();
        write(&ops, "/f.txt", b"x");
        let when = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();

        ops.set_metadata(
            "/f.txt",
            MetadataOption::Touch {
                mtime: Some(when),
                atime: None,
            },
        )
        .unwrap();
        assert_eq!(ops.url_stat("/f.txt").unwrap().mtime, when.timestamp());
    }

    #[test]
    fn test_touch_missing_creates_empty_file() {
        let (_drive, ops) = setup();
        ops.set_metadata("/new.txt", MetadataOption::touch()).unwrap();
        let stat = ops.url_stat("/new.txt").unwrap();
        assert!(stat.is_file());
        assert_eq!(stat.size, 0);

        assert!(matches!(
            ops.set_metadata("/nodir/new.txt", MetadataOption::touch()),
            Err(DriveError::NotFound(_))
        ));
    }

    #[test]
    fn test_other_metadata_unsupported() {
        let (_drive, ops) = setup();
        write(&ops, "/f.txt", b"x");
        for option in [
            MetadataOption::Owner(0),
            MetadataOption::OwnerName("root".into()),
            MetadataOption::Group(0),
            MetadataOption::GroupName("wheel".into()),
            MetadataOption::Access(0o644),
        ] {
            assert!(matches!(
                ops.set_metadata("/f.txt", option),
                Err(DriveError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_url_stat_is_stable() {
        let (_drive, ops) = setup();
        write(&ops, "/f.txt", b"hello");
        let now = Utc::now();
        let first = ops.url_stat_at("/f.txt", now).unwrap();
        let second = ops.url_stat_at("/f.txt", now).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.size, 5);
        assert_eq!(first.uid, "me");
    }
}
