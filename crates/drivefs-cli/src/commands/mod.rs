pub mod cat;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod rmdir;
pub mod stat;
pub mod touch;
pub mod write;

use drivefs_core::{DriveOperations, DriveResult};

/// Canonical URL for a path given as a URL or a bare `/a/b`.
pub fn drive_url(ops: &DriveOperations, raw: &str) -> DriveResult<String> {
    let session = ops.session();
    let path = session.parse_path(raw)?;
    Ok(session.url_for(&path))
}

/// Last segment of an entry path.
pub fn entry_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivefs_core::{DriveConfig, DriveSession, MemoryDrive};
    use std::sync::Arc;

    fn ops(config: DriveConfig) -> DriveOperations {
        DriveOperations::new(DriveSession::new(Arc::new(MemoryDrive::new()), config).into_shared())
    }

    #[test]
    fn test_drive_url_accepts_bare_paths() {
        let ops = ops(DriveConfig::default());
        assert_eq!(drive_url(&ops, "/a//b/").unwrap(), "gdrive://a/b");
        assert_eq!(drive_url(&ops, "gdrive://a").unwrap(), "gdrive://a");
        assert_eq!(drive_url(&ops, "/").unwrap(), "gdrive://");
    }

    #[test]
    fn test_drive_url_rejects_foreign_scheme() {
        let ops = ops(DriveConfig::default().with_scheme("box"));
        assert!(drive_url(&ops, "gdrive://a").is_err());
        assert_eq!(drive_url(&ops, "box://a").unwrap(), "box://a");
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("gdrive://a/b.txt"), "b.txt");
        assert_eq!(entry_name("plain"), "plain");
    }
}
