//! Process-wide drive state.
//!
//! A [`DriveSession`] bundles the client, the configuration, the MIME
//! registry and the root object cache. It is built once, wrapped in an
//! `Arc`, and handed to every surface instance; file handles and directory
//! cursors borrow it for remote calls but own all of their own state.

use crate::client::ObjectGraphClient;
use crate::config::DriveConfig;
use crate::error::DriveResult;
use crate::mime::MimeRegistry;
use crate::object::RemoteObject;
use crate::path::DrivePath;
use crate::resolver::PathResolver;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared state of one drive connection.
pub struct DriveSession {
    client: Arc<dyn ObjectGraphClient>,
    config: DriveConfig,
    mime_types: RwLock<MimeRegistry>,
    root: Mutex<Option<RemoteObject>>,
}

impl fmt::Debug for DriveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveSession")
            .field("scheme", &self.config.scheme)
            .field("domain", &self.config.domain)
            .field("root_cached", &self.root.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl DriveSession {
    pub fn new(client: Arc<dyn ObjectGraphClient>, config: DriveConfig) -> Self {
        let mime_types = config.mime_registry();
        debug!(
            scheme = %config.scheme,
            domain = ?config.domain,
            mime_types = mime_types.len(),
            "drive session created"
        );
        Self {
            client,
            config,
            mime_types: RwLock::new(mime_types),
            root: Mutex::new(None),
        }
    }

    /// Wrap in an `Arc` for sharing between surface instances.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[inline]
    pub fn client(&self) -> &dyn ObjectGraphClient {
        self.client.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    #[inline]
    pub fn scheme(&self) -> &str {
        &self.config.scheme
    }

    /// Parse a URL or bare path using this session's scheme.
    pub fn parse_path(&self, raw: &str) -> DriveResult<DrivePath> {
        DrivePath::parse(raw, &self.config.scheme)
    }

    /// Render `path` as a URL with this session's scheme.
    pub fn url_for(&self, path: &DrivePath) -> String {
        path.to_url(&self.config.scheme)
    }

    /// Register the content type used when `path` is created as a file.
    pub fn register_mime_type(&self, path: &str, mime_type: impl Into<String>) {
        self.mime_types.write().register(path, mime_type);
    }

    /// Content type for a new file at `path`.
    pub fn mime_type_for(&self, path: &DrivePath) -> String {
        self.mime_types.read().lookup(path).to_string()
    }

    /// The root directory, fetched on first use and cached for the session.
    pub fn root(&self) -> DriveResult<RemoteObject> {
        let mut cached = self.root.lock();
        if let Some(root) = cached.as_ref() {
            return Ok(root.clone());
        }
        let root = self.client.root()?;
        debug!(id = ?root.id, "cached root object");
        *cached = Some(root.clone());
        Ok(root)
    }

    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{DriveOp, MemoryDrive};
    use crate::error::{DriveError, RemoteError};

    #[test]
    fn test_root_is_fetched_once() {
        let drive = Arc::new(MemoryDrive::new());
        let session = DriveSession::new(drive.clone(), DriveConfig::default());

        let first = session.root().unwrap();
        let second = session.root().unwrap();
        assert_eq!(first, second);
        assert_eq!(drive.calls().root, 1);
    }

    #[test]
    fn test_root_failure_is_not_cached() {
        let drive = Arc::new(MemoryDrive::new());
        let session = DriveSession::new(drive.clone(), DriveConfig::default());

        drive.fail_next(DriveOp::Root, RemoteError::Transport("offline".into()));
        assert!(matches!(session.root(), Err(DriveError::Remote(_))));
        assert!(session.root().is_ok());
        assert_eq!(drive.calls().root, 2);
    }

    #[test]
    fn test_mime_registration() {
        let session = DriveSession::new(
            Arc::new(MemoryDrive::new()),
            DriveConfig::default().with_mime_type("/a.csv", "text/csv"),
        );
        session.register_mime_type("gdrive://b.png", "image/png");

        let a = session.parse_path("gdrive://a.csv").unwrap();
        let b = session.parse_path("/b.png").unwrap();
        let c = session.parse_path("/c").unwrap();
        assert_eq!(session.mime_type_for(&a), "text/csv");
        assert_eq!(session.mime_type_for(&b), "image/png");
        assert_eq!(session.mime_type_for(&c), "text/plain");
    }
}
