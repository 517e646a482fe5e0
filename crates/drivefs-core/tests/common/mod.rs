//! Shared harness for drivefs-core integration tests.

#![allow(dead_code)]

use drivefs_core::{
    DriveConfig, DriveOperations, DriveSession, MemoryDrive, ObjectGraphClient, RemoteObject,
    StreamWrapper,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Route library logs to the test writer. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A session over a fresh in-memory drive, with the drive kept at hand for
/// inspecting call counts and injecting failures.
pub struct TestDrive {
    pub drive: Arc<MemoryDrive>,
    pub session: Arc<DriveSession>,
}

impl TestDrive {
    pub fn new() -> Self {
        Self::with_config(DriveConfig::default())
    }

    pub fn with_config(config: DriveConfig) -> Self {
        init_tracing();
        let drive = Arc::new(MemoryDrive::new());
        let session = DriveSession::new(drive.clone(), config).into_shared();
        Self { drive, session }
    }

    pub fn ops(&self) -> DriveOperations {
        DriveOperations::new(self.session.clone())
    }

    pub fn wrapper(&self) -> StreamWrapper {
        StreamWrapper::new(self.session.clone())
    }

    /// Write `data` to `url`, replacing any content.
    pub fn put(&self, url: &str, data: &[u8]) {
        let mut file = self.ops().open_file(url, "w").unwrap();
        assert_eq!(file.write(data).unwrap(), data.len());
        file.close();
    }

    /// Full content of `url`.
    pub fn get(&self, url: &str) -> Vec<u8> {
        let mut file = self.ops().open_file(url, "r").unwrap();
        let size = usize::try_from(file.remote_size()).unwrap();
        let data = file.read(size.max(1)).unwrap();
        file.close();
        data
    }

    /// Insert a directory straight into the store, bypassing path checks.
    pub fn raw_dir(&self, title: &str, parent_id: &str) -> RemoteObject {
        self.drive
            .insert(&RemoteObject::new_directory(title, parent_id), None)
            .unwrap()
    }

    pub fn root_id(&self) -> String {
        self.drive.root().unwrap().id.unwrap()
    }
}
