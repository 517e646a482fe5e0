//! A POSIX-like filesystem over a cloud drive's object graph.
//!
//! The drive stores files and directories as flat objects that point at
//! their parents. This crate maps slash-separated paths onto that graph and
//! makes the store's fetch-whole-object API behave like seekable streams.
//!
//! # Components
//!
//! - [`ObjectGraphClient`] - Narrow trait over the remote store
//! - [`MemoryDrive`] - In-process store with JSON snapshots
//! - [`DriveSession`] - Client, configuration, MIME registry and root cache
//! - [`PathResolver`] - Path → object, one listing per segment
//! - [`DirectoryCursor`] - Snapshot listing of one directory
//! - [`FileHandle`] - Buffered read/write/seek/truncate over one object
//! - [`StatRecord`] - `stat(2)`-shaped view of an object
//! - [`DriveOperations`] - mkdir, rmdir, rename, unlink, touch, stat
//! - [`StreamWrapper`] - The call surface a host runtime drives
//!
//! # Example
//!
//! ```
//! use drivefs_core::{DriveConfig, DriveSession, MemoryDrive, StreamWrapper};
//! use std::sync::Arc;
//!
//! let session = DriveSession::new(Arc::new(MemoryDrive::new()), DriveConfig::default())
//!     .into_shared();
//! let mut stream = StreamWrapper::new(session);
//!
//! assert!(stream.mkdir("gdrive://notes", 0o755, false));
//! assert!(stream.stream_open("gdrive://notes/today.txt", "w"));
//! assert_eq!(stream.stream_write(b"hello"), 5);
//! stream.stream_close();
//!
//! let stat = stream.url_stat("gdrive://notes/today.txt").unwrap();
//! assert_eq!(stat.size, 5);
//! ```

pub mod buffer;
pub mod client;
pub mod config;
pub mod dir;
pub mod error;
pub mod file;
pub mod mime;
pub mod object;
pub mod ops;
pub mod path;
pub mod resolver;
pub mod session;
pub mod stat;
pub mod wrapper;

pub use buffer::BodyBuffer;
pub use client::{MemoryDrive, ObjectGraphClient, UpdateOptions, Upload};
pub use config::{ConfigError, DriveConfig};
pub use dir::DirectoryCursor;
pub use error::{DriveError, DriveResult, ErrorCategory, RemoteError, RemoteResult};
pub use file::{FileHandle, OpenMode, SeekPolicy, SeekWhence, WritePolicy};
pub use mime::MimeRegistry;
pub use object::{FOLDER_MIME_TYPE, ParentRef, RemoteObject, TypeFilter};
pub use ops::{DriveOperations, MetadataOption};
pub use path::DrivePath;
pub use resolver::PathResolver;
pub use session::DriveSession;
pub use stat::StatRecord;
pub use wrapper::StreamWrapper;
