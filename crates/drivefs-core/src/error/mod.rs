//! Error types for the drivefs-core crate
//!
//! Two layers: [`RemoteError`] is what an [`ObjectGraphClient`] reports, and
//! [`DriveError`] is what filesystem operations report. Remote failures are
//! carried through unchanged inside [`DriveError::Remote`]; this layer never
//! retries them.
//!
//! [`ObjectGraphClient`]: crate::client::ObjectGraphClient

mod category;

pub use category::ErrorCategory;

use std::io;
use thiserror::Error;

/// Failure reported by the object graph client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The store has no object with this id or locator.
    #[error("remote object not found: {0}")]
    NotFound(String),

    /// Credentials do not allow the call.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Network or HTTP failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Quota exhausted or rate limited.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The store rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for object graph client calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure of a filesystem-level operation.
#[derive(Debug, Error)]
pub enum DriveError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("not a file: {0}")]
    NotAFile(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// The operation is rejected rather than attempted.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// An fopen-style mode string that names no known mode.
    #[error("invalid open mode: {0:?}")]
    InvalidMode(String),

    #[error("remote failure: {0}")]
    Remote(#[from] RemoteError),
}

impl DriveError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile(path.into())
    }

    pub fn not_empty(path: impl Into<String>) -> Self {
        Self::NotEmpty(path.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Classify this error for errno or HTTP mapping.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from(self)
    }

    /// POSIX errno for this error.
    pub fn to_errno(&self) -> i32 {
        self.category().to_errno()
    }
}

impl From<DriveError> for io::Error {
    fn from(e: DriveError) -> Self {
        let kind = e.category().io_kind();
        io::Error::new(kind, e)
    }
}

/// Result type for filesystem operations.
pub type DriveResult<T> = Result<T, DriveError>;
