//! Error classification shared by every host binding.
//!
//! Host runtimes want different representations of the same failure: a
//! POSIX errno for FUSE-style bindings, an [`io::ErrorKind`] for Rust
//! callers. [`ErrorCategory`] is the common classification both derive from.

use super::{DriveError, RemoteError};
use std::io;

/// Coarse classification of a [`DriveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    AlreadyExists,
    NotEmpty,
    IsDirectory,
    NotDirectory,
    PermissionDenied,
    InvalidArgument,
    RateLimited,
    IoError,
    NotSupported,
}

impl ErrorCategory {
    /// POSIX errno for this category.
    pub fn to_errno(self) -> i32 {
        match self {
            ErrorCategory::NotFound => libc::ENOENT,
            ErrorCategory::AlreadyExists => libc::EEXIST,
            ErrorCategory::NotEmpty => libc::ENOTEMPTY,
            ErrorCategory::IsDirectory => libc::EISDIR,
            ErrorCategory::NotDirectory => libc::ENOTDIR,
            ErrorCategory::PermissionDenied => libc::EACCES,
            ErrorCategory::InvalidArgument => libc::EINVAL,
            ErrorCategory::RateLimited => libc::EAGAIN,
            ErrorCategory::IoError => libc::EIO,
            ErrorCategory::NotSupported => libc::ENOTSUP,
        }
    }

    pub fn io_kind(self) -> io::ErrorKind {
        match self {
            ErrorCategory::NotFound => io::ErrorKind::NotFound,
            ErrorCategory::AlreadyExists => io::ErrorKind::AlreadyExists,
            ErrorCategory::NotEmpty => io::ErrorKind::DirectoryNotEmpty,
            ErrorCategory::IsDirectory => io::ErrorKind::IsADirectory,
            ErrorCategory::NotDirectory => io::ErrorKind::NotADirectory,
            ErrorCategory::PermissionDenied => io::ErrorKind::PermissionDenied,
            ErrorCategory::InvalidArgument => io::ErrorKind::InvalidInput,
            ErrorCategory::RateLimited => io::ErrorKind::WouldBlock,
            ErrorCategory::IoError => io::ErrorKind::Other,
            ErrorCategory::NotSupported => io::ErrorKind::Unsupported,
        }
    }
}

impl From<&RemoteError> for ErrorCategory {
    fn from(e: &RemoteError) -> Self {
        match e {
            RemoteError::NotFound(_) => ErrorCategory::NotFound,
            RemoteError::PermissionDenied(_) => ErrorCategory::PermissionDenied,
            RemoteError::Transport(_) => ErrorCategory::IoError,
            RemoteError::RateLimited(_) => ErrorCategory::RateLimited,
            RemoteError::InvalidRequest(_) => ErrorCategory::InvalidArgument,
        }
    }
}

impl From<&DriveError> for ErrorCategory {
    fn from(e: &DriveError) -> Self {
        match e {
            DriveError::NotFound(_) => ErrorCategory::NotFound,
            DriveError::AlreadyExists(_) => ErrorCategory::AlreadyExists,
            DriveError::NotADirectory(_) => ErrorCategory::NotDirectory,
            DriveError::NotAFile(_) => ErrorCategory::IsDirectory,
            DriveError::NotEmpty(_) => ErrorCategory::NotEmpty,
            DriveError::Unsupported(_) => ErrorCategory::NotSupported,
            DriveError::InvalidPath(_) | DriveError::InvalidMode(_) => {
                ErrorCategory::InvalidArgument
            }
            DriveError::Remote(remote) => ErrorCategory::from(remote),
        }
    }
}
