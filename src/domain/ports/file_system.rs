//! FileSystem port - where planned ops are carried out
//!
//! The executor only needs to copy and write; keeping the surface this
//! small lets tests substitute an in-memory implementation.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug, Error)]
pub enum FsError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl FsError {
    /// Classify an I/O error against the path it happened on
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O with atomic writes
pub trait FileSystem {
    /// Copy `from` to `to`, creating parent directories. Returns bytes copied.
    fn copy(&self, from: &Path, to: &Path) -> FsResult<u64>;

    /// Write `content` to `path`, creating parent directories
    fn write(&self, path: &Path, content: &[u8]) -> FsResult<()>;

    fn exists(&self, path: &Path) -> bool;
}
