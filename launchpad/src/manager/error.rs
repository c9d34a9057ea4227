//! Error types for payload installation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while deciding on or performing an installation.
///
/// Only some of these ever reach a caller. Entry-level failures
/// ([`ManagerError::EntryIo`], [`ManagerError::CreateDirFailed`] while
/// extracting) are logged and folded into the install report instead.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Failed to read a file or directory.
    #[error("failed to read {}: {}", .path.display(), .source)]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file or directory.
    #[error("failed to write {}: {}", .path.display(), .source)]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {}", .path.display(), .source)]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// A single archive or loose-file entry could not be created or copied.
    #[error("failed to install entry {}: {}", .path.display(), .source)]
    EntryIo { path: PathBuf, source: io::Error },

    /// The archive could not be read from its source.
    #[error("failed to read archive: {source}")]
    ArchiveRead { source: io::Error },

    /// The archive container itself cannot be parsed.
    #[error("archive is corrupt: {reason}")]
    ArchiveCorrupt { reason: String },

    /// The bundle namespace holds neither an archive nor loose files.
    #[error("bundle namespace '{namespace}' contains nothing to install")]
    BundleEmpty { namespace: String },

    /// A loose-file install finished without a usable entry point.
    #[error("loose-file install is not usable: entry point '{entry_point}' was not installed")]
    EntryPointMissing { entry_point: String },

    /// Symlink operation failed.
    #[error("symlink operation failed ({} -> {}): {reason}", .link.display(), .target.display())]
    SymlinkFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },

    /// Invalid path provided.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}
