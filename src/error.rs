//! Error types shared by the organizer and the CLI.

use crate::config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while organizing a directory.
///
/// The run aborts on the first error. Files moved before the failure stay
/// where they were moved.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target path is missing or is not a directory.
    #[error("{} is not a valid directory: {reason}", .path.display())]
    InvalidTarget { path: PathBuf, reason: String },

    /// Listing the target directory failed.
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A destination container could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    ContainerCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Something other than a directory occupies a container path.
    #[error("cannot create directory {}: a non-directory entry is in the way", .path.display())]
    ContainerBlocked { path: PathBuf },

    /// A file whose name is needed for a container could not be moved aside.
    #[error("failed to stage {} as {}: {source}", .path.display(), .staged.display())]
    Staging {
        path: PathBuf,
        staged: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Moving a file into its container failed.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The filter configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OrganizeError {
    /// Returns true for errors caused by bad input rather than a failed run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. } | Self::Config(_))
    }
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
