//! Error types and handling for treesync
//!
//! Every failure that can end a sync run is a variant of [`Error`]. Failures
//! that never end a run (a busy file that clears up after a retry, a symlink
//! that could not be replaced) are handled inside the engine and never reach
//! this type.

use std::path::PathBuf;

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - operation can continue
    Low,
    /// Medium severity - operation may succeed when re-run
    Medium,
    /// High severity - operation should be aborted
    High,
    /// Critical severity - entire process should be terminated
    Critical,
}

/// Main error type for treesync operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// The source root is missing or not a directory
    #[error("Invalid source '{}': {message}", path.display())]
    InvalidSource {
        /// Source root that was rejected
        path: PathBuf,
        /// Why the source was rejected
        message: String,
    },

    /// A destination directory could not be created
    #[error("Failed to create directory '{}': {message}", path.display())]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A source directory could not be listed
    #[error("Failed to read directory '{}': {message}", path.display())]
    ReadDirectory {
        /// Directory that could not be listed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Metadata of a source entry could not be read
    #[error("Failed to read metadata for '{}': {message}", path.display())]
    Metadata {
        /// Entry whose metadata could not be read
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// The target of a source symlink could not be read
    #[error("Failed to read symlink '{}': {message}", path.display())]
    ReadLink {
        /// Symlink that could not be read
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A file copy failed permanently
    #[error(
        "Failed to copy '{}' to '{}' after {attempts} attempt(s): {message}",
        source_path.display(),
        destination.display()
    )]
    Copy {
        /// File being copied
        source_path: PathBuf,
        /// Copy destination
        destination: PathBuf,
        /// Number of attempts made before giving up
        attempts: u32,
        /// Whether the last failure was transient (retries exhausted)
        transient: bool,
        /// Underlying error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A spawned sync task panicked or was aborted
    #[error("Sync task failed: {message}")]
    Task {
        /// Description of the task failure
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O on the source side (listing, metadata, links)
    Source,
    /// I/O on the destination side (directory creation)
    Destination,
    /// File copy failures
    Copy,
    /// Configuration and input validation
    Config,
    /// Task runtime failures
    Task,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidSource { .. }
            | Self::ReadDirectory { .. }
            | Self::Metadata { .. }
            | Self::ReadLink { .. } => ErrorKind::Source,
            Self::DirectoryCreation { .. } => ErrorKind::Destination,
            Self::Copy { .. } => ErrorKind::Copy,
            Self::Config { .. } => ErrorKind::Config,
            Self::Task { .. } => ErrorKind::Task,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Copy { transient, .. } => {
                if *transient {
                    ErrorSeverity::Medium
                } else {
                    ErrorSeverity::High
                }
            }
            Self::ReadDirectory { .. } | Self::Metadata { .. } | Self::ReadLink { .. } => {
                ErrorSeverity::Medium
            }
            Self::InvalidSource { .. } | Self::DirectoryCreation { .. } | Self::Config { .. } => {
                ErrorSeverity::High
            }
            Self::Task { .. } => ErrorSeverity::Critical,
        }
    }

    /// Check whether re-running the sync may succeed without user action
    ///
    /// A busy file that stayed busy for every attempt is likely free on the
    /// next run; a missing source or a bad configuration is not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Copy { transient, .. } => *transient,
            Self::ReadDirectory { .. } | Self::Metadata { .. } | Self::ReadLink { .. } => true,
            Self::InvalidSource { .. }
            | Self::DirectoryCreation { .. }
            | Self::Config { .. }
            | Self::Task { .. } => false,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new task error
    pub fn task<S: Into<String>>(message: S) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Create a new invalid source error
    pub fn invalid_source<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::InvalidSource {
            path: path.into(),
            message: message.into(),
        }
    }
}
