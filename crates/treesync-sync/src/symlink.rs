//! Best-effort replication of symbolic links

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use treesync_types::{Error, Result};

/// Outcome of replicating one symlink
///
/// Failing to replace a link never aborts a run; it is reported here and
/// logged instead of surfacing as an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The destination now links to the source's target
    Relinked {
        /// Literal link target
        target: PathBuf,
    },
    /// The destination could not be replaced
    Failed {
        /// What went wrong
        reason: String,
    },
}

impl LinkOutcome {
    /// Whether the link was recreated
    pub fn is_relinked(&self) -> bool {
        matches!(self, Self::Relinked { .. })
    }
}

/// Recreates source symlinks at the destination with the same literal target
#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkReplicator;

impl SymlinkReplicator {
    /// Create a new replicator
    pub fn new() -> Self {
        Self
    }

    /// Replace `destination` with a symlink pointing where `source` points
    ///
    /// The target is not resolved or rewritten, so relative and dangling
    /// targets are reproduced as-is. Only failing to read the source link is
    /// an error.
    pub async fn replicate(&self, source: &Path, destination: &Path) -> Result<LinkOutcome> {
        let target = fs::read_link(source).await.map_err(|e| Error::ReadLink {
            path: source.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut remove_error = None;
        match remove_existing(destination).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(
                    "Could not remove '{}' before relinking: {}",
                    destination.display(),
                    e
                );
                remove_error = Some(e);
            }
        }

        match create_symlink(&target, source, destination).await {
            Ok(()) => {
                debug!(
                    "Linked: {} -> {}",
                    destination.display(),
                    target.display()
                );
                Ok(LinkOutcome::Relinked { target })
            }
            Err(e) => {
                warn!(
                    "Could not create symlink '{}' -> '{}': {}",
                    destination.display(),
                    target.display(),
                    e
                );
                let reason = match remove_error {
                    Some(remove) => format!("{} (removing old entry: {})", e, remove),
                    None => e.to_string(),
                };
                Ok(LinkOutcome::Failed { reason })
            }
        }
    }
}

/// Remove whatever occupies `path` when it is a file or a symlink
#[cfg(windows)]
async fn remove_existing(path: &Path) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    // Directory symlinks only go away through remove_dir
    let metadata = fs::symlink_metadata(path).await?;
    if metadata.file_type().is_symlink_dir() {
        fs::remove_dir(path).await
    } else {
        fs::remove_file(path).await
    }
}

#[cfg(not(windows))]
async fn remove_existing(path: &Path) -> io::Result<()> {
    fs::remove_file(path).await
}

#[cfg(unix)]
async fn create_symlink(target: &Path, _source: &Path, link: &Path) -> io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(windows)]
async fn create_symlink(target: &Path, source: &Path, link: &Path) -> io::Result<()> {
    // Windows needs to know the link flavour up front
    let points_to_dir = fs::metadata(source)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false);
    if points_to_dir {
        fs::symlink_dir(target, link).await
    } else {
        fs::symlink_file(target, link).await
    }
}

#[cfg(not(any(unix, windows)))]
async fn create_symlink(_target: &Path, _source: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_dangling_target_is_kept_literally() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("link");
        let destination = temp_dir.path().join("copy");
        symlink("../nowhere/file.txt", &source).unwrap();

        let outcome = SymlinkReplicator::new()
            .replicate(&source, &destination)
            .await
            .unwrap();

        assert!(outcome.is_relinked());
        assert_eq!(
            std::fs::read_link(&destination).unwrap(),
            PathBuf::from("../nowhere/file.txt")
        );
    }

    #[tokio::test]
    async fn test_existing_entry_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("link");
        let destination = temp_dir.path().join("copy");
        symlink("new-target", &source).unwrap();
        std::fs::write(&destination, b"plain file").unwrap();

        SymlinkReplicator::new()
            .replicate(&source, &destination)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_link(&destination).unwrap(),
            PathBuf::from("new-target")
        );
    }

    #[tokio::test]
    async fn test_existing_directory_link_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("old-dir")).unwrap();
        let source = temp_dir.path().join("link");
        let destination = temp_dir.path().join("copy");
        symlink("new-target", &source).unwrap();
        symlink("old-dir", &destination).unwrap();

        let outcome = SymlinkReplicator::new()
            .replicate(&source, &destination)
            .await
            .unwrap();

        assert!(outcome.is_relinked());
        assert_eq!(
            std::fs::read_link(&destination).unwrap(),
            PathBuf::from("new-target")
        );
        assert!(temp_dir.path().join("old-dir").is_dir());
    }

    #[tokio::test]
    async fn test_unreplaceable_destination_is_reported_not_raised() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("link");
        let destination = temp_dir.path().join("occupied");
        symlink("target", &source).unwrap();
        std::fs::create_dir(&destination).unwrap();
        std::fs::write(destination.join("keep.txt"), b"x").unwrap();

        let outcome = SymlinkReplicator::new()
            .replicate(&source, &destination)
            .await
            .unwrap();

        assert!(matches!(outcome, LinkOutcome::Failed { .. }));
        assert!(destination.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_unreadable_source_link_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = SymlinkReplicator::new()
            .replicate(&temp_dir.path().join("missing"), &temp_dir.path().join("copy"))
            .await;
        assert!(matches!(result, Err(Error::ReadLink { .. })));
    }
}
