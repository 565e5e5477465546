//! Metadata-only change detection for regular files

use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;
use treesync_types::{Error, Result};

/// Modification time and size of a file
///
/// This pair is the only input to change detection; contents are never
/// compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSignature {
    /// Last modification time
    pub modified: SystemTime,
    /// Size in bytes
    pub size: u64,
}

impl FileSignature {
    /// Build a signature from filesystem metadata
    ///
    /// Platforms without modification times report the epoch, so two such
    /// files of equal size compare as up to date.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or_else(|e| {
            debug!("Modification time unavailable, using the epoch: {}", e);
            SystemTime::UNIX_EPOCH
        });
        Self {
            modified,
            size: metadata.len(),
        }
    }

    /// Whether a destination with this signature already mirrors `source`
    pub fn is_up_to_date_with(&self, source: &Self) -> bool {
        self.modified >= source.modified && self.size == source.size
    }
}

/// Why a file has to be copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CopyReason {
    /// Nothing exists at the destination
    Missing,
    /// Sizes differ
    SizeChanged,
    /// Source was modified after the destination
    SourceNewer,
}

/// Result of comparing a source file with its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeDecision {
    /// Destination is up to date
    Unchanged,
    /// Destination must be (re)written
    Copy(CopyReason),
}

impl ChangeDecision {
    /// Whether a copy is required
    pub fn needs_copy(self) -> bool {
        matches!(self, Self::Copy(_))
    }
}

/// Decides per regular file whether the destination copy is current
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Create a new change detector
    pub fn new() -> Self {
        Self
    }

    /// Compare two signatures
    pub fn compare(source: &FileSignature, destination: Option<&FileSignature>) -> ChangeDecision {
        match destination {
            None => ChangeDecision::Copy(CopyReason::Missing),
            Some(dest) if dest.size != source.size => ChangeDecision::Copy(CopyReason::SizeChanged),
            Some(dest) if dest.is_up_to_date_with(source) => ChangeDecision::Unchanged,
            Some(_) => ChangeDecision::Copy(CopyReason::SourceNewer),
        }
    }

    /// Signature of a source file; failure is fatal
    pub async fn source_signature(&self, path: &Path) -> Result<FileSignature> {
        let metadata = fs::metadata(path).await.map_err(|e| Error::Metadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(FileSignature::from_metadata(&metadata))
    }

    /// Signature of a destination file, `None` when it cannot be read
    pub async fn destination_signature(&self, path: &Path) -> Option<FileSignature> {
        match fs::metadata(path).await {
            Ok(metadata) => Some(FileSignature::from_metadata(&metadata)),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(
                        "Treating unreadable destination '{}' as absent: {}",
                        path.display(),
                        e
                    );
                }
                None
            }
        }
    }

    /// Decide whether `source` has to be copied over `destination`
    pub async fn detect(&self, source: &Path, destination: &Path) -> Result<ChangeDecision> {
        let source_signature = self.source_signature(source).await?;
        let destination_signature = self.destination_signature(destination).await;
        Ok(Self::compare(
            &source_signature,
            destination_signature.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use proptest::prelude::*;
    use rstest::rstest;
    use std::time::Duration;
    use tempfile::TempDir;

    fn signature(secs: u64, size: u64) -> FileSignature {
        FileSignature {
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            size,
        }
    }

    #[rstest]
    #[case(signature(100, 10), None, ChangeDecision::Copy(CopyReason::Missing))]
    #[case(signature(100, 10), Some(signature(100, 10)), ChangeDecision::Unchanged)]
    #[case(signature(100, 10), Some(signature(200, 10)), ChangeDecision::Unchanged)]
    #[case(signature(200, 10), Some(signature(100, 10)), ChangeDecision::Copy(CopyReason::SourceNewer))]
    #[case(signature(100, 10), Some(signature(200, 11)), ChangeDecision::Copy(CopyReason::SizeChanged))]
    #[case(signature(0, 10), Some(signature(0, 10)), ChangeDecision::Unchanged)]
    #[case(signature(0, 10), Some(signature(0, 12)), ChangeDecision::Copy(CopyReason::SizeChanged))]
    fn test_compare(
        #[case] source: FileSignature,
        #[case] destination: Option<FileSignature>,
        #[case] expected: ChangeDecision,
    ) {
        assert_eq!(ChangeDetector::compare(&source, destination.as_ref()), expected);
    }

    proptest! {
        #[test]
        fn test_skip_iff_same_size_and_not_older(
            src_time in 0u64..1_000_000,
            dst_time in 0u64..1_000_000,
            src_size in 0u64..64,
            dst_size in 0u64..64,
        ) {
            let decision = ChangeDetector::compare(
                &signature(src_time, src_size),
                Some(&signature(dst_time, dst_size)),
            );
            let expected_skip = dst_time >= src_time && dst_size == src_size;
            prop_assert_eq!(!decision.needs_copy(), expected_skip);
        }
    }

    #[tokio::test]
    async fn test_detect_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let destination = temp_dir.path().join("destination.txt");
        std::fs::write(&source, b"hello").unwrap();

        let detector = ChangeDetector::new();
        assert_eq!(
            detector.detect(&source, &destination).await.unwrap(),
            ChangeDecision::Copy(CopyReason::Missing)
        );

        std::fs::write(&destination, b"hello").unwrap();
        set_file_mtime(&source, FileTime::from_unix_time(1_000, 0)).unwrap();
        set_file_mtime(&destination, FileTime::from_unix_time(2_000, 0)).unwrap();
        assert_eq!(
            detector.detect(&source, &destination).await.unwrap(),
            ChangeDecision::Unchanged
        );

        set_file_mtime(&source, FileTime::from_unix_time(3_000, 0)).unwrap();
        assert_eq!(
            detector.detect(&source, &destination).await.unwrap(),
            ChangeDecision::Copy(CopyReason::SourceNewer)
        );
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = ChangeDetector::new()
            .detect(&temp_dir.path().join("gone"), &temp_dir.path().join("dest"))
            .await;
        assert!(matches!(result, Err(Error::Metadata { .. })));
    }
}
