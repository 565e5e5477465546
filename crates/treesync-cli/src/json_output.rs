//! JSON output structures for the treesync CLI

use serde::{Deserialize, Serialize};
use std::path::Path;
use treesync_sync::SyncReport;
use treesync_types::Error;

/// Complete JSON output for a sync run
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Counters, absent when the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SyncStatsJson>,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// treesync version
    pub version: String,
    /// Request ID, when the run got far enough to have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
}

/// Sync counters in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncStatsJson {
    /// Files copied
    pub files_copied: u64,
    /// Files already up to date
    pub files_unchanged: u64,
    /// Bytes copied
    pub bytes_copied: u64,
    /// Directories ensured at the destination
    pub directories_synced: u64,
    /// Symlinks recreated
    pub symlinks_relinked: u64,
    /// Symlinks that could not be recreated
    pub symlinks_failed: u64,
    /// Entries dropped by exclusion patterns
    pub entries_excluded: u64,
    /// Special files skipped
    pub special_skipped: u64,
    /// Extra copy attempts
    pub copy_retries: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Transfer rate in MB/s
    pub transfer_rate_mbps: f64,
}

/// Overall operation result
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether the run succeeded
    pub success: bool,
    /// Error category, when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Error message, when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncResultJson {
    /// Build the output for a finished run
    pub fn from_outcome(
        source: &Path,
        destination: &Path,
        outcome: &Result<SyncReport, Error>,
    ) -> Self {
        let metadata = |request_id: Option<String>| OperationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            request_id,
            source_path: source.display().to_string(),
            destination_path: destination.display().to_string(),
        };

        match outcome {
            Ok(report) => Self {
                metadata: metadata(Some(report.request_id.to_string())),
                stats: Some(SyncStatsJson::from(report)),
                result: OperationResult {
                    success: true,
                    error_kind: None,
                    error_message: None,
                },
            },
            Err(error) => Self {
                metadata: metadata(None),
                stats: None,
                result: OperationResult {
                    success: false,
                    error_kind: Some(format!("{:?}", error.kind())),
                    error_message: Some(error.to_string()),
                },
            },
        }
    }
}

impl From<&SyncReport> for SyncStatsJson {
    fn from(report: &SyncReport) -> Self {
        let stats = &report.stats;
        Self {
            files_copied: stats.files_copied,
            files_unchanged: stats.files_unchanged,
            bytes_copied: stats.bytes_copied,
            directories_synced: stats.directories_synced,
            symlinks_relinked: stats.symlinks_relinked,
            symlinks_failed: stats.symlinks_failed,
            entries_excluded: stats.entries_excluded,
            special_skipped: stats.special_skipped,
            copy_retries: stats.copy_retries,
            duration_ms: u64::try_from(stats.duration.as_millis()).unwrap_or(u64::MAX),
            transfer_rate_mbps: stats.transfer_rate() / 1024.0 / 1024.0,
        }
    }
}
