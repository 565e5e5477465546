//! Task outcomes and the per-run report built from them

use crate::copy::CopyOutcome;
use crate::symlink::LinkOutcome;
use crate::walker::SyncTask;
use serde::{Deserialize, Serialize};
use treesync_types::{OperationId, SyncStats};

/// What a single task did
///
/// Tasks never touch shared counters; the orchestrator folds these outcomes
/// into the [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Destination directory ensured and source directory listed
    Directory {
        /// Tasks for the directory's non-excluded entries
        children: Vec<SyncTask>,
        /// Entries dropped by the exclusion filter
        excluded: u64,
    },
    /// File copied
    Copied(CopyOutcome),
    /// File already up to date
    Unchanged,
    /// Symlink processed
    Symlink(LinkOutcome),
    /// Socket, FIFO or device node left alone
    SkippedSpecial,
}

/// Summary of a successful sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Request the report belongs to
    pub request_id: OperationId,
    /// Aggregated counters
    pub stats: SyncStats,
}

impl SyncReport {
    /// Create an empty report
    pub fn new(request_id: OperationId) -> Self {
        Self {
            request_id,
            stats: SyncStats::new(),
        }
    }

    /// Fold one task outcome into the counters
    pub fn record(&mut self, outcome: &TaskOutcome) {
        let stats = &mut self.stats;
        match outcome {
            TaskOutcome::Directory { excluded, .. } => {
                stats.directories_synced += 1;
                stats.entries_excluded += excluded;
            }
            TaskOutcome::Copied(copy) => {
                stats.files_copied += 1;
                stats.bytes_copied += copy.bytes;
                stats.copy_retries += u64::from(copy.retries());
            }
            TaskOutcome::Unchanged => stats.files_unchanged += 1,
            TaskOutcome::Symlink(link) => {
                if link.is_relinked() {
                    stats.symlinks_relinked += 1;
                } else {
                    stats.symlinks_failed += 1;
                }
            }
            TaskOutcome::SkippedSpecial => stats.special_skipped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_record_outcomes() {
        let mut report = SyncReport::new(uuid::Uuid::new_v4());
        let outcomes = [
            TaskOutcome::Directory {
                children: Vec::new(),
                excluded: 2,
            },
            TaskOutcome::Copied(CopyOutcome {
                bytes: 100,
                attempts: 1,
            }),
            TaskOutcome::Copied(CopyOutcome {
                bytes: 50,
                attempts: 3,
            }),
            TaskOutcome::Unchanged,
            TaskOutcome::Symlink(LinkOutcome::Relinked {
                target: PathBuf::from("a.txt"),
            }),
            TaskOutcome::Symlink(LinkOutcome::Failed {
                reason: "busy".to_string(),
            }),
            TaskOutcome::SkippedSpecial,
        ];
        for outcome in &outcomes {
            report.record(outcome);
        }

        let stats = &report.stats;
        assert_eq!(stats.directories_synced, 1);
        assert_eq!(stats.entries_excluded, 2);
        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.bytes_copied, 150);
        assert_eq!(stats.copy_retries, 2);
        assert_eq!(stats.files_unchanged, 1);
        assert_eq!(stats.files_visited(), 3);
        assert_eq!(stats.symlinks_relinked, 1);
        assert_eq!(stats.symlinks_failed, 1);
        assert_eq!(stats.special_skipped, 1);
    }
}
