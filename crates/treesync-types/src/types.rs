//! Core data types for treesync

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for sync runs
pub type OperationId = uuid::Uuid;

/// Transfer rate in bytes per second
pub type TransferRate = f64;

/// Counters collected over one sync run
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Regular files copied to the destination
    pub files_copied: u64,
    /// Regular files skipped because the destination was up to date
    pub files_unchanged: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Directories ensured at the destination, the root included
    pub directories_synced: u64,
    /// Symlinks recreated at the destination
    pub symlinks_relinked: u64,
    /// Symlinks that could not be recreated
    pub symlinks_failed: u64,
    /// Entries skipped by an exclusion pattern
    pub entries_excluded: u64,
    /// Sockets, FIFOs and device nodes that were skipped
    pub special_skipped: u64,
    /// Extra copy attempts caused by transient errors
    pub copy_retries: u64,
    /// Total duration of the run
    pub duration: Duration,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the overall transfer rate
    pub fn transfer_rate(&self) -> TransferRate {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Number of regular files visited, copied or not
    pub fn files_visited(&self) -> u64 {
        self.files_copied + self.files_unchanged
    }

    /// Merge statistics from another instance
    pub fn merge(&mut self, other: &SyncStats) {
        self.files_copied += other.files_copied;
        self.files_unchanged += other.files_unchanged;
        self.bytes_copied += other.bytes_copied;
        self.directories_synced += other.directories_synced;
        self.symlinks_relinked += other.symlinks_relinked;
        self.symlinks_failed += other.symlinks_failed;
        self.entries_excluded += other.entries_excluded;
        self.special_skipped += other.special_skipped;
        self.copy_retries += other.copy_retries;
        self.duration += other.duration;
    }
}
