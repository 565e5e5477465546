//! Core type system and error handling for treesync
//!
//! This crate provides the foundational types shared by the treesync crates:
//!
//! - **Error handling**: the error taxonomy of a sync run, with kinds and severity
//! - **Core types**: per-run statistics
//! - **Configuration**: validated concurrency and retry settings
//!
//! # Features
//!
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use treesync_types::{Concurrency, Result, SyncStats};
//!
//! fn example_operation() -> Result<SyncStats> {
//!     let mut stats = SyncStats::new();
//!     stats.files_copied = 10;
//!     stats.bytes_copied = 1024 * 1024;
//!     Ok(stats)
//! }
//!
//! assert_eq!(Concurrency::default().get(), 50);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::{Concurrency, RetryPolicy};
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_sync_stats_creation() {
        let stats = SyncStats::new();
        assert_eq!(stats.files_copied, 0);
        assert_eq!(stats.bytes_copied, 0);
        assert_eq!(stats.transfer_rate(), 0.0);
    }

    #[test]
    fn test_sync_stats_merge() {
        let mut stats1 = SyncStats::new();
        stats1.files_copied = 5;
        stats1.bytes_copied = 1000;
        stats1.files_unchanged = 2;

        let mut stats2 = SyncStats::new();
        stats2.files_copied = 3;
        stats2.bytes_copied = 500;
        stats2.copy_retries = 1;

        stats1.merge(&stats2);
        assert_eq!(stats1.files_copied, 8);
        assert_eq!(stats1.bytes_copied, 1500);
        assert_eq!(stats1.files_visited(), 10);
        assert_eq!(stats1.copy_retries, 1);
    }

    #[test]
    fn test_transfer_rate() {
        let stats = SyncStats {
            bytes_copied: 2048,
            duration: Duration::from_secs(2),
            ..SyncStats::default()
        };
        assert_eq!(stats.transfer_rate(), 1024.0);
    }
}
