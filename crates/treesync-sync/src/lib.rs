//! Concurrent delta-aware directory synchronization for treesync
//!
//! This crate mirrors a source directory tree into a destination directory:
//!
//! - **Tree walking**: one directory level per task, scheduled through a work queue
//! - **Concurrency limiting**: a single ceiling shared by every task of a run
//! - **Change detection**: files are skipped when size matches and the destination is not older
//! - **Retrying copies**: busy or locked files are retried with linear backoff
//! - **Symlink replication**: links are recreated with their literal target, best effort
//!
//! Entries only present at the destination are never removed.
//!
//! # Examples
//!
//! ```rust,no_run
//! use treesync_sync::{sync_directory, SyncOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = SyncOptions::default().with_exclude([".git", "node_modules"]);
//! let report = sync_directory("source_dir", "dest_dir", options).await?;
//! println!(
//!     "Copied {} files, {} bytes transferred",
//!     report.stats.files_copied, report.stats.bytes_copied
//! );
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod detector;
pub mod engine;
pub mod filter;
pub mod limiter;
pub mod report;
pub mod symlink;
pub mod walker;

pub use copy::{is_transient, CopyExecutor, CopyOutcome, FileCopier, TokioCopier};
pub use detector::{ChangeDecision, ChangeDetector, CopyReason, FileSignature};
pub use engine::{sync_directory, SyncOptions, SyncRequest, Synchronizer};
pub use filter::ExclusionFilter;
pub use limiter::{ConcurrencyLimiter, Slot};
pub use report::{SyncReport, TaskOutcome};
pub use symlink::{LinkOutcome, SymlinkReplicator};
pub use walker::{DirEntry, DirectoryListing, EntryKind, SyncTask, TreeWalker};
