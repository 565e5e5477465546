//! Main synchronization engine

use crate::{
    copy::{CopyExecutor, FileCopier, TokioCopier},
    detector::{ChangeDecision, ChangeDetector},
    filter::ExclusionFilter,
    limiter::ConcurrencyLimiter,
    report::{SyncReport, TaskOutcome},
    symlink::SymlinkReplicator,
    walker::{EntryKind, SyncTask, TreeWalker},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use treesync_config::Config;
use treesync_types::{Concurrency, Error, Result, RetryPolicy};

/// Synchronization request
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Source directory path
    pub source: PathBuf,
    /// Destination directory path
    pub destination: PathBuf,
    /// Sync options
    pub options: SyncOptions,
    /// Request ID for tracking
    pub request_id: uuid::Uuid,
}

impl SyncRequest {
    /// Create a new sync request
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            options: SyncOptions::default(),
            request_id: uuid::Uuid::new_v4(),
        }
    }

    /// Set sync options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }
}

/// Synchronization options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Substrings excluding entries by name or root-relative path
    pub exclude: Vec<String>,
    /// Maximum number of simultaneously running operations
    pub concurrency: Concurrency,
    /// Retry policy for transient copy failures
    pub retry: RetryPolicy,
}

impl SyncOptions {
    /// Build options from a loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            exclude: config.sync.exclude.clone(),
            concurrency: config.sync.concurrency,
            retry: config.retry.policy(),
        }
    }

    /// Set exclusion patterns
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the concurrency ceiling
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check the options before a run
    pub fn validate(&self) -> Result<()> {
        if self.exclude.iter().any(String::is_empty) {
            return Err(Error::config("Exclusion patterns must not be empty"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config("Retry policy needs at least one attempt"));
        }
        Ok(())
    }
}

/// Components shared by every task of one run
#[derive(Debug)]
struct SyncContext {
    walker: TreeWalker,
    limiter: ConcurrencyLimiter,
    detector: ChangeDetector,
    executor: CopyExecutor,
    replicator: SymlinkReplicator,
}

/// Main synchronization engine
///
/// A `Synchronizer` holds no per-run state and can run any number of
/// requests, one after another or concurrently.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    copier: Arc<dyn FileCopier>,
}

impl Synchronizer {
    /// Create a synchronizer copying through `tokio::fs`
    pub fn new() -> Self {
        Self::with_copier(Arc::new(TokioCopier))
    }

    /// Create a synchronizer with a custom byte copier
    pub fn with_copier(copier: Arc<dyn FileCopier>) -> Self {
        Self { copier }
    }

    /// Perform synchronization
    ///
    /// Returns once every non-excluded entry has been visited. The first
    /// fatal error aborts all outstanding tasks and is returned as-is.
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncReport> {
        let start_time = Instant::now();
        let SyncRequest {
            source,
            destination,
            options,
            request_id,
        } = request;

        info!(
            "Starting sync {}: {} -> {}",
            request_id,
            source.display(),
            destination.display()
        );

        options.validate()?;
        Self::validate_paths(&source).await?;

        let filter = ExclusionFilter::new(options.exclude);
        if !filter.is_empty() {
            debug!("Sync {} excluding {:?}", request_id, filter.patterns());
        }

        let context = Arc::new(SyncContext {
            walker: TreeWalker::new(&source, filter),
            limiter: ConcurrencyLimiter::new(options.concurrency),
            detector: ChangeDetector::new(),
            executor: CopyExecutor::new(Arc::clone(&self.copier), options.retry),
            replicator: SymlinkReplicator::new(),
        });
        debug!(
            "Sync {} walking {} with concurrency {} and {} attempt(s) per file",
            request_id,
            context.walker.root().display(),
            context.limiter.limit(),
            context.executor.policy().max_attempts
        );

        let mut report = SyncReport::new(request_id);
        let mut tasks = JoinSet::new();
        tasks.spawn(Self::run_task(
            Arc::clone(&context),
            SyncTask::root(&source, &destination),
        ));

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(error)) => {
                    tasks.abort_all();
                    warn!("Sync {} failed: {}", request_id, error);
                    return Err(error);
                }
                Err(join_error) => {
                    tasks.abort_all();
                    return Err(Error::task(format!("Sync task failed: {}", join_error)));
                }
            };

            report.record(&outcome);
            if let TaskOutcome::Directory { children, .. } = outcome {
                for child in children {
                    tasks.spawn(Self::run_task(Arc::clone(&context), child));
                }
            }
        }

        report.stats.duration = start_time.elapsed();
        info!(
            "Sync {} completed: {} copied, {} unchanged, {} bytes in {:?}",
            request_id,
            report.stats.files_copied,
            report.stats.files_unchanged,
            report.stats.bytes_copied,
            report.stats.duration
        );

        Ok(report)
    }

    /// Validate the source root
    async fn validate_paths(source: &Path) -> Result<()> {
        let metadata = fs::metadata(source)
            .await
            .map_err(|e| Error::invalid_source(source, format!("cannot access: {}", e)))?;

        if !metadata.is_dir() {
            return Err(Error::invalid_source(source, "not a directory"));
        }

        Ok(())
    }

    /// Run one task while holding a limiter slot
    ///
    /// Directory tasks return their children instead of running them, so the
    /// slot is free again before the subtree is scheduled.
    async fn run_task(context: Arc<SyncContext>, task: SyncTask) -> Result<TaskOutcome> {
        let _slot = context.limiter.acquire().await?;

        match task.kind {
            EntryKind::Directory => {
                let listing = context
                    .walker
                    .walk(&task.source, &task.destination)
                    .await?;
                Ok(TaskOutcome::Directory {
                    children: listing.tasks,
                    excluded: listing.excluded,
                })
            }
            EntryKind::File => {
                match context
                    .detector
                    .detect(&task.source, &task.destination)
                    .await?
                {
                    ChangeDecision::Unchanged => {
                        debug!("Unchanged: {}", task.relative_path.display());
                        Ok(TaskOutcome::Unchanged)
                    }
                    ChangeDecision::Copy(reason) => {
                        debug!("Copying {} ({:?})", task.relative_path.display(), reason);
                        let outcome = context
                            .executor
                            .copy_with_retry(&task.source, &task.destination)
                            .await?;
                        Ok(TaskOutcome::Copied(outcome))
                    }
                }
            }
            EntryKind::Symlink => {
                let outcome = context
                    .replicator
                    .replicate(&task.source, &task.destination)
                    .await?;
                Ok(TaskOutcome::Symlink(outcome))
            }
            EntryKind::Other => {
                warn!(
                    "Skipping special file '{}'",
                    task.relative_path.display()
                );
                Ok(TaskOutcome::SkippedSpecial)
            }
        }
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror `source` into `destination` with the default copier
pub async fn sync_directory<P, Q>(
    source: P,
    destination: Q,
    options: SyncOptions,
) -> Result<SyncReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let request = SyncRequest::new(source, destination).with_options(options);
    Synchronizer::new().sync(request).await
}
