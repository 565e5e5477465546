//! File copy with retry on transient locking errors

use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};
use treesync_types::{Error, Result, RetryPolicy};

/// Copies the bytes of one file, overwriting the destination
#[async_trait::async_trait]
pub trait FileCopier: Debug + Send + Sync {
    /// Copy `source` to `destination`, returning the number of bytes written
    async fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64>;
}

/// Copier backed by `tokio::fs::copy`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCopier;

#[async_trait::async_trait]
impl FileCopier for TokioCopier {
    async fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        fs::copy(source, destination).await
    }
}

/// Whether a copy error is expected to clear up on its own
///
/// Busy and access-denied errors are what another process holding the file
/// open produces, most commonly on Windows.
pub fn is_transient(error: &io::Error) -> bool {
    if matches!(
        error.kind(),
        io::ErrorKind::ResourceBusy | io::ErrorKind::PermissionDenied
    ) {
        return true;
    }

    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(error.raw_os_error(), Some(32 | 33))
}

/// Successful copy of one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Bytes written
    pub bytes: u64,
    /// Attempts made, the successful one included
    pub attempts: u32,
}

impl CopyOutcome {
    /// Attempts beyond the first
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

/// Runs a [`FileCopier`] under a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct CopyExecutor {
    copier: Arc<dyn FileCopier>,
    policy: RetryPolicy,
}

impl CopyExecutor {
    /// Create an executor
    pub fn new(copier: Arc<dyn FileCopier>, policy: RetryPolicy) -> Self {
        Self { copier, policy }
    }

    /// Retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Copy a file, retrying transient failures with linear backoff
    ///
    /// Non-transient errors fail immediately; transient ones fail once the
    /// policy's attempts are used up.
    pub async fn copy_with_retry(&self, source: &Path, destination: &Path) -> Result<CopyOutcome> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.copier.copy_file(source, destination).await {
                Ok(bytes) => {
                    debug!(
                        "Copied: {} -> {} ({} bytes, attempt {})",
                        source.display(),
                        destination.display(),
                        bytes,
                        attempt
                    );
                    return Ok(CopyOutcome {
                        bytes,
                        attempts: attempt,
                    });
                }
                Err(error) => {
                    let transient = is_transient(&error);
                    if transient && self.policy.allows_retry_after(attempt) {
                        let delay = self.policy.delay_for_attempt(attempt);
                        warn!(
                            "Copy of '{}' failed on attempt {} ({}), retrying in {:?}",
                            source.display(),
                            attempt,
                            error,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(Error::Copy {
                        source_path: source.to_path_buf(),
                        destination: destination.to_path_buf(),
                        attempts: attempt,
                        transient,
                        message: error.to_string(),
                    });
                }
            }
        }
    }
}

impl Default for CopyExecutor {
    fn default() -> Self {
        Self::new(Arc::new(TokioCopier), RetryPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::Instant;

    /// Fails with the scripted errors, then succeeds
    #[derive(Debug)]
    struct ScriptedCopier {
        failures: Mutex<Vec<io::ErrorKind>>,
        attempts: Mutex<Vec<Instant>>,
    }

    impl ScriptedCopier {
        fn new(failures: Vec<io::ErrorKind>) -> Self {
            Self {
                failures: Mutex::new(failures),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempt_times(&self) -> Vec<Instant> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl FileCopier for ScriptedCopier {
        async fn copy_file(&self, _source: &Path, _destination: &Path) -> io::Result<u64> {
            self.attempts.lock().unwrap().push(Instant::now());
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() {
                Ok(42)
            } else {
                Err(io::Error::from(failures.remove(0)))
            }
        }
    }

    fn executor(copier: &Arc<ScriptedCopier>) -> CopyExecutor {
        CopyExecutor::new(copier.clone(), RetryPolicy::default())
    }

    #[rstest]
    #[case(io::ErrorKind::ResourceBusy, true)]
    #[case(io::ErrorKind::PermissionDenied, true)]
    #[case(io::ErrorKind::NotFound, false)]
    #[case(io::ErrorKind::StorageFull, false)]
    fn test_is_transient(#[case] kind: io::ErrorKind, #[case] expected: bool) {
        assert_eq!(is_transient(&io::Error::from(kind)), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_succeed() {
        let copier = Arc::new(ScriptedCopier::new(vec![
            io::ErrorKind::ResourceBusy,
            io::ErrorKind::ResourceBusy,
        ]));

        let outcome = executor(&copier)
            .copy_with_retry(Path::new("a"), Path::new("b"))
            .await
            .unwrap();

        assert_eq!(outcome, CopyOutcome { bytes: 42, attempts: 3 });
        assert_eq!(outcome.retries(), 2);

        let times = copier.attempt_times();
        assert_eq!(times.len(), 3);
        let first_wait = times[1] - times[0];
        let second_wait = times[2] - times[1];
        assert!(first_wait >= Duration::from_millis(100) && first_wait < Duration::from_millis(150));
        assert!(second_wait >= Duration::from_millis(200) && second_wait < Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion() {
        let copier = Arc::new(ScriptedCopier::new(vec![io::ErrorKind::ResourceBusy; 5]));

        let error = executor(&copier)
            .copy_with_retry(Path::new("a"), Path::new("b"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Copy {
                attempts: 3,
                transient: true,
                ..
            }
        ));
        assert_eq!(copier.attempt_times().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let copier = Arc::new(ScriptedCopier::new(vec![io::ErrorKind::NotFound]));

        let error = executor(&copier)
            .copy_with_retry(Path::new("a"), Path::new("b"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Copy {
                attempts: 1,
                transient: false,
                ..
            }
        ));
        assert_eq!(copier.attempt_times().len(), 1);
    }

    #[tokio::test]
    async fn test_tokio_copier_overwrites_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let destination = temp_dir.path().join("destination.txt");
        std::fs::write(&source, b"new contents").unwrap();
        std::fs::write(&destination, b"old").unwrap();

        let outcome = CopyExecutor::default()
            .copy_with_retry(&source, &destination)
            .await
            .unwrap();

        assert_eq!(outcome.bytes, 12);
        assert_eq!(std::fs::read(&destination).unwrap(), b"new contents");
    }
}
