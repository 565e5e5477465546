//! Instrumented copiers for treesync tests
//!
//! Both copiers delegate the real work to `tokio::fs::copy` and record what
//! the engine asked of them.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use treesync_sync::FileCopier;

/// Tracks how many copies run at the same time
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicUsize,
}

impl ConcurrencyProbe {
    /// Mark one operation as started
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    /// Mark one operation as finished
    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    /// Highest number of simultaneous operations seen
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Operations currently running
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Operations finished so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Copier that holds every copy open for a while and records the overlap
#[derive(Debug)]
pub struct ProbeCopier {
    probe: ConcurrencyProbe,
    hold: Duration,
}

impl ProbeCopier {
    /// Create a copier that keeps each copy in flight for `hold`
    pub fn new(hold: Duration) -> Self {
        Self {
            probe: ConcurrencyProbe::default(),
            hold,
        }
    }

    /// Overlap statistics
    pub fn probe(&self) -> &ConcurrencyProbe {
        &self.probe
    }
}

#[async_trait]
impl FileCopier for ProbeCopier {
    async fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        self.probe.enter();
        tokio::time::sleep(self.hold).await;
        let result = tokio::fs::copy(source, destination).await;
        self.probe.exit();
        result
    }
}

/// Copier that fails for files whose name contains a marker
///
/// The first `failures` attempts on a marked file return `kind`; later
/// attempts copy normally. Unmarked files always copy.
#[derive(Debug)]
pub struct FlakyCopier {
    marker: String,
    kind: io::ErrorKind,
    failures: usize,
    attempts: Mutex<Vec<PathBuf>>,
}

impl FlakyCopier {
    /// Create a copier failing `failures` times with `kind` on marked files
    pub fn new<S: Into<String>>(marker: S, kind: io::ErrorKind, failures: usize) -> Self {
        Self {
            marker: marker.into(),
            kind,
            failures,
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Number of attempts made on paths containing the marker
    pub fn marked_attempts(&self) -> usize {
        self.attempts
            .lock()
            .map(|attempts| attempts.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FileCopier for FlakyCopier {
    async fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<u64> {
        let marked = source
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains(&self.marker));

        if marked {
            let attempt = {
                let mut attempts = self
                    .attempts
                    .lock()
                    .map_err(|_| io::Error::other("attempt log poisoned"))?;
                attempts.push(source.to_path_buf());
                attempts.len()
            };
            if attempt <= self.failures {
                return Err(io::Error::from(self.kind));
            }
        }

        tokio::fs::copy(source, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_tracks_peak() {
        let probe = ConcurrencyProbe::default();
        probe.enter();
        probe.enter();
        probe.exit();
        probe.enter();

        assert_eq!(probe.peak(), 2);
        assert_eq!(probe.current(), 2);
        assert_eq!(probe.completed(), 1);
    }

    #[tokio::test]
    async fn test_flaky_copier_recovers() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let source = temp_dir.path().join("locked.txt");
        let destination = temp_dir.path().join("copy.txt");
        std::fs::write(&source, b"data").unwrap();

        let copier = FlakyCopier::new("locked", io::ErrorKind::ResourceBusy, 1);
        assert!(copier.copy_file(&source, &destination).await.is_err());
        assert_eq!(copier.copy_file(&source, &destination).await.unwrap(), 4);
        assert_eq!(copier.marked_attempts(), 2);
    }
}
