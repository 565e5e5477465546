//! Global ceiling on simultaneously running sync operations

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use treesync_types::{Concurrency, Error, Result};

/// Counting semaphore shared by every task of one sync run
///
/// Cloning is cheap and all clones share the same slots, so deep and wide
/// trees are bounded by the same ceiling.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// A held slot; dropping it frees the slot
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Create a limiter with the given ceiling
    pub fn new(concurrency: Concurrency) -> Self {
        let limit = concurrency.get().min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Configured ceiling
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<Slot> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::task(format!("Concurrency limiter closed: {}", e)))?;
        Ok(Slot { _permit: permit })
    }
}
