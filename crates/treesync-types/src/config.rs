//! Configuration types for treesync
//!
//! Validated value types shared by the configuration layer and the sync
//! engine.

// Serde is imported conditionally through cfg_attr
use std::time::Duration;

/// Maximum number of simultaneously running sync operations
///
/// Always at least [`Concurrency::MIN`]; deserialization goes through
/// [`Concurrency::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "usize", into = "usize"))]
pub struct Concurrency(usize);

impl Concurrency {
    /// Minimum concurrency
    pub const MIN: usize = 1;
    /// Default concurrency
    pub const DEFAULT: usize = 50;

    /// Create a new concurrency limit with validation
    pub fn new(limit: usize) -> Result<Self, String> {
        if limit < Self::MIN {
            Err(format!(
                "Concurrency {} is below minimum {}",
                limit,
                Self::MIN
            ))
        } else {
            Ok(Self(limit))
        }
    }

    /// Get the concurrency value
    pub fn get(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = String;

    fn try_from(limit: usize) -> Result<Self, Self::Error> {
        Self::new(limit)
    }
}

impl From<Concurrency> for usize {
    fn from(concurrency: Concurrency) -> Self {
        concurrency.0
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Retry policy for file copies that fail transiently
///
/// Backoff is linear: the wait after the n-th failed attempt is
/// `base_delay * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay unit for the linear backoff
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    /// Default delay unit
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

    /// Create a new retry policy
    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, String> {
        if max_attempts == 0 {
            return Err("Retry policy needs at least one attempt".to_string());
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    /// A policy that never retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Whether another attempt is allowed after `attempt` attempts have failed
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Self::DEFAULT_BASE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrency_validation() {
        assert!(Concurrency::new(0).is_err());
        assert_eq!(Concurrency::new(1).unwrap().get(), 1);
        assert_eq!(Concurrency::default().get(), 50);
    }

    #[test]
    fn test_concurrency_conversions() {
        assert!(Concurrency::try_from(0).is_err());
        assert_eq!(usize::from(Concurrency::try_from(8).unwrap()), 8);
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
    }

    #[test]
    fn test_retry_allowance() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry_after(1));
        assert!(policy.allows_retry_after(2));
        assert!(!policy.allows_retry_after(3));

        assert!(!RetryPolicy::no_retry().allows_retry_after(1));
        assert!(RetryPolicy::new(0, Duration::ZERO).is_err());
    }
}
