//! Comic cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

pub(crate) const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
pub(crate) const DEFAULT_MEMO_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Age at which an entry is treated as absent.
    pub ttl: Duration,
    /// Maximum distinct keys kept by the bounded memo layer.
    pub memo_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            memo_capacity: DEFAULT_MEMO_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            memo_capacity: settings.memo_capacity.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the memo capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memo_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memo_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
