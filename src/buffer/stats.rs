//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by the buffer pool.
///
/// All fields are atomic so threads can bump them without taking the pool
/// latch. `Ordering::Relaxed` is enough: the counters are independent and
/// only need atomicity, not cross-counter ordering.
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Fetches satisfied without disk I/O.
    pub hits: AtomicU64,
    /// Fetches that had to read the page from disk.
    pub misses: AtomicU64,
    /// Pages pushed out of their frame to make room.
    pub evictions: AtomicU64,
    /// Dirty pages written back to disk (eviction or flush).
    pub writebacks: AtomicU64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a non-atomic copy for display or assertions.
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            writebacks: self.writebacks.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub writebacks: u64,
}

impl PoolStatsSnapshot {
    /// Cache hit rate in [0.0, 1.0].
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for PoolStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits: {}, misses: {}, evictions: {}, hit_rate: {:.2}%",
            self.hits,
            self.misses,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = PoolStats::new();
        stats.hits.fetch_add(7, Ordering::Relaxed);
        stats.misses.fetch_add(3, Ordering::Relaxed);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 7);
        assert_eq!(snapshot.hit_rate(), 0.7);
    }

    #[test]
    fn test_empty_hit_rate_is_zero() {
        assert_eq!(PoolStats::new().snapshot().hit_rate(), 0.0);
    }
}
