//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Snapshot of a registry's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of buckets (distinct connection strings)
    buckets: usize,
    /// Idle connections across all buckets
    idle: usize,
    /// Acquires served from an idle connection
    hits: u64,
    /// Acquires that found nothing idle
    misses: u64,
    /// Connections stored back as idle
    releases: u64,
    /// Connections closed on release instead of being stored
    discarded: u64,
}

impl PoolStats {
    /// Create new pool statistics
    pub fn new(
        buckets: usize,
        idle: usize,
        hits: u64,
        misses: u64,
        releases: u64,
        discarded: u64,
    ) -> Self {
        Self {
            buckets,
            idle,
            hits,
            misses,
            releases,
            discarded,
        }
    }

    /// Get the number of buckets
    pub fn buckets(&self) -> usize {
        self.buckets
    }

    /// Get the number of idle connections
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Get the number of acquires served from the pool
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Get the number of acquires that found nothing idle
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Get the number of connections stored back as idle
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Get the number of released connections that were closed instead
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Fraction of acquires served from the pool (0.0 to 1.0)
    ///
    /// Returns 0.0 when nothing has been acquired yet.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }
}
