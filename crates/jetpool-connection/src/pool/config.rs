//! Pool configuration types

use jetpool_core::{JetPoolError, Result};
use serde::{Deserialize, Serialize};

/// Default starting capacity of a bucket's idle storage
pub const DEFAULT_INITIAL_CAPACITY: usize = 4;

/// Configuration for a connection pool registry
///
/// The defaults keep the pool unbounded: every returned connection is kept
/// idle until the registry is disposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Starting capacity of each bucket's idle storage; doubles when full
    initial_capacity: usize,
    /// Maximum idle connections kept per connection string, if any
    max_idle_per_bucket: Option<usize>,
}

impl PoolConfig {
    /// Create a pool configuration with default values
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_idle_per_bucket: None,
        }
    }

    /// Set the starting capacity of each bucket
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Cap the number of idle connections kept per connection string
    ///
    /// Connections released into a full bucket are closed. The cap never
    /// causes an acquire to fail.
    pub fn with_max_idle_per_bucket(mut self, max_idle: usize) -> Self {
        self.max_idle_per_bucket = Some(max_idle);
        self
    }

    /// Get the starting bucket capacity
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Get the idle cap per bucket, if set
    pub fn max_idle_per_bucket(&self) -> Option<usize> {
        self.max_idle_per_bucket
    }

    /// Check the configuration for values the pool cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(JetPoolError::Configuration(
                "initial_capacity must be greater than 0".into(),
            ));
        }
        if self.max_idle_per_bucket == Some(0) {
            return Err(JetPoolError::Configuration(
                "max_idle_per_bucket must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    /// Defaults:
    /// - initial_capacity: 4
    /// - max_idle_per_bucket: None (unbounded)
    fn default() -> Self {
        Self::new()
    }
}
