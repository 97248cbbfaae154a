//! Keyed directory of connection buckets

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use jetpool_core::{DynConnection, NativeConnection, Result, redact_connection_string};

use super::bucket::ConnectionBucket;
use super::config::PoolConfig;
use super::stats::PoolStats;

/// Process-wide registry for type-erased connections
static GLOBAL_REGISTRY: LazyLock<Arc<ConnectionPoolRegistry<DynConnection>>> =
    LazyLock::new(|| Arc::new(ConnectionPoolRegistry::new()));

/// Get the process-wide registry, creating it on first use
///
/// It lives until the process exits. Call
/// [`dispose_all`](ConnectionPoolRegistry::dispose_all) at shutdown to close
/// idle connections deterministically.
pub fn global() -> Arc<ConnectionPoolRegistry<DynConnection>> {
    Arc::clone(&GLOBAL_REGISTRY)
}

/// Maps connection strings to their [`ConnectionBucket`]
///
/// Keys are compared as exact strings. Two strings naming the same database
/// with different spacing or key order get separate buckets.
///
/// Buckets are created lazily and stay registered until
/// [`dispose_all`](Self::dispose_all). Once disposed, the registry stops
/// pooling: acquires report nothing idle and released connections are
/// closed.
pub struct ConnectionPoolRegistry<C: NativeConnection> {
    config: PoolConfig,
    buckets: DashMap<String, Arc<ConnectionBucket<C>>>,
    disposed: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    releases: AtomicU64,
    discarded: AtomicU64,
}

impl<C: NativeConnection> ConnectionPoolRegistry<C> {
    /// Create a registry with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(PoolConfig::default())
    }

    /// Create a registry with the given configuration
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: PoolConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
            disposed: AtomicBool::new(false),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            releases: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the bucket for a connection string, creating it if absent
    ///
    /// Concurrent first use of the same string yields a single bucket; the
    /// check and the insert happen under the same map shard lock.
    pub fn get_or_create_bucket(&self, connection_string: &str) -> Arc<ConnectionBucket<C>> {
        if let Some(bucket) = self.buckets.get(connection_string) {
            return Arc::clone(bucket.value());
        }

        let bucket = self
            .buckets
            .entry(connection_string.to_owned())
            .or_insert_with(|| {
                tracing::debug!(
                    connection_string = %redact_connection_string(connection_string),
                    "creating connection bucket"
                );
                Arc::new(ConnectionBucket::with_capacity(
                    connection_string,
                    self.config.initial_capacity(),
                ))
            });
        Arc::clone(bucket.value())
    }

    /// Get the bucket for a connection string without creating one
    pub fn try_get_bucket(&self, connection_string: &str) -> Option<Arc<ConnectionBucket<C>>> {
        self.buckets
            .get(connection_string)
            .map(|bucket| Arc::clone(bucket.value()))
    }

    /// Take an idle connection for the connection string, if one exists
    ///
    /// Never blocks. `None` means the caller should open a fresh connection.
    /// A string with no bucket yet reports `None` without creating one.
    pub fn try_acquire(&self, connection_string: &str) -> Option<C> {
        let connection = self
            .try_get_bucket(connection_string)
            .and_then(|bucket| bucket.try_get_connection());

        if connection.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                connection_string = %redact_connection_string(connection_string),
                "reusing idle connection"
            );
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                connection_string = %redact_connection_string(connection_string),
                "no idle connection"
            );
        }
        connection
    }

    /// Return a connection to the pool for reuse
    ///
    /// The connection must be open and must have been opened with
    /// `connection_string`; neither is checked. It is closed instead of
    /// stored when the registry has been disposed or the bucket is at its
    /// configured idle limit.
    pub fn release(&self, connection_string: &str, connection: C) {
        if self.is_disposed() {
            self.discard(connection_string, connection, "registry disposed");
            return;
        }

        let bucket = self.get_or_create_bucket(connection_string);
        let stored = match self.config.max_idle_per_bucket() {
            Some(limit) => bucket.add_connection_bounded(connection, limit),
            None => {
                bucket.add_connection(connection);
                Ok(())
            }
        };

        match stored {
            Ok(()) => {
                self.releases.fetch_add(1, Ordering::Relaxed);
                // Lost a race with dispose_all; nothing may stay idle after it.
                if self.is_disposed() {
                    self.buckets.remove(connection_string);
                    bucket.close_all();
                }
            }
            Err(connection) => self.discard(connection_string, connection, "idle limit reached"),
        }
    }

    fn discard(&self, connection_string: &str, mut connection: C, reason: &'static str) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            connection_string = %redact_connection_string(connection_string),
            reason,
            "closing released connection"
        );
        if let Err(e) = connection.close() {
            tracing::warn!(
                connection_string = %redact_connection_string(connection_string),
                error = %e,
                "failed to close released connection"
            );
        }
    }

    /// Close every idle connection and drop every bucket
    ///
    /// Marks the registry disposed first so later releases close their
    /// connection instead of pooling it. Close failures are logged and
    /// skipped. Safe to call any number of times.
    pub fn dispose_all(&self) {
        let first = !self.disposed.swap(true, Ordering::SeqCst);

        let keys: Vec<String> = self
            .buckets
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        let mut closed = 0;
        for key in keys {
            if let Some((_, bucket)) = self.buckets.remove(&key) {
                closed += bucket.close_all();
            }
        }

        if first {
            tracing::info!(closed, "connection pool disposed");
        } else if closed > 0 {
            tracing::debug!(closed, "closed connections left after dispose");
        }
    }

    /// Whether [`dispose_all`](Self::dispose_all) has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Number of registered buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Idle connections across all buckets
    pub fn idle_count(&self) -> usize {
        self.buckets
            .iter()
            .map(|entry| entry.value().idle_count())
            .sum()
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats::new(
            self.bucket_count(),
            self.idle_count(),
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.releases.load(Ordering::Relaxed),
            self.discarded.load(Ordering::Relaxed),
        )
    }
}

impl<C: NativeConnection> Default for ConnectionPoolRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NativeConnection> fmt::Debug for ConnectionPoolRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPoolRegistry")
            .field("config", &self.config)
            .field("buckets", &self.bucket_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
