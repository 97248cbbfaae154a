//! Idle connection storage for a single connection string

use std::fmt;

use jetpool_core::{JetPoolError, NativeConnection, Result, redact_connection_string};
use parking_lot::Mutex;

use super::config::DEFAULT_INITIAL_CAPACITY;

/// Thread-safe LIFO store of idle connections sharing one connection string
///
/// Every operation takes the bucket's lock for its whole critical section,
/// so the idle count and the stored connections can never disagree. The
/// most recently returned connection is handed out first.
///
/// Storage starts at a small fixed capacity and doubles whenever it is full.
/// There is no upper bound unless the caller uses
/// [`add_connection_bounded`](Self::add_connection_bounded).
///
/// Returning a connection that belongs to a different connection string, or
/// one that was already closed, is a caller error the bucket does not detect.
pub struct ConnectionBucket<C: NativeConnection> {
    connection_string: String,
    idle: Mutex<Vec<C>>,
}

impl<C: NativeConnection> ConnectionBucket<C> {
    /// Create an empty bucket with the default starting capacity
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self::with_capacity(connection_string, DEFAULT_INITIAL_CAPACITY)
    }

    /// Create an empty bucket with the given starting capacity
    pub fn with_capacity(connection_string: impl Into<String>, capacity: usize) -> Self {
        Self {
            connection_string: connection_string.into(),
            idle: Mutex::new(Vec::with_capacity(capacity.max(1))),
        }
    }

    /// The connection string shared by every connection in this bucket
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Store a connection as idle
    pub fn add_connection(&self, connection: C) {
        let mut idle = self.idle.lock();
        Self::push(&mut idle, connection);
    }

    /// Store a connection unless `limit` connections are already idle
    ///
    /// The connection is handed back when the bucket is full, leaving the
    /// caller to close it.
    pub fn add_connection_bounded(
        &self,
        connection: C,
        limit: usize,
    ) -> std::result::Result<(), C> {
        let mut idle = self.idle.lock();
        if idle.len() >= limit {
            return Err(connection);
        }
        Self::push(&mut idle, connection);
        Ok(())
    }

    fn push(idle: &mut Vec<C>, connection: C) {
        if idle.len() == idle.capacity() {
            let additional = idle.capacity().max(1);
            idle.reserve_exact(additional);
        }
        idle.push(connection);
    }

    /// Take the most recently added idle connection
    ///
    /// Fails with [`JetPoolError::EmptyPool`] when nothing is idle; the
    /// caller is expected to open a fresh connection rather than wait.
    pub fn get_connection(&self) -> Result<C> {
        self.try_get_connection().ok_or(JetPoolError::EmptyPool)
    }

    /// Take the most recently added idle connection, if any
    pub fn try_get_connection(&self) -> Option<C> {
        self.idle.lock().pop()
    }

    /// Number of idle connections currently held
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Whether no idle connection is held
    pub fn is_empty(&self) -> bool {
        self.idle.lock().is_empty()
    }

    /// Current capacity of the idle storage
    pub fn capacity(&self) -> usize {
        self.idle.lock().capacity()
    }

    /// Close every idle connection
    ///
    /// Connections are removed under the lock and closed after it is
    /// released. Each close is attempted independently and failures are only
    /// logged. Returns the number of connections closed without error.
    /// Calling this on an empty bucket does nothing.
    pub fn close_all(&self) -> usize {
        let connections: Vec<C> = {
            let mut idle = self.idle.lock();
            idle.drain(..).collect()
        };

        if connections.is_empty() {
            return 0;
        }

        let total = connections.len();
        let mut closed = 0;
        for mut connection in connections {
            match connection.close() {
                Ok(()) => closed += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_string = %redact_connection_string(&self.connection_string),
                        error = %e,
                        "failed to close idle connection"
                    );
                }
            }
        }

        tracing::debug!(
            connection_string = %redact_connection_string(&self.connection_string),
            total,
            closed,
            "closed idle connections"
        );
        closed
    }
}

impl<C: NativeConnection> Drop for ConnectionBucket<C> {
    fn drop(&mut self) {
        if !self.idle.get_mut().is_empty() {
            self.close_all();
        }
    }
}

impl<C: NativeConnection> fmt::Debug for ConnectionBucket<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionBucket")
            .field(
                "connection_string",
                &redact_connection_string(&self.connection_string),
            )
            .field("idle", &self.idle_count())
            .finish()
    }
}
