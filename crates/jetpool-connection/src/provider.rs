//! Acquire/return glue for callers that open connections through a factory
//!
//! [`ConnectionProvider`] pairs a registry with a [`ConnectionFactory`]:
//! acquiring reuses an idle connection when one exists and opens a new one
//! otherwise, so pool exhaustion never reaches the caller as an error.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use jetpool_core::{ConnectionFactory, NativeConnection, Result, redact_connection_string};

use crate::pool::ConnectionPoolRegistry;

/// Hands out pooled connections, opening new ones on a miss
pub struct ConnectionProvider<F: ConnectionFactory> {
    registry: Arc<ConnectionPoolRegistry<F::Connection>>,
    factory: F,
}

impl<F: ConnectionFactory> ConnectionProvider<F> {
    /// Create a provider with its own registry
    pub fn new(factory: F) -> Self {
        Self::with_registry(Arc::new(ConnectionPoolRegistry::new()), factory)
    }

    /// Create a provider that shares an existing registry
    pub fn with_registry(registry: Arc<ConnectionPoolRegistry<F::Connection>>, factory: F) -> Self {
        Self { registry, factory }
    }

    /// Get the registry backing this provider
    pub fn registry(&self) -> &Arc<ConnectionPoolRegistry<F::Connection>> {
        &self.registry
    }

    /// Get the connection factory
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Get a connection for the connection string
    ///
    /// Reuses the most recently returned idle connection if there is one,
    /// otherwise opens a new connection through the factory. Only factory
    /// failures are returned as errors.
    #[tracing::instrument(
        skip(self, connection_string),
        fields(connection_string = %redact_connection_string(connection_string))
    )]
    pub async fn acquire(
        &self,
        connection_string: &str,
    ) -> Result<PooledConnection<F::Connection>> {
        if let Some(connection) = self.registry.try_acquire(connection_string) {
            return Ok(PooledConnection::new(
                connection,
                connection_string,
                Arc::clone(&self.registry),
                true,
            ));
        }

        tracing::debug!("no idle connection, opening a new one");
        let connection = self
            .factory
            .open(connection_string)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to open connection");
                e
            })?;

        Ok(PooledConnection::new(
            connection,
            connection_string,
            Arc::clone(&self.registry),
            false,
        ))
    }

    /// Close every idle connection in the backing registry
    pub fn dispose_all(&self) {
        self.registry.dispose_all();
    }
}

/// A connection borrowed from the pool
///
/// When dropped, the connection is returned to the registry under the
/// connection string it was acquired with.
pub struct PooledConnection<C: NativeConnection> {
    connection: Option<C>,
    connection_string: String,
    registry: Arc<ConnectionPoolRegistry<C>>,
    reused: bool,
}

impl<C: NativeConnection> PooledConnection<C> {
    fn new(
        connection: C,
        connection_string: &str,
        registry: Arc<ConnectionPoolRegistry<C>>,
        reused: bool,
    ) -> Self {
        Self {
            connection: Some(connection),
            connection_string: connection_string.to_string(),
            registry,
            reused,
        }
    }

    /// The connection string this connection was acquired under
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Whether the connection came from the pool rather than the factory
    pub fn was_reused(&self) -> bool {
        self.reused
    }

    /// Close the connection instead of returning it to the pool
    ///
    /// Use this when the connection is known to be broken. Close failures
    /// are logged and ignored.
    pub fn discard(mut self) {
        if let Some(mut connection) = self.connection.take()
            && let Err(e) = connection.close()
        {
            tracing::warn!(
                connection_string = %redact_connection_string(&self.connection_string),
                error = %e,
                "failed to close discarded connection"
            );
        }
    }

    /// Take the connection out of the pool's care
    ///
    /// The caller becomes responsible for closing it.
    pub fn detach(mut self) -> C {
        self.connection.take().expect("connection taken")
    }
}

impl<C: NativeConnection> Deref for PooledConnection<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        self.connection.as_ref().expect("connection taken")
    }
}

impl<C: NativeConnection> DerefMut for PooledConnection<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection.as_mut().expect("connection taken")
    }
}

impl<C: NativeConnection> Drop for PooledConnection<C> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.registry.release(&self.connection_string, connection);
        }
    }
}

#[cfg(test)]
mod tests;
