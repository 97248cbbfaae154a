//! Native connection and factory traits
//!
//! The pool never opens or talks to the database engine itself. It only
//! moves `NativeConnection` values between callers and idle storage, and
//! closes them on teardown. Opening is left to a `ConnectionFactory`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;

/// An open handle to the database engine
///
/// Opening one is expensive (engine attach, file lock, driver setup), which
/// is the reason these handles get pooled. A handle has exactly one owner at
/// a time: either the caller using it or the pool holding it idle.
///
/// Implementations are not required to be `Sync`; the native driver does not
/// support concurrent use of a single handle.
pub trait NativeConnection: Send + 'static {
    /// The exact connection string this handle was opened with
    fn connection_string(&self) -> &str;

    /// Release the native handle
    ///
    /// Called at most once by the pool. Errors are reported back to the pool,
    /// which logs and otherwise ignores them during teardown.
    fn close(&mut self) -> Result<()>;
}

/// Type-erased connection, for registries shared by several drivers
pub type DynConnection = Box<dyn NativeConnection>;

impl NativeConnection for Box<dyn NativeConnection> {
    fn connection_string(&self) -> &str {
        (**self).connection_string()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Factory for opening fresh native connections
///
/// Used whenever the pool reports that no idle connection exists for a
/// connection string.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// The connection type produced by this factory
    type Connection: NativeConnection;

    /// Open a new connection for the given connection string
    async fn open(&self, connection_string: &str) -> Result<Self::Connection>;
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    type Connection = T::Connection;

    async fn open(&self, connection_string: &str) -> Result<Self::Connection> {
        (**self).open(connection_string).await
    }
}
