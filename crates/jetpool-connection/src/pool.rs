//! Connection pooling for native Jet/ACE connections
//!
//! The native driver does not pool on its own, and every open attaches the
//! engine and locks the database file. This module keeps returned
//! connections idle, keyed by their exact connection string, so later
//! callers can reuse them.
//!
//! # Example
//!
//! ```ignore
//! use jetpool_connection::pool::ConnectionPoolRegistry;
//!
//! let registry = ConnectionPoolRegistry::new();
//! let conn = match registry.try_acquire(connection_string) {
//!     Some(conn) => conn,
//!     None => factory.open(connection_string).await?,
//! };
//! // Use connection...
//! registry.release(connection_string, conn);
//!
//! // At shutdown
//! registry.dispose_all();
//! ```

mod bucket;
mod config;
mod registry;
mod stats;


pub use bucket::ConnectionBucket;
pub use config::{DEFAULT_INITIAL_CAPACITY, PoolConfig};
pub use registry::{ConnectionPoolRegistry, global};
pub use stats::PoolStats;
