//! JetPool Connection - Native connection pooling for Jet/ACE databases
//!
//! This crate keeps expensive, file-locking native connections alive between
//! uses. Idle connections are grouped by exact connection string and handed
//! back out most-recent-first.

pub mod pool;
pub mod provider;

pub use pool::{ConnectionBucket, ConnectionPoolRegistry, PoolConfig, PoolStats, global};
pub use provider::{ConnectionProvider, PooledConnection};
