//! JetPool Core - Shared abstractions for Jet/ACE connection pooling
//!
//! This crate defines the pieces that both the pool and its callers agree on:
//!
//! - `NativeConnection` - An opened handle to the database engine
//! - `ConnectionFactory` - Opens fresh native connections on demand
//! - `JetPoolError` - Error type shared across the workspace
//! - `redact_connection_string` - Masks credentials before they reach logs

mod connection;
mod error;
mod redact;

pub use connection::*;
pub use error::*;
pub use redact::redact_connection_string;
