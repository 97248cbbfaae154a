//! Tests for the connection provider

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use jetpool_core::{ConnectionFactory, JetPoolError, NativeConnection, Result};

use super::*;

struct MockConnection {
    id: usize,
    connection_string: String,
    closed: Arc<AtomicUsize>,
    fail_close: bool,
}

impl NativeConnection for MockConnection {
    fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn close(&mut self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(JetPoolError::Close("engine refused to detach".into()));
        }
        Ok(())
    }
}

/// Mock factory that counts opens and can be told to fail
struct MockConnectionFactory {
    opened: AtomicUsize,
    closed: Arc<AtomicUsize>,
    fail: AtomicBool,
    fail_close: AtomicBool,
}

impl MockConnectionFactory {
    fn new() -> Self {
        Self {
            opened: AtomicUsize::new(0),
            closed: Arc::new(AtomicUsize::new(0)),
            fail: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
        }
    }

    fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MockConnectionFactory {
    type Connection = MockConnection;

    async fn open(&self, connection_string: &str) -> Result<MockConnection> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(JetPoolError::Open("database file is locked".into()));
        }
        let id = self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            id,
            connection_string: connection_string.to_string(),
            closed: Arc::clone(&self.closed),
            fail_close: self.fail_close.load(Ordering::SeqCst),
        })
    }
}

#[tokio::test]
async fn test_acquire_opens_on_miss() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let conn = provider.acquire("S1").await.expect("acquire");
    assert!(!conn.was_reused());
    assert_eq!(conn.connection_string(), "S1");
    assert_eq!(conn.id, 0);
    assert_eq!(provider.factory().opened(), 1);
}

#[tokio::test]
async fn test_drop_returns_connection_for_reuse() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    {
        let _conn = provider.acquire("S1").await.expect("acquire");
        assert_eq!(provider.registry().idle_count(), 0);
    }
    assert_eq!(provider.registry().idle_count(), 1);

    let conn = provider.acquire("S1").await.expect("acquire");
    assert!(conn.was_reused());
    assert_eq!(conn.id, 0);
    assert_eq!(provider.factory().opened(), 1);
}

#[tokio::test]
async fn test_concurrently_held_connections_are_distinct() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let a = provider.acquire("S1").await.expect("acquire a");
    let b = provider.acquire("S1").await.expect("acquire b");
    assert_ne!(a.id, b.id);
    assert_eq!(provider.factory().opened(), 2);

    drop(a);
    drop(b);
    assert_eq!(provider.registry().idle_count(), 2);

    // b was returned last, so it comes back first
    let next = provider.acquire("S1").await.expect("acquire");
    assert_eq!(next.id, 1);
}

#[tokio::test]
async fn test_discard_closes_instead_of_returning() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let conn = provider.acquire("S1").await.expect("acquire");
    conn.discard();

    assert_eq!(provider.factory().closed(), 1);
    assert_eq!(provider.registry().idle_count(), 0);
}

#[tokio::test]
async fn test_discard_swallows_close_failure() {
    let factory = MockConnectionFactory::new();
    factory.fail_close.store(true, Ordering::SeqCst);
    let provider = ConnectionProvider::new(factory);

    let conn = provider.acquire("S1").await.expect("acquire");
    conn.discard();

    assert_eq!(provider.factory().closed(), 1);
    assert_eq!(provider.registry().idle_count(), 0);
    // Discarding bypasses the registry, so its release counters are untouched
    let stats = provider.registry().stats();
    assert_eq!(stats.discarded(), 0);
    assert_eq!(stats.releases(), 0);
}

#[tokio::test]
async fn test_detach_leaves_pool_untouched() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let conn = provider.acquire("S1").await.expect("acquire");
    let mut raw = conn.detach();

    assert_eq!(provider.registry().idle_count(), 0);
    assert_eq!(provider.factory().closed(), 0);
    raw.close().expect("close");
}

#[tokio::test]
async fn test_factory_error_propagates() {
    let factory = MockConnectionFactory::new();
    factory.fail.store(true, Ordering::SeqCst);
    let provider = ConnectionProvider::new(factory);

    let err = provider.acquire("S1").await.err().expect("open fails");
    assert!(matches!(err, JetPoolError::Open(_)));
}

#[tokio::test]
async fn test_pool_exhaustion_is_invisible() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let mut held = Vec::new();
    for _ in 0..5 {
        held.push(provider.acquire("S1").await.expect("acquire"));
    }
    assert_eq!(provider.factory().opened(), 5);
    drop(held);

    assert_eq!(provider.registry().stats().releases(), 5);
}

#[tokio::test]
async fn test_shared_registry_between_providers() {
    let registry = Arc::new(ConnectionPoolRegistry::new());
    let first =
        ConnectionProvider::with_registry(Arc::clone(&registry), MockConnectionFactory::new());
    let second =
        ConnectionProvider::with_registry(Arc::clone(&registry), MockConnectionFactory::new());

    drop(first.acquire("S1").await.expect("acquire"));
    let conn = second.acquire("S1").await.expect("acquire");

    assert!(conn.was_reused());
    assert_eq!(second.factory().opened(), 0);
}

#[tokio::test]
async fn test_dispose_then_drop_closes_connection() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    let held = provider.acquire("S1").await.expect("acquire");
    drop(provider.acquire("S1").await.expect("acquire"));
    assert_eq!(provider.registry().idle_count(), 1);

    provider.dispose_all();
    assert_eq!(provider.factory().closed(), 1);

    // Returned after shutdown, so it is closed rather than pooled
    drop(held);
    assert_eq!(provider.factory().closed(), 2);
    assert_eq!(provider.registry().idle_count(), 0);
}

#[tokio::test]
async fn test_deref_mut_changes_survive_return() {
    let provider = ConnectionProvider::new(MockConnectionFactory::new());

    {
        let mut conn = provider.acquire("S1").await.expect("acquire");
        conn.id = 42;
    }

    let conn = provider.acquire("S1").await.expect("acquire");
    assert!(conn.was_reused());
    assert_eq!(conn.id, 42);
}
