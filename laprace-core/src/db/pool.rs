//! Bounded storage connection pool
//!
//! Keeps at most `capacity` idle connections for reuse. Capacity is a soft
//! cap: `acquire` never waits for a slot, it opens a fresh connection when
//! nothing is idle, and `release` closes the connection when the idle set is
//! already full.
//!
//! The reuse and overflow decisions are taken under one mutex that is never
//! held across an `.await`; connections are closed after the lock is gone.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, error, trace, warn};

use crate::error::{RaceError, Result};

/// Default number of idle connections kept for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 2;

/// Opens and closes the connections a [`ResourcePool`] hands out.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Send + 'static;

    async fn open(&self) -> Result<Self::Connection>;

    async fn close(&self, conn: Self::Connection) -> Result<()>;
}

/// SQLite connector with foreign key enforcement turned on.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    options: SqliteConnectOptions,
    path: PathBuf,
}

impl SqliteConnector {
    /// Connector for a database file, created on first open if missing.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        Self {
            options,
            path: path.to_path_buf(),
        }
    }

    /// Create the parent directory of the database file if needed.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(|err| {
                    RaceError::config(format!("cannot create {}: {}", parent.display(), err))
                })
            }
            _ => Ok(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    type Connection = SqliteConnection;

    async fn open(&self) -> Result<SqliteConnection> {
        self.options
            .connect()
            .await
            .map_err(|err| RaceError::storage_unavailable(self.path.display().to_string(), err))
    }

    async fn close(&self, conn: SqliteConnection) -> Result<()> {
        conn.close().await.map_err(RaceError::from)
    }
}

/// Pool of reusable connections.
pub struct ResourcePool<C: Connector> {
    connector: C,
    capacity: usize,
    idle: Mutex<Vec<C::Connection>>,
}

/// Production pool over SQLite connections
pub type RacePool = ResourcePool<SqliteConnector>;

impl<C: Connector> ResourcePool<C> {
    pub fn new(connector: C, capacity: usize) -> Self {
        Self {
            connector,
            capacity,
            idle: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Take an idle connection, or open a new one when none is idle.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` when a new connection cannot be opened.
    /// Nothing served afterwards can succeed, so the failure is logged as
    /// fatal.
    pub async fn acquire(&self) -> Result<C::Connection> {
        let reused = self.idle().pop();
        if let Some(conn) = reused {
            trace!("connection taken from pool");
            return Ok(conn);
        }

        match self.connector.open().await {
            Ok(conn) => {
                debug!("connection created");
                Ok(conn)
            }
            Err(err) => {
                error!(error = %err, "fatal: cannot open storage connection");
                Err(err)
            }
        }
    }

    /// Hand a connection back. Closes it when the idle set is full.
    pub async fn release(&self, conn: C::Connection) {
        let overflow = {
            let mut idle = self.idle();
            if idle.len() < self.capacity {
                idle.push(conn);
                None
            } else {
                Some(conn)
            }
        };

        match overflow {
            None => trace!("connection released in the pool"),
            Some(conn) => {
                trace!("pool is full, closing connection");
                self.close(conn).await;
            }
        }
    }

    /// Close every idle connection. Checked-out connections are untouched.
    pub async fn drain(&self) {
        let drained = std::mem::take(&mut *self.idle());
        debug!(count = drained.len(), "draining connection pool");
        for conn in drained {
            self.close(conn).await;
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    async fn close(&self, conn: C::Connection) {
        if let Err(err) = self.connector.close(conn).await {
            warn!(error = %err, "error while closing connection");
        }
    }

    // The idle list stays consistent even if a holder panicked.
    fn idle(&self) -> MutexGuard<'_, Vec<C::Connection>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct FakeConn(usize);

    #[derive(Default)]
    struct CountingConnector {
        opened: AtomicUsize,
        closed: AtomicUsize,
        fail_open: AtomicBool,
        fail_close: AtomicBool,
    }

    impl CountingConnector {
        fn live(&self) -> usize {
            self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for CountingConnector {
        type Connection = FakeConn;

        async fn open(&self) -> Result<FakeConn> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(RaceError::storage_unavailable("fake", sqlx::Error::PoolClosed));
            }
            Ok(FakeConn(self.opened.fetch_add(1, Ordering::SeqCst)))
        }

        async fn close(&self, _conn: FakeConn) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            if self.fail_close.load(Ordering::SeqCst) {
                return Err(RaceError::Database(sqlx::Error::PoolClosed));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn reuses_idle_connection() {
        let pool = ResourcePool::new(CountingConnector::default(), 2);

        let conn = pool.acquire().await.unwrap();
        assert_eq!(conn.0, 0);
        pool.release(conn).await;
        assert_eq!(pool.idle_count(), 1);

        let again = pool.acquire().await.unwrap();
        assert_eq!(again.0, 0);
        assert_eq!(pool.connector().opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn acquire_opens_beyond_capacity_without_waiting() {
        let pool = ResourcePool::new(CountingConnector::default(), 1);

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        let c = pool.acquire().await.unwrap();
        assert_eq!(pool.connector().live(), 3);

        pool.release(a).await;
        pool.release(b).await;
        pool.release(c).await;

        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.connector().closed.load(Ordering::SeqCst), 2);
        assert_eq!(pool.connector().live(), 1);
    }

    #[tokio::test]
    async fn drain_leaves_checked_out_connections_alone() {
        let pool = ResourcePool::new(CountingConnector::default(), 2);

        let held = pool.acquire().await.unwrap();
        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        pool.release(a).await;
        pool.release(b).await;

        pool.drain().await;
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.connector().closed.load(Ordering::SeqCst), 2);

        pool.release(held).await;
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn close_failures_are_swallowed() {
        let connector = CountingConnector::default();
        connector.fail_close.store(true, Ordering::SeqCst);
        let pool = ResourcePool::new(connector, 0);

        let conn = pool.acquire().await.unwrap();
        pool.release(conn).await;

        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.connector().closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_failure_is_storage_unavailable() {
        let connector = CountingConnector::default();
        connector.fail_open.store(true, Ordering::SeqCst);
        let pool = ResourcePool::new(connector, 2);

        let err = pool.acquire().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_never_exceed_bound() {
        const CAPACITY: usize = 3;
        const TASKS: usize = 32;

        let pool = Arc::new(ResourcePool::new(CountingConnector::default(), CAPACITY));
        let checked_out = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let checked_out = Arc::clone(&checked_out);
                tokio::spawn(async move {
                    for _ in 0..50 {
                        let conn = pool.acquire().await.unwrap();
                        checked_out.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        checked_out.fetch_sub(1, Ordering::SeqCst);
                        pool.release(conn).await;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("task panicked");
        }

        // Everything released: whatever is still open sits idle, within capacity
        assert_eq!(checked_out.load(Ordering::SeqCst), 0);
        assert!(pool.idle_count() <= CAPACITY);
        assert_eq!(pool.connector().live(), pool.idle_count());
        assert!(pool.connector().opened.load(Ordering::SeqCst) >= pool.idle_count());
    }
}
