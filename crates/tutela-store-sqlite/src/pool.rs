//! A fixed-size pool of [`tokio_rusqlite::Connection`]s.
//!
//! Each connection owns a worker thread. A fair semaphore bounds how many
//! callers hold a connection at once; the rest queue in arrival order with
//! no timeout.

use std::{
  ops::Deref,
  path::Path,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{Error, Result};

/// How long a writer waits on a locked file database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Pool {
  conns:   Vec<tokio_rusqlite::Connection>,
  free:    Mutex<Vec<usize>>,
  permits: Semaphore,
}

/// A connection checked out of the [`Pool`]; returned on drop.
pub struct PooledConn<'a> {
  pool:    &'a Pool,
  idx:     usize,
  _permit: SemaphorePermit<'a>,
}

impl Deref for PooledConn<'_> {
  type Target = tokio_rusqlite::Connection;

  fn deref(&self) -> &Self::Target {
    &self.pool.conns[self.idx]
  }
}

impl Drop for PooledConn<'_> {
  fn drop(&mut self) {
    // The slot is pushed back before `_permit` is released.
    self
      .pool
      .free
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(self.idx);
  }
}

impl Pool {
  /// Open `size` connections to the database file at `path`.
  pub async fn open(path: impl AsRef<Path>, size: usize) -> Result<Self> {
    if size == 0 {
      return Err(Error::InvalidPoolSize(size));
    }
    let mut conns = Vec::with_capacity(size);
    for _ in 0..size {
      let conn = tokio_rusqlite::Connection::open(path.as_ref()).await?;
      conn
        .call(|conn| {
          conn.busy_timeout(BUSY_TIMEOUT)?;
          conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get::<_, String>(0))?;
          Ok(())
        })
        .await?;
      conns.push(conn);
    }
    Ok(Self::from_connections(conns))
  }

  /// A single in-memory connection. Separate in-memory connections would
  /// each see their own empty database, so this pool never grows.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self::from_connections(vec![conn]))
  }

  fn from_connections(conns: Vec<tokio_rusqlite::Connection>) -> Self {
    let size = conns.len();
    Self {
      conns,
      free: Mutex::new((0..size).rev().collect()),
      permits: Semaphore::new(size),
    }
  }

  pub fn size(&self) -> usize {
    self.conns.len()
  }

  /// Wait for a free connection.
  pub async fn acquire(&self) -> Result<PooledConn<'_>> {
    let permit = self.permits.acquire().await.map_err(|_| Error::PoolClosed)?;
    let idx = self
      .free
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop()
      .ok_or(Error::PoolClosed)?;
    Ok(PooledConn { pool: self, idx, _permit: permit })
  }

  /// Run `f` on a pooled connection's worker thread.
  pub async fn call<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let conn = self.acquire().await?;
    Ok(conn.call(f).await?)
  }

  /// Drain the pool: wait behind every caller already queued, then refuse
  /// new ones and close each connection. Closing twice is a no-op.
  pub async fn close(&self) -> Result<()> {
    let all = u32::try_from(self.size()).map_err(|_| Error::InvalidPoolSize(self.size()))?;
    let Ok(held) = self.permits.acquire_many(all).await else {
      return Ok(());
    };
    self.permits.close();

    for conn in &self.conns {
      match conn.clone().close().await {
        Ok(()) | Err(tokio_rusqlite::Error::ConnectionClosed) => {}
        Err(e) => return Err(e.into()),
      }
    }
    drop(held);
    tracing::info!(connections = self.size(), "connection pool closed");
    Ok(())
  }

  pub fn is_closed(&self) -> bool {
    self.permits.is_closed()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  #[tokio::test]
  async fn callers_queue_when_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let pool = Arc::new(Pool::open(dir.path().join("p.sqlite3"), 2).await.unwrap());

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    assert_ne!(a.idx, b.idx);

    let waiter = {
      let pool = pool.clone();
      tokio::spawn(async move {
        pool
          .call(|c| Ok(c.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?))
          .await
      })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    drop(a);
    assert_eq!(waiter.await.unwrap().unwrap(), 1);
    drop(b);
  }

  #[tokio::test]
  async fn close_refuses_new_callers() {
    let pool = Pool::open_in_memory().await.unwrap();
    pool.close().await.unwrap();
    assert!(pool.is_closed());
    assert!(matches!(pool.acquire().await, Err(Error::PoolClosed)));
    pool.close().await.unwrap();
  }

  #[tokio::test]
  async fn zero_sized_pool_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
      Pool::open(dir.path().join("z.sqlite3"), 0).await,
      Err(Error::InvalidPoolSize(0))
    ));
  }
}
