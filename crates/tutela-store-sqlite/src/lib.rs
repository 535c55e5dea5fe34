//! SQLite backend for the Tutela case-record store.
//!
//! Wraps a pool of [`tokio_rusqlite`] connections so all database access runs
//! on dedicated worker threads without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod ident;
pub mod pool;

pub use error::{Error, Result};
pub use ident::IdAllocation;
pub use store::{DEFAULT_POOL_SIZE, SqliteStore, StoreOptions};

#[cfg(test)]
mod tests;
