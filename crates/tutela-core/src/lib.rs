//! Core types and trait definitions for the Tutela case-record service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The store, API, server, renderer and terminal client all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod document;
pub mod error;
pub mod input;
pub mod lookup;
pub mod medidas;
pub mod observacao;
pub mod record;
pub mod signature;
pub mod store;

pub use error::{Error, Result};
