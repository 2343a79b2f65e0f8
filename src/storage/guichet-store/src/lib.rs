//! # Guichet Store
//!
//! Storage abstraction layer for Guichet backends.
//!
//! Provides the [`KvBackend`] trait implemented by every session store
//! (single-node Redis, clustered Redis, in-memory), plus common error types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::KvBackend;
pub use error::StoreError;
pub use memory::MemoryStore;
