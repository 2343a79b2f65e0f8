//! # Guichet Store - Redis Backend
//!
//! Redis implementation of the [`guichet_store::KvBackend`] trait with two
//! mutually exclusive topologies behind one interface:
//!
//! - **Single**: one connection to one endpoint.
//! - **Cluster**: a sharded deployment discovered from a seed endpoint, with
//!   per-shard liveness probes.
//!
//! The topology is chosen once at construction and never changes for the
//! life of the process. Callers never learn which topology is active.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod router;

pub use config::{StoreConfig, StoreMode, TlsConfig};
pub use router::RedisStore;
