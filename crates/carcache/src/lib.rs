//! # carcache
//!
//! Cache-aside layer in front of `carstore`, keeping three
//! representations of the same roster in one cache keyspace:
//!
//! - a single serialized blob of the full descending roster
//! - a sorted set ranked by score, one member per car
//! - a top-5 slice served from that same sorted set
//!
//! ## Architecture
//! - **CacheConn**: shared in-process keyspace (blobs + sorted sets)
//! - **CacheManager**: hit/miss/populate logic per representation
//! - **Invalidation**: one operation deletes both keys; every write
//!   to the store goes through it
//! - **CacheStats**: atomic hit/miss counters

#![warn(missing_docs)]

mod error;
mod kv;
mod manager;
mod stats;

pub use error::{Error, Result};
pub use kv::{CacheConn, Order};
pub use manager::{CacheManager, CARS_LIST_KEY, CARS_RANKED_KEY, TOP_N};
pub use stats::CacheStats;
