//! Bounded, time-expiring cache
//!
//! One [`TtlCache`] instance is built when the engine starts and shared by
//! handle with every diff engine, so capacity and TTL stay configurable per
//! engine (and per test) instead of living in global state.

mod storage;
mod types;


pub use storage::TtlCache;
pub use types::{CacheEntry, CacheStatistics};
