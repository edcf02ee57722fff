//! # filecache
//!
//! Pluggable key-value cache with a local filesystem driver.
//!
//! ## Architecture
//! - **Cache**: bytes-level contract (set/get/delete/flush/has), with
//!   [`CacheExt`] adding JSON-typed access at the caller boundary
//! - **LocalFileDriver**: one append-only journal per key, re-read on every Get
//! - **LookupPolicy**: which valid record a Get returns
//! - **Locking**: one reader/writer lock per driver instance
//!
//! ```no_run
//! use std::time::Duration;
//! use filecache::{CacheExt, LocalFileDriver};
//!
//! let cache = LocalFileDriver::new("storage/cache")?;
//! cache.set_value("greeting", "hello", Duration::from_secs(60))?;
//! let greeting: Option<String> = cache.get_value("greeting")?;
//! # Ok::<(), filecache::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod local;
mod lookup;
mod stats;

pub use cache::{Cache, CacheExt, CacheItem};
pub use filecache_journal::{CacheRecord, Error, Result};
pub use local::{LocalFileDriver, LocalFileOptions};
pub use lookup::LookupPolicy;
pub use stats::CacheStats;
