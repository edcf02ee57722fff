//! Local filesystem cache driver

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use filecache_journal::{append, remove, scan, CacheRecord, JournalDir, Result, DEFAULT_DIR_MODE};
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{Cache, CacheItem};
use crate::lookup::LookupPolicy;
use crate::stats::CacheStats;

/// Options for [`LocalFileDriver`]
#[derive(Debug, Clone, Copy)]
pub struct LocalFileOptions {
    /// Which valid record Get returns
    pub lookup: LookupPolicy,

    /// Permission bits for the cache directory if it has to be created (unix)
    pub dir_mode: u32,
}

impl Default for LocalFileOptions {
    fn default() -> Self {
        Self {
            lookup: LookupPolicy::default(),
            dir_mode: DEFAULT_DIR_MODE,
        }
    }
}

/// Cache driver storing one append-only journal per key in a directory
///
/// Every call holds a single driver-wide lock for its whole duration:
/// Set, Delete and Flush exclusively, Get and Has shared. Nothing is kept in
/// memory between calls, so every Get reads the journal from disk.
///
/// The lock only orders calls made through this instance. Other processes,
/// or other drivers opened on the same directory, are not coordinated with.
pub struct LocalFileDriver {
    /// Journal directory
    journals: JournalDir,

    /// Driver-wide reader/writer lock
    lock: RwLock<()>,

    /// Record selection for Get
    lookup: LookupPolicy,

    /// Operation counters
    stats: CacheStats,
}

impl LocalFileDriver {
    /// Open a driver on `dir` with default options
    ///
    /// # Arguments
    /// * `dir` - Cache directory, created with its parents if missing
    ///
    /// # Returns
    /// * `Result<LocalFileDriver>` - Driver handle
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::with_options(dir, LocalFileOptions::default())
    }

    /// Open a driver on `dir` with explicit options
    pub fn with_options<P: AsRef<Path>>(dir: P, options: LocalFileOptions) -> Result<Self> {
        let journals = JournalDir::open(dir, options.dir_mode)?;
        debug!(dir = %journals.dir().display(), lookup = ?options.lookup, "opened local cache");

        Ok(Self {
            journals,
            lock: RwLock::new(()),
            lookup: options.lookup,
            stats: CacheStats::new(),
        })
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        self.journals.dir()
    }

    /// Lookup policy in use
    pub fn lookup(&self) -> LookupPolicy {
        self.lookup
    }

    /// Every record in `key`'s journal, oldest first, expired ones included
    pub fn history(&self, key: &str) -> Result<Vec<CacheRecord>> {
        let _guard = self.lock.read();
        scan(&self.journals.path_for(key))?.collect()
    }

    /// Get driver statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl Cache for LocalFileDriver {
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let _guard = self.lock.write();

        if value.is_empty() {
            return Ok(());
        }

        let record = CacheRecord::new(key, value.to_vec(), ttl, Utc::now());
        append(&self.journals.path_for(key), &record)?;
        self.stats.record_write();

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<CacheItem>> {
        let _guard = self.lock.read();

        let records = scan(&self.journals.path_for(key))?;
        let found = self.lookup.find(records, key, Utc::now())?;

        match found {
            Some(record) => {
                self.stats.record_hit();
                Ok(Some(record.into()))
            }
            None => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write();

        if remove(&self.journals.path_for(key))? {
            self.stats.record_deletes(1);
        }

        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let _guard = self.lock.write();

        let removed = self.journals.clear()?;
        self.stats.record_deletes(removed as u64);
        debug!(dir = %self.journals.dir().display(), removed, "flushed cache");

        Ok(())
    }
}
