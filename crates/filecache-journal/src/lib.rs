//! # filecache-journal
//!
//! Storage layer of the filecache local driver.
//!
//! ## Layout
//! - One journal file per cache key, named by [`map_key`]
//! - Journals are append-only: one JSON record per line, oldest first
//! - Scans are lazy and stop at the first corrupt record
//! - No compaction: a journal only shrinks when the whole file is removed

#![warn(missing_docs)]

mod codec;
mod error;
mod journal;
mod keymap;
mod record;

pub use codec::{decode_line, encode, parse_line, RecordDecoder};
pub use error::{Error, Result};
pub use journal::{append, remove, scan, JournalDir, Records, DEFAULT_DIR_MODE};
pub use keymap::{is_journal_name, map_key, JOURNAL_NAME_LEN};
pub use record::{latest_instant, CacheRecord};
