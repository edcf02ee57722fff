//! Journal store
//!
//! Directory layout:
//! - `<dir>/<map_key(key)>`: append-only journal of every record written
//!   for `key`, oldest first
//!
//! Journals are never truncated or rewritten. The only way a record leaves
//! the disk is removal of its whole journal file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::{encode, RecordDecoder};
use crate::error::Result;
use crate::keymap::{is_journal_name, map_key};
use crate::record::CacheRecord;

/// Default permission bits for a newly created journal directory
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Append a record to the journal at `path`, creating the file if needed
pub fn append(path: &Path, record: &CacheRecord) -> Result<()> {
    let line = encode(record)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    // One write per record so a reader never sees half a line from us
    file.write_all(&line)?;

    debug!(path = %path.display(), bytes = line.len(), "appended record");
    Ok(())
}

/// Scan the journal at `path` in file order
///
/// A missing journal is an empty scan, not an error.
pub fn scan(path: &Path) -> Result<Records> {
    match File::open(path) {
        Ok(file) => {
            debug!(path = %path.display(), "scanning journal");
            Ok(Records {
                inner: Some(RecordDecoder::new(BufReader::new(file))),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Records::empty()),
        Err(e) => Err(e.into()),
    }
}

/// Remove the journal at `path`
///
/// Returns whether a journal was there. A missing journal is not an error.
pub fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed journal");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Lazy sequence of records read from one journal
pub struct Records {
    inner: Option<RecordDecoder<BufReader<File>>>,
}

impl Records {
    /// A scan with no records
    pub fn empty() -> Self {
        Self { inner: None }
    }
}

impl Iterator for Records {
    type Item = Result<CacheRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

/// Directory holding one journal per key
#[derive(Debug, Clone)]
pub struct JournalDir {
    dir: PathBuf,
}

impl JournalDir {
    /// Open a journal directory, creating it (and its parents) if missing
    ///
    /// `mode` is applied on unix and is still subject to the process umask.
    pub fn open<P: AsRef<Path>>(dir: P, mode: u32) -> Result<Self> {
        let dir = dir.as_ref();

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(dir)?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Base directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Journal path for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(map_key(key))
    }

    /// Remove every journal in the directory
    ///
    /// Files whose names could not have come from [`map_key`] are left alone.
    /// Returns the number of journals removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if name.to_str().is_some_and(is_journal_name) && remove(&entry.path())? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(key: &str, value: &[u8]) -> CacheRecord {
        CacheRecord::new(key, value.to_vec(), Duration::from_secs(60), Utc::now())
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let journals = JournalDir::open(&nested, DEFAULT_DIR_MODE).unwrap();
        assert!(nested.is_dir());
        assert_eq!(journals.dir(), nested.as_path());

        // Opening an existing directory is fine
        JournalDir::open(&nested, DEFAULT_DIR_MODE).unwrap();
    }

    #[test]
    fn test_path_for_uses_mapped_name() {
        let dir = TempDir::new().unwrap();
        let journals = JournalDir::open(dir.path(), DEFAULT_DIR_MODE).unwrap();

        assert_eq!(journals.path_for("k"), dir.path().join(map_key("k")));
    }

    #[test]
    fn test_append_and_scan() {
        let dir = TempDir::new().unwrap();
        let journals = JournalDir::open(dir.path(), DEFAULT_DIR_MODE).unwrap();
        let path = journals.path_for("k");

        let first = record("k", b"A");
        let second = record("k", b"B");
        append(&path, &first).unwrap();
        append(&path, &second).unwrap();

        let records: Vec<_> = scan(&path).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_scan_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut records = scan(&dir.path().join("missing")).unwrap();
        assert!(records.next().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        // Opening a directory succeeds on unix but reading it fails
        let result = scan(dir.path()).and_then(|records| records.collect::<Result<Vec<_>>>());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_scan_surfaces_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(map_key("k"));

        append(&path, &record("k", b"A")).unwrap();
        OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"not json\n")
            .unwrap();
        append(&path, &record("k", b"B")).unwrap();

        let results: Vec<_> = scan(&path).unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Decode { line: 2, .. })));
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(map_key("k"));

        append(&path, &record("k", b"A")).unwrap();
        assert!(remove(&path).unwrap());
        assert!(!path.exists());

        // Removing again is not an error
        assert!(!remove(&path).unwrap());
    }

    #[test]
    fn test_append_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(map_key("k"));
        fs::create_dir(&path).unwrap();

        let result = append(&path, &record("k", b"A"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_remove_failure_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(map_key("k"));
        fs::create_dir(&path).unwrap();

        assert!(matches!(remove(&path), Err(Error::Io(_))));
        assert!(path.is_dir());
    }

    #[test]
    fn test_clear_only_touches_journals() {
        let dir = TempDir::new().unwrap();
        let journals = JournalDir::open(dir.path(), DEFAULT_DIR_MODE).unwrap();

        append(&journals.path_for("a"), &record("a", b"1")).unwrap();
        append(&journals.path_for("b"), &record("b", b"2")).unwrap();
        fs::write(dir.path().join("README"), b"keep me").unwrap();

        assert_eq!(journals.clear().unwrap(), 2);
        assert!(!journals.path_for("a").exists());
        assert!(dir.path().join("README").exists());
    }
}
