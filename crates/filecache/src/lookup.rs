//! Record selection over a key's journal

use chrono::{DateTime, Utc};
use filecache_journal::{CacheRecord, Result};

/// Which valid record a Get returns when a journal holds several
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    /// First valid record in file order; stops scanning as soon as one is
    /// found. An older record that has not expired yet shadows later Sets.
    #[default]
    Earliest,

    /// Last valid record in file order. Reads the whole journal.
    Latest,
}

impl LookupPolicy {
    /// Pick the record for `key` out of a journal scan
    ///
    /// Records with a different stored key are skipped, as are records that
    /// are no longer valid at `now`. The first scan error aborts the lookup.
    pub fn find<I>(self, records: I, key: &str, now: DateTime<Utc>) -> Result<Option<CacheRecord>>
    where
        I: IntoIterator<Item = Result<CacheRecord>>,
    {
        let mut found = None;

        for record in records {
            let record = record?;
            if record.key != key || !record.is_valid_at(now) {
                continue;
            }

            match self {
                LookupPolicy::Earliest => return Ok(Some(record)),
                LookupPolicy::Latest => found = Some(record),
            }
        }

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filecache_journal::Error;
    use std::time::Duration;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn record(key: &str, value: &str, created: i64, ttl_secs: u64) -> Result<CacheRecord> {
        Ok(CacheRecord::new(
            key,
            value.as_bytes().to_vec(),
            Duration::from_secs(ttl_secs),
            at(created),
        ))
    }

    fn value(found: Option<CacheRecord>) -> Option<String> {
        found.map(|r| String::from_utf8(r.value).unwrap())
    }

    #[test]
    fn test_empty_is_none() {
        let found = LookupPolicy::Earliest.find(Vec::new(), "k", at(0)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_earliest_valid_wins() {
        let journal = vec![record("k", "A", 0, 3600), record("k", "B", 1, 3600)];
        let found = LookupPolicy::Earliest.find(journal, "k", at(2)).unwrap();
        assert_eq!(value(found).as_deref(), Some("A"));
    }

    #[test]
    fn test_latest_valid_wins() {
        let journal = vec![record("k", "A", 0, 3600), record("k", "B", 1, 3600)];
        let found = LookupPolicy::Latest.find(journal, "k", at(2)).unwrap();
        assert_eq!(value(found).as_deref(), Some("B"));
    }

    #[test]
    fn test_skips_expired() {
        let journal = vec![record("k", "A", 0, 10), record("k", "B", 5, 3600)];
        let found = LookupPolicy::Earliest.find(journal, "k", at(10)).unwrap();
        assert_eq!(value(found).as_deref(), Some("B"));
    }

    #[test]
    fn test_all_expired_is_none() {
        let journal = vec![record("k", "A", 0, 10), record("k", "B", 5, 10)];
        assert!(LookupPolicy::Earliest.find(journal, "k", at(100)).unwrap().is_none());
    }

    #[test]
    fn test_skips_foreign_keys() {
        let journal = vec![record("other", "X", 0, 3600), record("k", "A", 0, 3600)];
        let found = LookupPolicy::Earliest.find(journal, "k", at(1)).unwrap();
        assert_eq!(value(found).as_deref(), Some("A"));
    }

    #[test]
    fn test_error_aborts() {
        let journal = vec![
            record("k", "A", 0, 10),
            Err(Error::Decode {
                line: 2,
                message: "bad".to_string(),
            }),
            record("k", "B", 0, 3600),
        ];
        let result = LookupPolicy::Earliest.find(journal, "k", at(20));
        assert!(matches!(result, Err(Error::Decode { line: 2, .. })));
    }

    #[test]
    fn test_earliest_stops_before_later_error() {
        let journal = vec![
            record("k", "A", 0, 3600),
            Err(Error::Decode {
                line: 2,
                message: "bad".to_string(),
            }),
        ];
        let found = LookupPolicy::Earliest.find(journal, "k", at(1)).unwrap();
        assert_eq!(value(found).as_deref(), Some("A"));

        let journal = vec![
            record("k", "A", 0, 3600),
            Err(Error::Decode {
                line: 2,
                message: "bad".to_string(),
            }),
        ];
        assert!(LookupPolicy::Latest.find(journal, "k", at(1)).is_err());
    }
}
