//! The on-disk journal record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `(key, value, expiration, created_at)` tuple written by a single Set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Original cache key (not the mapped file name)
    pub key: String,

    /// Opaque payload bytes
    #[serde(with = "payload")]
    pub value: Vec<u8>,

    /// Instant after which the record is no longer valid
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub expiration: DateTime<Utc>,

    /// Instant the record was written
    #[serde(with = "chrono::serde::ts_nanoseconds")]
    pub created_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Build a record created at `now` that expires `ttl` later
    ///
    /// The expiration saturates at the latest instant the journal format can
    /// hold, so huge TTLs mean "never" instead of an encode failure.
    pub fn new(key: impl Into<String>, value: Vec<u8>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let max = latest_instant();
        let expiration = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .map_or(max, |at| at.min(max));

        Self {
            key: key.into(),
            value,
            expiration,
            created_at: now,
        }
    }

    /// A record is valid iff `now < expiration`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiration
    }
}

/// Latest instant representable as i64 Unix nanoseconds
pub fn latest_instant() -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(i64::MAX)
}

mod payload {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(de::Error::custom)
    }
}
