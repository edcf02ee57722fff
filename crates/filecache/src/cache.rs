//! Generic cache contract and the item value object

use std::time::Duration;

use chrono::{DateTime, Utc};
use filecache_journal::{CacheRecord, Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Key-value cache over opaque byte payloads
pub trait Cache {
    /// Store `value` under `key` for `ttl`
    ///
    /// An empty value is a successful no-op.
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Look up `key`; `Ok(None)` means absent
    fn get(&self, key: &str) -> Result<Option<CacheItem>>;

    /// Remove everything stored under `key`
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every key
    fn flush(&self) -> Result<()>;

    /// Check whether `key` currently has a value
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Typed access on top of any [`Cache`]
///
/// Values are stored as JSON. A value that serialises to `null` (e.g. `None`)
/// counts as absent and is not written.
pub trait CacheExt: Cache {
    /// Serialise `value` and store it under `key`
    fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_vec(value).map_err(Error::Value)?;
        if payload == b"null" {
            return Ok(());
        }
        self.set(key, &payload, ttl)
    }

    /// Look up `key` and deserialise its payload
    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)?.map(|item| item.decode()).transpose()
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}

/// A value read from a cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    /// Cache key
    pub key: String,
    /// Payload bytes
    pub value: Vec<u8>,
    /// Instant after which the item is stale
    pub expiration: DateTime<Utc>,
    /// Instant the item was written
    pub created_at: DateTime<Utc>,
}

impl CacheItem {
    /// Whether the item is past its expiration
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expiration
    }

    /// Time left before expiration, `None` once expired
    pub fn expires_in(&self) -> Option<Duration> {
        (self.expiration - Utc::now()).to_std().ok().filter(|d| !d.is_zero())
    }

    /// Move the expiration to `ttl` from now
    pub fn expire_in(&mut self, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        self.expiration = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Move the expiration to `at`
    pub fn expire_at(&mut self, at: DateTime<Utc>) {
        self.expiration = at;
    }

    /// Payload bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replace the payload bytes
    pub fn set_value(&mut self, value: Vec<u8>) {
        self.value = value;
    }

    /// Take the payload bytes
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Deserialise the payload as JSON
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.value).map_err(Error::Value)
    }
}

impl From<CacheRecord> for CacheItem {
    fn from(record: CacheRecord) -> Self {
        Self {
            key: record.key,
            value: record.value,
            expiration: record.expiration,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(expiration: DateTime<Utc>) -> CacheItem {
        CacheItem {
            key: "k".to_string(),
            value: br#"{"id":7}"#.to_vec(),
            expiration,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry() {
        let live = item(Utc::now() + chrono::Duration::hours(1));
        assert!(!live.is_expired());
        assert!(live.expires_in().unwrap() > Duration::from_secs(3500));

        let stale = item(Utc::now() - chrono::Duration::seconds(1));
        assert!(stale.is_expired());
        assert_eq!(stale.expires_in(), None);
    }

    #[test]
    fn test_expire_in_and_at() {
        let mut it = item(Utc::now() - chrono::Duration::seconds(1));
        it.expire_in(Duration::from_secs(60));
        assert!(!it.is_expired());

        it.expire_at(Utc::now() - chrono::Duration::seconds(1));
        assert!(it.is_expired());

        it.expire_in(Duration::MAX);
        assert!(!it.is_expired());
    }

    #[test]
    fn test_decode() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct User {
            id: u32,
        }

        let it = item(Utc::now());
        assert_eq!(it.decode::<User>().unwrap(), User { id: 7 });
        assert!(matches!(it.decode::<String>(), Err(Error::Value(_))));
    }

    #[test]
    fn test_value_accessors() {
        let mut it = item(Utc::now());
        it.set_value(b"raw".to_vec());
        assert_eq!(it.value(), b"raw");
        assert_eq!(it.into_value(), b"raw".to_vec());
    }
}
