//! Cache key to journal file name mapping
//!
//! `hex(sha256(base64(key)))`: 64 lowercase hex characters, safe on every
//! filesystem we care about.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

/// Length of a mapped journal file name
pub const JOURNAL_NAME_LEN: usize = 64;

/// Map a cache key to its journal file name
pub fn map_key(key: &str) -> String {
    let encoded = STANDARD.encode(key.as_bytes());
    hex::encode(Sha256::digest(encoded.as_bytes()))
}

/// Check whether `name` has the shape of a name produced by [`map_key`]
pub fn is_journal_name(name: &str) -> bool {
    name.len() == JOURNAL_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
