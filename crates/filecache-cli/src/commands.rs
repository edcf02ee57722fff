//! Subcommand handlers

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use filecache::{Cache, LocalFileDriver};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tracing::info;

use crate::Command;

/// Run one subcommand, writing its output to `out`
///
/// Returns `false` when the command should exit with a failure code.
pub(crate) fn run<W: Write>(cache: &LocalFileDriver, command: Command, out: &mut W) -> Result<bool> {
    match command {
        Command::Set { key, value, ttl } => {
            cache
                .set(&key, value.as_bytes(), Duration::from_secs(ttl))
                .with_context(|| format!("Failed to set {:?}", key))?;
            info!(key = %key, ttl, "value set");
            writeln!(out, "OK")?;
        }
        Command::Get { key } => {
            let item = cache
                .get(&key)
                .with_context(|| format!("Failed to get {:?}", key))?;
            match item {
                Some(item) => writeln!(out, "{}", String::from_utf8_lossy(item.value()))?,
                None => writeln!(out, "(nil)")?,
            }
        }
        Command::Delete { key } => {
            cache
                .delete(&key)
                .with_context(|| format!("Failed to delete {:?}", key))?;
            writeln!(out, "OK")?;
        }
        Command::Has { key } => {
            let present = cache
                .has(&key)
                .with_context(|| format!("Failed to look up {:?}", key))?;
            writeln!(out, "{}", present)?;
            return Ok(present);
        }
        Command::Flush => {
            cache.flush().context("Failed to flush cache directory")?;
            writeln!(out, "OK")?;
        }
        Command::Inspect { key } => {
            let now = Utc::now();
            let records = cache
                .history(&key)
                .with_context(|| format!("Failed to read journal for {:?}", key))?;
            for record in records {
                let valid = record.is_valid_at(now);
                let line = json!({
                    "key": record.key,
                    "value": String::from_utf8_lossy(&record.value),
                    "created_at": record.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                    "expiration": record.expiration.to_rfc3339_opts(SecondsFormat::Nanos, true),
                    "valid": valid,
                });
                writeln!(out, "{}", line)?;
            }
        }
    }

    Ok(true)
}
