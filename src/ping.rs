//! Time-window gate for periodic remote checks.
//!
//! A [`Ping`] answers one question: is a remote re-check due yet? It keeps
//! the last check's status and timestamp in the cache under a global scope,
//! so every site of a multi-site install shares the same window.
//!
//! Older installs stored a bare unix timestamp instead of the
//! `{status, time}` record; those still gate correctly but report no last
//! status.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{Scope, ScopedCache};
use crate::error::Result;

/// Default re-check window: 24 hours.
pub const DEFAULT_TTL_SECS: u64 = 86400;

/// Stored record of the last remote check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingRecord {
    /// Status reported by the last check.
    pub status: String,
    /// Unix time the check ran.
    pub time: i64,
}

/// Throttle for a periodic remote check keyed by `key`.
pub struct Ping {
    cache: ScopedCache,
    key: String,
    ttl_seconds: u64,
}

impl Ping {
    /// Create a gate storing its record under `key` with the given window.
    pub fn new(cache: ScopedCache, key: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            cache,
            key: key.into(),
            ttl_seconds,
        }
    }

    /// The re-check window in seconds.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// The raw stored record, if any.
    pub fn last_ping(&self) -> Result<Option<Value>> {
        self.cache.get(&self.key, Scope::Global)
    }

    /// Status of the last check.
    ///
    /// `None` when no check ran yet or the record predates the
    /// `{status, time}` shape.
    pub fn last_ping_status(&self) -> Result<Option<String>> {
        let Some(value) = self.last_ping()? else {
            return Ok(None);
        };

        Ok(value
            .get("status")
            .and_then(Value::as_str)
            .map(String::from))
    }

    /// Drop the stored record, forcing the next check to run.
    pub fn clear(&self) -> Result<bool> {
        self.cache.delete(&self.key, Scope::Global)
    }

    /// Whether a re-check is due.
    ///
    /// Due iff no record exists or `now - last_time >= ttl`.
    pub fn should_ping(&self) -> Result<bool> {
        let Some(value) = self.last_ping()? else {
            return Ok(true);
        };

        // Newer records are {status, time}; legacy ones are a bare timestamp.
        let last_time = value
            .get("time")
            .and_then(Value::as_i64)
            .or_else(|| value.as_i64());

        let Some(last_time) = last_time else {
            return Ok(true);
        };

        Ok(last_time + self.ttl_seconds as i64 <= Utc::now().timestamp())
    }

    /// Record a completed check with its resulting status.
    ///
    /// The record itself expires with the window so a stale status never
    /// outlives its usefulness.
    pub fn update_last_ping(&self, status: &str) -> Result<()> {
        let record = serde_json::json!({
            "status": status,
            "time": Utc::now().timestamp(),
        });

        self.cache
            .save_with_ttl(&self.key, &record, Some(self.ttl_seconds), Scope::Global)
    }
}
