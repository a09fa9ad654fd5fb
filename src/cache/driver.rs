//! Cache driver seam.
//!
//! The host application owns the real cache backend. This trait is the
//! narrow surface Basee needs from it: JSON values in and out, per-key TTL,
//! and prefix deletes for busting a whole namespace.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::error::Result;

/// Key/value store with TTL, as provided by the host.
///
/// Implementations must treat an expired entry as a miss. `ttl_seconds` of
/// `None` means the entry never expires.
pub trait CacheDriver: Send + Sync {
    /// Fetch a value, `None` on miss or expiry.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store a value, replacing any existing entry.
    fn save(&self, key: &str, value: &Value, ttl_seconds: Option<u64>) -> Result<()>;

    /// Remove one key. Returns whether an entry was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every key starting with `prefix`. Returns the number removed.
    fn delete_prefix(&self, prefix: &str) -> Result<usize>;
}

struct MemoryEntry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// In-process [`CacheDriver`].
///
/// Useful in tests and for hosts without a persistent cache configured.
#[derive(Default)]
pub struct MemoryDriver {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryDriver {
    /// Create an empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Whether the driver holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheDriver for MemoryDriver {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, value: &Value, ttl_seconds: Option<u64>) -> Result<()> {
        let expires_at = ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64));

        self.entries.lock().unwrap().insert(
            key.to_string(),
            MemoryEntry {
                value: value.clone(),
                expires_at,
            },
        );

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));

        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_returns_saved_value() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!({"a": 1}), None).unwrap();

        assert_eq!(driver.get("k").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn missing_key_is_none() {
        let driver = MemoryDriver::new();
        assert_eq!(driver.get("nope").unwrap(), None);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!(1), Some(0)).unwrap();

        assert_eq!(driver.get("k").unwrap(), None);
    }

    #[test]
    fn long_ttl_entry_survives() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!(1), Some(3600)).unwrap();

        assert_eq!(driver.get("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn no_ttl_never_expires() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!(1), None).unwrap();

        assert_eq!(driver.get("k").unwrap(), Some(json!(1)));
        assert_eq!(driver.len(), 1);
    }

    #[test]
    fn delete_removes_entry() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!(1), None).unwrap();

        assert!(driver.delete("k").unwrap());
        assert!(!driver.delete("k").unwrap());
        assert!(driver.is_empty());
    }

    #[test]
    fn delete_prefix_removes_matching_keys() {
        let driver = MemoryDriver::new();
        driver.save("ns/a", &json!(1), None).unwrap();
        driver.save("ns/b", &json!(2), None).unwrap();
        driver.save("other/c", &json!(3), None).unwrap();

        assert_eq!(driver.delete_prefix("ns/").unwrap(), 2);
        assert_eq!(driver.get("other/c").unwrap(), Some(json!(3)));
    }

    #[test]
    fn save_replaces_existing_value() {
        let driver = MemoryDriver::new();
        driver.save("k", &json!(1), None).unwrap();
        driver.save("k", &json!(2), None).unwrap();

        assert_eq!(driver.get("k").unwrap(), Some(json!(2)));
    }
}
