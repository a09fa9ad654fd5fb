//! Disk-backed cache driver.
//!
//! License and version pings need to outlive the request even when the host
//! has caching disabled, so this driver writes each entry to its own JSON
//! file under a root directory. File names are hashes of the cache key; the
//! original key is stored inside the entry for prefix deletes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::driver::CacheDriver;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    key: String,
    value: Value,
    cached_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }
}

/// [`CacheDriver`] persisting entries as JSON files.
pub struct FileDriver {
    root: PathBuf,
}

impl FileDriver {
    /// Create a driver rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory entries are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let hash = Sha256::digest(key.as_bytes());
        self.root.join(format!("{}.json", hex::encode(&hash[..16])))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {:?}", self.root))?;
        Ok(())
    }

    fn read_entry(&self, path: &Path) -> Option<FileEntry> {
        let json = fs::read_to_string(path).ok()?;
        serde_json::from_str(&json).ok()
    }

    fn entries(&self) -> Result<Vec<(PathBuf, FileEntry)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(entry) = self.read_entry(&path) {
                    found.push((path, entry));
                }
            }
        }

        Ok(found)
    }
}

impl CacheDriver for FileDriver {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.entry_path(key);

        let Some(entry) = self.read_entry(&path) else {
            return Ok(None);
        };

        if entry.is_expired() {
            let _ = fs::remove_file(&path);
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    fn save(&self, key: &str, value: &Value, ttl_seconds: Option<u64>) -> Result<()> {
        self.ensure_dir()?;

        let entry = FileEntry {
            key: key.to_string(),
            value: value.clone(),
            cached_at: Utc::now(),
            expires_at: ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64)),
        };

        let path = self.entry_path(key);
        let json = serde_json::to_string_pretty(&entry)
            .with_context(|| format!("Failed to serialize cache entry for {}", key))?;
        fs::write(&path, json)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);

        if path.exists() {
            fs::remove_file(&path)?;
            return Ok(true);
        }

        Ok(false)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;

        for (path, entry) in self.entries()? {
            if entry.key.starts_with(prefix) {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn save_and_get_round_trip() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("ns/global/status", &json!("valid"), None).unwrap();

        assert_eq!(
            driver.get("ns/global/status").unwrap(),
            Some(json!("valid"))
        );
    }

    #[test]
    fn missing_key_is_none() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        assert_eq!(driver.get("nope").unwrap(), None);
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("k", &json!(1), Some(0)).unwrap();

        assert_eq!(driver.get("k").unwrap(), None);
    }

    #[test]
    fn expired_entry_file_is_removed_on_read() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("k", &json!(1), Some(0)).unwrap();
        let path = driver.entry_path("k");
        assert!(path.exists());

        driver.get("k").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn delete_removes_file() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("k", &json!(1), None).unwrap();

        assert!(driver.delete("k").unwrap());
        assert!(!driver.delete("k").unwrap());
    }

    #[test]
    fn delete_prefix_uses_stored_keys() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("ns/a", &json!(1), None).unwrap();
        driver.save("ns/b", &json!(2), None).unwrap();
        driver.save("other/c", &json!(3), None).unwrap();

        assert_eq!(driver.delete_prefix("ns/").unwrap(), 2);
        assert_eq!(driver.get("other/c").unwrap(), Some(json!(3)));
    }

    #[test]
    fn entry_paths_are_deterministic() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        assert_eq!(driver.entry_path("key"), driver.entry_path("key"));
        assert_ne!(driver.entry_path("key"), driver.entry_path("other"));
    }

    #[test]
    fn corrupt_entry_reads_as_miss() {
        let temp = TempDir::new().unwrap();
        let driver = FileDriver::new(temp.path());

        driver.save("k", &json!(1), None).unwrap();
        fs::write(driver.entry_path("k"), "not json").unwrap();

        assert_eq!(driver.get("k").unwrap(), None);
    }
}
