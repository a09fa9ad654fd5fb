//! Remote latest-version lookup.
//!
//! Same shape as the license check minus the banners: ask a versions
//! endpoint what the newest release of an add-on is, cache the answer, and
//! fail silently to the cached value when the endpoint is unreachable.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::{Scope, ScopedCache};

/// Connect timeout for the versions endpoint.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Cached remote version lookup for one add-on.
pub struct VersionCheck {
    addon: String,
    base_url: String,
    cache: ScopedCache,
}

impl VersionCheck {
    /// Create a lookup for `addon` against a versions endpoint.
    ///
    /// `base_url` is expected to end with `/`; the add-on name and route are
    /// appended to it.
    pub fn new(addon: impl Into<String>, base_url: impl Into<String>, cache: ScopedCache) -> Self {
        Self {
            addon: addon.into(),
            base_url: base_url.into(),
            cache: cache.with_default_ttl(crate::ping::DEFAULT_TTL_SECS),
        }
    }

    /// The add-on this lookup is for.
    pub fn addon(&self) -> &str {
        &self.addon
    }

    /// Latest release info for the add-on, from cache or the endpoint.
    pub fn fetch_latest(&self) -> Option<Value> {
        let url = format!("{}latest/{}", self.base_url, self.addon);
        self.fetch_cached(&url, |response| Some(response))
    }

    /// All published releases for the add-on.
    pub fn fetch_all(&self) -> Option<Value> {
        let url = format!("{}{}", self.base_url, self.addon);
        self.fetch_cached(&url, |response| response.get("versions").cloned())
    }

    fn cache_key(&self, url: &str) -> String {
        let hash = Sha256::digest(url.as_bytes());
        format!("{}/version/{}", self.addon, hex::encode(&hash[..16]))
    }

    fn fetch_cached(&self, url: &str, extract: impl Fn(Value) -> Option<Value>) -> Option<Value> {
        let key = self.cache_key(url);

        match self.cache.get(&key, Scope::Global) {
            Ok(Some(cached)) => return Some(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!("Version cache read failed: {}", e),
        }

        match self.request(url).map(extract) {
            Ok(Some(response)) => {
                if let Err(e) = self.cache.save(&key, &response, Scope::Global) {
                    tracing::warn!("Version cache write failed: {}", e);
                }
                Some(response)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Version check failed: {:#}", e);
                None
            }
        }
    }

    fn request(&self, url: &str) -> anyhow::Result<Value> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        client
            .get(url)
            .header("Cache-Control", "no-cache")
            .send()
            .with_context(|| format!("Failed to reach versions endpoint {}", url))?
            .json()
            .context("Failed to parse versions response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryDriver, ScopedCache};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn check(base_url: String) -> VersionCheck {
        let cache = ScopedCache::new(Arc::new(MemoryDriver::new()), "publisher");
        VersionCheck::new("publisher", base_url, cache)
    }

    #[test]
    fn fetch_latest_hits_endpoint_once() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/versions/latest/publisher");
            then.status(200)
                .json_body(json!({ "version": "3.2.0", "released": "2024-01-10" }));
        });

        let check = check(server.url("/versions/"));

        let first = check.fetch_latest().unwrap();
        let second = check.fetch_latest().unwrap();

        mock.assert_hits(1);
        assert_eq!(first["version"], "3.2.0");
        assert_eq!(second, first);
    }

    #[test]
    fn fetch_all_extracts_versions_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/versions/publisher");
            then.status(200).json_body(json!({
                "versions": [{ "version": "3.1.0" }, { "version": "3.2.0" }]
            }));
        });

        let check = check(server.url("/versions/"));
        let all = check.fetch_all().unwrap();

        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[test]
    fn fetch_all_without_versions_field_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/versions/publisher");
            then.status(200).json_body(json!({ "unexpected": true }));
        });

        assert!(check(server.url("/versions/")).fetch_all().is_none());
    }

    #[test]
    fn unreachable_endpoint_returns_none() {
        assert!(check("http://127.0.0.1:1/versions/".into())
            .fetch_latest()
            .is_none());
    }

    #[test]
    fn latest_and_all_use_distinct_cache_keys() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/versions/latest/publisher");
            then.status(200).json_body(json!({ "version": "3.2.0" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/versions/publisher");
            then.status(200)
                .json_body(json!({ "versions": [{ "version": "3.2.0" }] }));
        });

        let check = check(server.url("/versions/"));

        assert!(check.fetch_latest().is_some());
        assert!(check.fetch_all().is_some());
    }
}
