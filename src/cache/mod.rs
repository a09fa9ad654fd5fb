//! Add-on caching layer.
//!
//! Three pieces live here:
//!
//! - [`CacheDriver`], the seam to whatever key/value store the host provides,
//!   with an in-process [`MemoryDriver`] and a disk-backed [`FileDriver`]
//! - [`ScopedCache`], a thin wrapper that prefixes keys with the add-on's
//!   namespace and a global/per-site scope segment
//! - [`RequestCache`], request-lifetime in-memory storage with collection
//!   semantics
//!
//! License and version pings must survive the host's "caching disabled"
//! configuration, which is why callers can swap a [`FileDriver`] in where the
//! host driver would be a no-op.

pub mod driver;
pub mod file;
pub mod request;

pub use driver::{CacheDriver, MemoryDriver};
pub use file::FileDriver;
pub use request::RequestCache;

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Visibility of a cached value across the host's sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Shared by every installed site.
    Global,
    /// Owned by one site.
    Site(u32),
}

impl Scope {
    fn segment(self) -> String {
        match self {
            Scope::Global => "global".to_string(),
            Scope::Site(id) => format!("site_{}", id),
        }
    }
}

/// Namespace/scope prefixing wrapper over a [`CacheDriver`].
///
/// Keys are laid out path-style as `namespace/scope/key` so a whole add-on
/// (or one scope of it) can be busted with a single prefix delete.
#[derive(Clone)]
pub struct ScopedCache {
    driver: Arc<dyn CacheDriver>,
    namespace: String,
    default_ttl: Option<u64>,
}

impl ScopedCache {
    /// Wrap `driver` with the add-on's `namespace`.
    pub fn new(driver: Arc<dyn CacheDriver>, namespace: impl Into<String>) -> Self {
        Self {
            driver,
            namespace: namespace.into(),
            default_ttl: None,
        }
    }

    /// Set the lifetime used when [`save`](Self::save) is called without one.
    pub fn with_default_ttl(mut self, ttl_seconds: u64) -> Self {
        self.default_ttl = Some(ttl_seconds);
        self
    }

    /// The add-on namespace all keys are prefixed with.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build the full driver key for `key` in `scope`.
    pub fn key_for(&self, key: &str, scope: Scope) -> String {
        format!("{}/{}/{}", self.namespace, scope.segment(), key)
    }

    /// Fetch a value, `None` on miss or expiry.
    pub fn get(&self, key: &str, scope: Scope) -> Result<Option<Value>> {
        self.driver.get(&self.key_for(key, scope))
    }

    /// Store a value with the default lifetime.
    pub fn save(&self, key: &str, value: &Value, scope: Scope) -> Result<()> {
        self.save_with_ttl(key, value, self.default_ttl, scope)
    }

    /// Store a value with an explicit lifetime, `None` meaning no expiry.
    pub fn save_with_ttl(
        &self,
        key: &str,
        value: &Value,
        ttl_seconds: Option<u64>,
        scope: Scope,
    ) -> Result<()> {
        self.driver.save(&self.key_for(key, scope), value, ttl_seconds)
    }

    /// Remove one key. Returns whether anything was removed.
    pub fn delete(&self, key: &str, scope: Scope) -> Result<bool> {
        self.driver.delete(&self.key_for(key, scope))
    }

    /// Remove every key in one scope of this namespace.
    pub fn delete_scope(&self, scope: Scope) -> Result<usize> {
        self.driver
            .delete_prefix(&format!("{}/{}/", self.namespace, scope.segment()))
    }

    /// Remove every key in this namespace across all scopes.
    pub fn delete_namespace(&self) -> Result<usize> {
        self.driver.delete_prefix(&format!("{}/", self.namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache() -> ScopedCache {
        ScopedCache::new(Arc::new(MemoryDriver::new()), "publisher")
    }

    #[test]
    fn keys_are_namespace_scope_key() {
        let cache = cache();
        assert_eq!(cache.key_for("status", Scope::Global), "publisher/global/status");
        assert_eq!(cache.key_for("status", Scope::Site(3)), "publisher/site_3/status");
    }

    #[test]
    fn get_returns_saved_value() {
        let cache = cache();
        cache.save("status", &json!("valid"), Scope::Global).unwrap();

        assert_eq!(
            cache.get("status", Scope::Global).unwrap(),
            Some(json!("valid"))
        );
    }

    #[test]
    fn scopes_do_not_collide() {
        let cache = cache();
        cache.save("k", &json!(1), Scope::Site(1)).unwrap();
        cache.save("k", &json!(2), Scope::Site(2)).unwrap();

        assert_eq!(cache.get("k", Scope::Site(1)).unwrap(), Some(json!(1)));
        assert_eq!(cache.get("k", Scope::Site(2)).unwrap(), Some(json!(2)));
        assert_eq!(cache.get("k", Scope::Global).unwrap(), None);
    }

    #[test]
    fn delete_scope_leaves_other_scopes() {
        let cache = cache();
        cache.save("a", &json!(1), Scope::Site(1)).unwrap();
        cache.save("b", &json!(2), Scope::Site(1)).unwrap();
        cache.save("a", &json!(3), Scope::Global).unwrap();

        let removed = cache.delete_scope(Scope::Site(1)).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.get("a", Scope::Site(1)).unwrap(), None);
        assert_eq!(cache.get("a", Scope::Global).unwrap(), Some(json!(3)));
    }

    #[test]
    fn delete_namespace_clears_everything() {
        let cache = cache();
        cache.save("a", &json!(1), Scope::Site(1)).unwrap();
        cache.save("b", &json!(2), Scope::Global).unwrap();

        assert_eq!(cache.delete_namespace().unwrap(), 2);
        assert_eq!(cache.get("a", Scope::Site(1)).unwrap(), None);
        assert_eq!(cache.get("b", Scope::Global).unwrap(), None);
    }

    #[test]
    fn namespaces_are_isolated() {
        let driver: Arc<dyn CacheDriver> = Arc::new(MemoryDriver::new());
        let a = ScopedCache::new(driver.clone(), "addon_a");
        let b = ScopedCache::new(driver, "addon_b");

        a.save("k", &json!("a"), Scope::Global).unwrap();
        b.save("k", &json!("b"), Scope::Global).unwrap();
        a.delete_namespace().unwrap();

        assert_eq!(a.get("k", Scope::Global).unwrap(), None);
        assert_eq!(b.get("k", Scope::Global).unwrap(), Some(json!("b")));
    }
}
