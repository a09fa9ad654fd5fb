//! Request-lifetime cache.
//!
//! In-memory storage scoped to a single host request. Nothing here persists
//! or crosses requests; it exists so expensive lookups inside one render
//! (field definitions, parsed settings) happen once.

use std::collections::HashMap;

use serde_json::Value;

const DEFAULT_NAMESPACE: &str = "__default__";

/// Namespaced in-memory key/value store for one request.
#[derive(Debug, Default)]
pub struct RequestCache {
    cache: HashMap<String, HashMap<String, Value>>,
    namespace: String,
}

impl RequestCache {
    /// Create an empty cache using the default namespace.
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Change the namespace used when calls do not pass one.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    fn resolve<'a>(&'a self, namespace: Option<&'a str>) -> &'a str {
        namespace.unwrap_or(&self.namespace)
    }

    /// Store a value, replacing any existing entry.
    pub fn set(&mut self, key: &str, value: Value, namespace: Option<&str>) {
        let namespace = self.resolve(namespace).to_string();
        self.cache
            .entry(namespace)
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Append a value to a collection entry, creating the collection if absent.
    ///
    /// A scalar already stored under `key` is replaced by a one-element
    /// collection before the append.
    pub fn add(&mut self, key: &str, value: Value, namespace: Option<&str>) {
        let namespace = self.resolve(namespace).to_string();
        let entry = self
            .cache
            .entry(namespace)
            .or_default()
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));

        match entry {
            Value::Array(items) => items.push(value),
            other => *other = Value::Array(vec![other.take(), value]),
        }
    }

    /// Fetch a value, `None` on miss.
    pub fn get(&self, key: &str, namespace: Option<&str>) -> Option<&Value> {
        self.cache.get(self.resolve(namespace))?.get(key)
    }

    /// Every entry stored under `namespace`, `None` if the namespace is empty.
    pub fn get_collection(&self, namespace: &str) -> Option<&HashMap<String, Value>> {
        self.cache.get(namespace)
    }

    /// Drop a whole namespace.
    pub fn delete_collection(&mut self, namespace: &str) {
        self.cache.remove(namespace);
    }

    /// Remove a key.
    ///
    /// Keys ending in `/` are treated as a prefix: `foo/` removes every key
    /// starting with `foo/`.
    pub fn delete(&mut self, key: &str, namespace: Option<&str>) {
        let namespace = self.resolve(namespace).to_string();
        let Some(entries) = self.cache.get_mut(&namespace) else {
            return;
        };

        if key.ends_with('/') {
            entries.retain(|stored, _| !stored.starts_with(key));
        } else {
            entries.remove(key);
        }
    }

    /// Drop everything in every namespace.
    pub fn purge(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get_default_namespace() {
        let mut cache = RequestCache::new();
        cache.set("k", json!("v"), None);

        assert_eq!(cache.get("k", None), Some(&json!("v")));
    }

    #[test]
    fn explicit_namespace_wins_over_default() {
        let mut cache = RequestCache::new();
        cache.set("k", json!(1), Some("fields"));

        assert_eq!(cache.get("k", None), None);
        assert_eq!(cache.get("k", Some("fields")), Some(&json!(1)));
    }

    #[test]
    fn set_namespace_changes_default() {
        let mut cache = RequestCache::new();
        cache.set_namespace("fields");
        cache.set("k", json!(1), None);

        assert_eq!(cache.get("k", Some("fields")), Some(&json!(1)));
    }

    #[test]
    fn add_builds_a_collection() {
        let mut cache = RequestCache::new();
        cache.add("items", json!("a"), None);
        cache.add("items", json!("b"), None);

        assert_eq!(cache.get("items", None), Some(&json!(["a", "b"])));
    }

    #[test]
    fn add_over_scalar_wraps_it() {
        let mut cache = RequestCache::new();
        cache.set("items", json!("a"), None);
        cache.add("items", json!("b"), None);

        assert_eq!(cache.get("items", None), Some(&json!(["a", "b"])));
    }

    #[test]
    fn get_collection_returns_namespace_entries() {
        let mut cache = RequestCache::new();
        cache.set("a", json!(1), Some("fields"));
        cache.set("b", json!(2), Some("fields"));

        let collection = cache.get_collection("fields").unwrap();
        assert_eq!(collection.len(), 2);
        assert!(cache.get_collection("empty").is_none());
    }

    #[test]
    fn delete_collection_drops_namespace() {
        let mut cache = RequestCache::new();
        cache.set("a", json!(1), Some("fields"));
        cache.delete_collection("fields");

        assert!(cache.get_collection("fields").is_none());
    }

    #[test]
    fn delete_by_exact_key() {
        let mut cache = RequestCache::new();
        cache.set("a", json!(1), None);
        cache.delete("a", None);

        assert_eq!(cache.get("a", None), None);
    }

    #[test]
    fn delete_trailing_slash_removes_prefix() {
        let mut cache = RequestCache::new();
        cache.set("foo/bar", json!(1), None);
        cache.set("foo/baz", json!(2), None);
        cache.set("other", json!(3), None);

        cache.delete("foo/", None);

        assert_eq!(cache.get("foo/bar", None), None);
        assert_eq!(cache.get("foo/baz", None), None);
        assert_eq!(cache.get("other", None), Some(&json!(3)));
    }

    #[test]
    fn purge_clears_all_namespaces() {
        let mut cache = RequestCache::new();
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), Some("fields"));

        cache.purge();

        assert_eq!(cache.get("a", None), None);
        assert_eq!(cache.get("b", Some("fields")), None);
    }
}
