//! Update plumbing for add-ons.
//!
//! This module provides:
//! - Dotted-version comparison shared across the crate
//! - Remote "latest version" checks with cached responses
//! - Discovery and execution of versioned migration scripts

pub mod migrate;
pub mod remote;

pub use migrate::{
    Hook, HookRegistry, HookTemplate, MemoryHookRegistry, Migration, MigrationContext, Updater,
};
pub use remote::VersionCheck;

use std::cmp::Ordering;

/// Compare two dotted version strings numerically component-wise.
///
/// Non-numeric components are skipped; a version with more numeric
/// components than an otherwise-equal prefix is the newer one, so
/// `1.2.1 > 1.2`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> { v.split('.').filter_map(|s| s.parse().ok()).collect() };

    let a_parts = parse(a);
    let b_parts = parse(b);

    for (x, y) in a_parts.iter().zip(b_parts.iter()) {
        match x.cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    a_parts.len().cmp(&b_parts.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_wise_comparison() {
        assert_eq!(compare_versions("1.2.1", "1.2.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.2.0", "1.2.1"), Ordering::Less);
        assert_eq!(compare_versions("1.2.0", "1.2.0"), Ordering::Equal);
    }

    #[test]
    fn numeric_not_lexicographic() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("10.0.0", "9.99.99"), Ordering::Greater);
    }

    #[test]
    fn longer_equal_prefix_is_newer() {
        assert_eq!(compare_versions("1.2.1", "1.2"), Ordering::Greater);
        assert_eq!(compare_versions("1.2", "1.2.1"), Ordering::Less);
    }

    #[test]
    fn non_numeric_components_are_skipped() {
        assert_eq!(compare_versions("1.2.beta", "1.2"), Ordering::Equal);
    }
}
