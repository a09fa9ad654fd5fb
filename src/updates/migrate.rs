//! Versioned migration discovery and execution.
//!
//! Add-ons ship an updates directory whose file names encode the version
//! they migrate to (`up_<major>_<minor>_<patch>.<ext>`, zero-padded integers
//! allowed). [`Updater`] scans that directory for versions newer than the
//! installed one and runs the matching registered [`Migration`]s in order.
//!
//! Migrations mostly register and deregister host hooks; they do so through
//! the [`HookRegistry`] seam so the host's extensions table stays opaque.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use regex::Regex;

use super::compare_versions;
use crate::error::{BaseeError, Result};

/// A hook row as the host's extensions table stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub class: String,
    pub method: String,
    pub hook: String,
    pub settings: String,
    pub priority: u32,
    pub version: String,
    pub enabled: bool,
}

/// Shared fields stamped onto every hook a migration registers.
#[derive(Debug, Clone)]
pub struct HookTemplate {
    pub class: String,
    pub settings: String,
    pub priority: u32,
    pub version: String,
    pub enabled: bool,
}

impl HookTemplate {
    /// Template for `class` at `version` with the usual defaults.
    pub fn new(class: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            settings: String::new(),
            priority: 10,
            version: version.into(),
            enabled: true,
        }
    }

    /// Check the template is complete enough to stamp hooks from.
    pub fn validate(&self) -> Result<()> {
        if self.class.is_empty() {
            return Err(BaseeError::InvalidHookTemplate {
                message: "class must not be empty".into(),
            });
        }
        if self.version.is_empty() {
            return Err(BaseeError::InvalidHookTemplate {
                message: "version must not be empty".into(),
            });
        }

        Ok(())
    }
}

/// The host's hook/extension table.
pub trait HookRegistry {
    /// Whether a row for `(class, hook)` already exists.
    fn has_hook(&self, class: &str, hook: &str) -> bool;

    /// Insert a row.
    fn insert(&mut self, hook: Hook) -> Result<()>;

    /// Delete rows for `class` whose hook name is in `hooks`.
    fn remove_by_hook(&mut self, class: &str, hooks: &[&str]) -> Result<usize>;

    /// Delete rows for `class` whose method name is in `methods`.
    fn remove_by_method(&mut self, class: &str, methods: &[&str]) -> Result<usize>;
}

/// In-memory [`HookRegistry`] for tests and hosts without an extensions table.
#[derive(Debug, Default)]
pub struct MemoryHookRegistry {
    hooks: Vec<Hook>,
}

impl MemoryHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All registered rows.
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }
}

impl HookRegistry for MemoryHookRegistry {
    fn has_hook(&self, class: &str, hook: &str) -> bool {
        self.hooks
            .iter()
            .any(|h| h.class == class && h.hook == hook)
    }

    fn insert(&mut self, hook: Hook) -> Result<()> {
        self.hooks.push(hook);
        Ok(())
    }

    fn remove_by_hook(&mut self, class: &str, hooks: &[&str]) -> Result<usize> {
        let before = self.hooks.len();
        self.hooks
            .retain(|h| !(h.class == class && hooks.contains(&h.hook.as_str())));
        Ok(before - self.hooks.len())
    }

    fn remove_by_method(&mut self, class: &str, methods: &[&str]) -> Result<usize> {
        let before = self.hooks.len();
        self.hooks
            .retain(|h| !(h.class == class && methods.contains(&h.method.as_str())));
        Ok(before - self.hooks.len())
    }
}

/// What a migration sees while running.
pub struct MigrationContext<'a> {
    registry: &'a mut dyn HookRegistry,
    hook_template: Option<&'a HookTemplate>,
}

impl<'a> MigrationContext<'a> {
    /// Register hooks, stamping each from the configured template.
    ///
    /// `specs` pairs are `(hook, method)`. Rows that already exist for the
    /// template's class are left untouched.
    pub fn add_hooks(&mut self, specs: &[(&str, &str)]) -> Result<()> {
        if specs.is_empty() {
            return Ok(());
        }

        let template = self
            .hook_template
            .ok_or_else(|| BaseeError::InvalidHookTemplate {
                message: "no hook template configured".into(),
            })?;

        for (hook, method) in specs {
            if self.registry.has_hook(&template.class, hook) {
                continue;
            }

            self.registry.insert(Hook {
                class: template.class.clone(),
                method: method.to_string(),
                hook: hook.to_string(),
                settings: template.settings.clone(),
                priority: template.priority,
                version: template.version.clone(),
                enabled: template.enabled,
            })?;
        }

        Ok(())
    }

    /// Deregister hooks for `class` by hook name.
    pub fn remove_hooks(&mut self, class: &str, hooks: &[&str]) -> Result<usize> {
        if hooks.is_empty() {
            return Ok(0);
        }

        self.registry.remove_by_hook(class, hooks)
    }

    /// Deregister hooks for `class` by method name.
    pub fn remove_hooks_by_method(&mut self, class: &str, methods: &[&str]) -> Result<usize> {
        if methods.is_empty() {
            return Ok(0);
        }

        self.registry.remove_by_method(class, methods)
    }
}

/// One versioned migration step.
pub trait Migration {
    /// The dotted version this step migrates to.
    fn version(&self) -> &str;

    /// Apply the migration.
    fn run(&self, ctx: &mut MigrationContext<'_>) -> Result<()>;
}

/// Discovers pending migration versions and runs their handlers.
pub struct Updater {
    file_path: PathBuf,
    hook_template: Option<HookTemplate>,
    migrations: HashMap<String, Box<dyn Migration>>,
    pending: Vec<String>,
}

impl Updater {
    /// Create an updater scanning `file_path` for migration files.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            hook_template: None,
            migrations: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Configure the hook template stamped onto registered hooks.
    pub fn with_hook_template(mut self, template: HookTemplate) -> Result<Self> {
        template.validate()?;
        self.hook_template = Some(template);
        Ok(self)
    }

    /// Register the handler for one migration version.
    pub fn register(mut self, migration: Box<dyn Migration>) -> Self {
        self.migrations
            .insert(migration.version().to_string(), migration);
        self
    }

    /// Versions collected by the last [`fetch_updates`](Self::fetch_updates).
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// The registered handler for `version`, if any.
    pub fn migration(&self, version: &str) -> Option<&dyn Migration> {
        self.migrations.get(version).map(|m| m.as_ref())
    }

    /// Scan the migration directory for versions newer than `current_version`.
    ///
    /// With `fetch_all` false only the single highest qualifying version is
    /// kept (apply-one-at-a-time mode); with `fetch_all` true every
    /// qualifying version is kept in increasing order.
    pub fn fetch_updates(&mut self, current_version: &str, fetch_all: bool) -> Result<&[String]> {
        let entries = fs::read_dir(&self.file_path).map_err(|_| {
            BaseeError::MigrationPathUnreadable {
                path: self.file_path.clone(),
            }
        })?;

        let pattern = Regex::new(r"^up_0*(\d+)_0*(\d+)_0*(\d+)\.\w+$").expect("valid regex");

        let mut file_names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        file_names.sort();

        let mut qualifying = Vec::new();

        for name in &file_names {
            let Some(captures) = pattern.captures(name) else {
                continue;
            };

            let version = format!("{}.{}.{}", &captures[1], &captures[2], &captures[3]);

            if compare_versions(&version, current_version) == std::cmp::Ordering::Greater {
                qualifying.push(version);
            }
        }

        qualifying.sort_by(|a, b| compare_versions(a, b));
        qualifying.dedup();

        self.pending = if fetch_all {
            qualifying
        } else {
            qualifying.into_iter().last().into_iter().collect()
        };

        Ok(&self.pending)
    }

    /// Run every pending migration in order against `registry`.
    pub fn run_updates(&self, registry: &mut dyn HookRegistry) -> Result<()> {
        for version in &self.pending {
            let migration = self.migrations.get(version).ok_or_else(|| {
                BaseeError::MigrationNotRegistered {
                    version: version.clone(),
                }
            })?;

            tracing::debug!("Running migration {}", version);

            let mut ctx = MigrationContext {
                registry: &mut *registry,
                hook_template: self.hook_template.as_ref(),
            };
            migration.run(&mut ctx)?;
        }

        Ok(())
    }
}
