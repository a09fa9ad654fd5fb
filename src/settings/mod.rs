//! Namespaced key/value settings store.
//!
//! Settings live in one table keyed by `(site_id, key)`. Site id `0` holds
//! global overrides that win over per-site values on every site. Values are
//! typed text columns decoded through [`SettingValue`].
//!
//! Add-ons declare two key sets up front: per-site defaults, and global
//! keys whose rows always live under site `0` (install metadata, the
//! license key). [`SettingStore::save`] only touches keys from those sets,
//! so a form that posts a page's worth of fields never clobbers the rest.

pub mod backend;
pub mod value;

pub use backend::{MemoryBackend, SettingRow, SettingsBackend};
pub use value::{SettingType, SettingValue};

use std::collections::HashMap;

use crate::error::{BaseeError, Result};

type SettingMap = HashMap<String, SettingValue>;

/// Settings store for one add-on.
pub struct SettingStore {
    backend: Box<dyn SettingsBackend>,
    site_id: u32,
    default_settings: SettingMap,
    global_settings: SettingMap,
    settings: Option<HashMap<u32, SettingMap>>,
}

impl SettingStore {
    /// Create a store for the site currently being served.
    pub fn new(backend: Box<dyn SettingsBackend>, site_id: u32) -> Self {
        Self {
            backend,
            site_id,
            default_settings: HashMap::new(),
            global_settings: HashMap::new(),
            settings: None,
        }
    }

    /// Declare per-site keys and their default values.
    pub fn with_default_settings(
        mut self,
        defaults: impl IntoIterator<Item = (String, SettingValue)>,
    ) -> Self {
        self.default_settings.extend(defaults);
        self
    }

    /// Declare keys stored globally (site id `0`) and their defaults.
    pub fn with_global_settings(
        mut self,
        globals: impl IntoIterator<Item = (String, SettingValue)>,
    ) -> Self {
        self.global_settings.extend(globals);
        self
    }

    /// Whether `key` is declared global.
    pub fn is_global_key(&self, key: &str) -> bool {
        self.global_settings.contains_key(key)
    }

    /// Every declared key with its default, globals winning on conflict.
    pub fn all_known_settings(&self) -> SettingMap {
        let mut known = self.default_settings.clone();
        known.extend(
            self.global_settings
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        known
    }

    /// Load and merge all settings rows.
    ///
    /// A missing table is a silent no-op: add-ons installed before this
    /// store existed upgrade through a migration that creates it.
    pub fn load(&mut self) -> Result<()> {
        if !self.backend.table_exists() {
            return Ok(());
        }

        let mut db_settings: HashMap<u32, SettingMap> = HashMap::new();
        let mut global_overrides: SettingMap = HashMap::new();

        for row in self.backend.all_rows()? {
            let value = SettingValue::decode(&row.val, row.kind);

            if row.site_id == 0 {
                global_overrides.insert(row.key.clone(), value.clone());
            }

            db_settings.entry(row.site_id).or_default().insert(row.key, value);
        }

        let mut settings = HashMap::new();

        for site_id in self.backend.site_ids()? {
            let mut merged = self.default_settings.clone();

            if let Some(stored) = db_settings.get(&site_id) {
                merged.extend(stored.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            // Global rows win over per-site values on every site.
            merged.extend(
                global_overrides
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );

            // Change yes/no scalars to real flags.
            let merged = merged
                .into_iter()
                .map(|(k, v)| (k, v.normalized()))
                .collect();

            settings.insert(site_id, merged);
        }

        self.settings = Some(settings);

        Ok(())
    }

    /// One setting for a site, lazily loading on first access.
    ///
    /// `None` when settings were never persisted for this add-on.
    pub fn get(&mut self, key: &str, site_id: Option<u32>) -> Result<Option<SettingValue>> {
        if self.settings.is_none() {
            self.load()?;
        }

        let Some(settings) = &self.settings else {
            return Ok(None);
        };

        let site_id = site_id.unwrap_or(self.site_id);

        Ok(settings
            .get(&site_id)
            .and_then(|site| site.get(key))
            .cloned())
    }

    /// Every merged setting for a site, empty when never loaded.
    pub fn get_all(&mut self, site_id: Option<u32>) -> Result<SettingMap> {
        if self.settings.is_none() {
            self.load()?;
        }

        let site_id = site_id.unwrap_or(self.site_id);

        Ok(self
            .settings
            .as_ref()
            .and_then(|settings| settings.get(&site_id))
            .cloned()
            .unwrap_or_default())
    }

    /// Persist submitted values for declared keys.
    ///
    /// Only keys present in `submitted` are written, so partial forms leave
    /// the rest of the table alone. Global keys upsert against site `0`
    /// regardless of the current site. Keys whose upsert matched more than
    /// one existing row are reported in the error.
    pub fn save(&mut self, submitted: &SettingMap) -> Result<()> {
        let mut failed: Vec<String> = Vec::new();

        for key in self.all_known_settings().into_keys() {
            let Some(value) = submitted.get(&key) else {
                continue;
            };

            let (val, kind) = value.storage();
            let site_id = if self.is_global_key(&key) { 0 } else { self.site_id };

            match self.backend.count_rows(&key, site_id)? {
                0 => self.backend.insert_row(SettingRow {
                    site_id,
                    key: key.clone(),
                    val,
                    kind,
                })?,
                1 => self.backend.update_row(&key, site_id, &val, kind)?,
                _ => failed.push(key),
            }
        }

        // Force a re-read so the merged view reflects what was written.
        self.settings = None;

        if !failed.is_empty() {
            failed.sort();
            return Err(BaseeError::SettingsSaveFailed { keys: failed });
        }

        Ok(())
    }

    /// Create the settings table if needed.
    pub fn create_table(&mut self) -> Result<()> {
        self.backend.create_table()
    }

    /// Drop the settings table; used by uninstall routines.
    pub fn drop_table(&mut self) -> Result<()> {
        self.backend.drop_table()
    }
}
