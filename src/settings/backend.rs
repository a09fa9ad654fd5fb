//! Settings table seam.
//!
//! The host owns the actual database. This trait is the row-level surface
//! the settings store needs: read everything, count matches for an upsert,
//! insert or update one row, and manage the table's lifecycle.

use super::value::SettingType;
use crate::error::Result;

/// One row of the settings table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRow {
    pub site_id: u32,
    pub key: String,
    pub val: String,
    pub kind: SettingType,
}

/// Row-oriented access to the settings table and the host's sites.
pub trait SettingsBackend {
    /// Whether the settings table has been created.
    fn table_exists(&self) -> bool;

    /// Every row of the table.
    fn all_rows(&self) -> Result<Vec<SettingRow>>;

    /// Ids of every installed site.
    fn site_ids(&self) -> Result<Vec<u32>>;

    /// How many rows match `(key, site_id)`.
    fn count_rows(&self, key: &str, site_id: u32) -> Result<usize>;

    /// Insert a new row.
    fn insert_row(&mut self, row: SettingRow) -> Result<()>;

    /// Update the row matching `(key, site_id)`.
    fn update_row(&mut self, key: &str, site_id: u32, val: &str, kind: SettingType) -> Result<()>;

    /// Create the settings table if it does not exist.
    fn create_table(&mut self) -> Result<()>;

    /// Drop the settings table and its rows.
    fn drop_table(&mut self) -> Result<()>;
}

/// In-memory [`SettingsBackend`] for tests and hosts without a database.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    created: bool,
    rows: Vec<SettingRow>,
    sites: Vec<u32>,
}

impl MemoryBackend {
    /// A backend with one site and no table yet.
    pub fn new() -> Self {
        Self {
            created: false,
            rows: Vec::new(),
            sites: vec![1],
        }
    }

    /// Replace the installed sites.
    pub fn with_sites(mut self, sites: impl Into<Vec<u32>>) -> Self {
        self.sites = sites.into();
        self
    }

    /// All stored rows, for assertions.
    pub fn rows(&self) -> &[SettingRow] {
        &self.rows
    }
}

impl SettingsBackend for MemoryBackend {
    fn table_exists(&self) -> bool {
        self.created
    }

    fn all_rows(&self) -> Result<Vec<SettingRow>> {
        Ok(self.rows.clone())
    }

    fn site_ids(&self) -> Result<Vec<u32>> {
        Ok(self.sites.clone())
    }

    fn count_rows(&self, key: &str, site_id: u32) -> Result<usize> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.key == key && row.site_id == site_id)
            .count())
    }

    fn insert_row(&mut self, row: SettingRow) -> Result<()> {
        self.rows.push(row);
        Ok(())
    }

    fn update_row(&mut self, key: &str, site_id: u32, val: &str, kind: SettingType) -> Result<()> {
        for row in &mut self.rows {
            if row.key == key && row.site_id == site_id {
                row.val = val.to_string();
                row.kind = kind;
            }
        }
        Ok(())
    }

    fn create_table(&mut self) -> Result<()> {
        self.created = true;
        Ok(())
    }

    fn drop_table(&mut self) -> Result<()> {
        self.created = false;
        self.rows.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_starts_absent() {
        let backend = MemoryBackend::new();
        assert!(!backend.table_exists());
    }

    #[test]
    fn create_and_drop_table() {
        let mut backend = MemoryBackend::new();
        backend.create_table().unwrap();
        assert!(backend.table_exists());

        backend
            .insert_row(SettingRow {
                site_id: 1,
                key: "mode".into(),
                val: "yes".into(),
                kind: SettingType::Boolean,
            })
            .unwrap();

        backend.drop_table().unwrap();
        assert!(!backend.table_exists());
        assert!(backend.rows().is_empty());
    }

    #[test]
    fn count_matches_key_and_site() {
        let mut backend = MemoryBackend::new();
        backend.create_table().unwrap();
        backend
            .insert_row(SettingRow {
                site_id: 1,
                key: "mode".into(),
                val: "a".into(),
                kind: SettingType::String,
            })
            .unwrap();

        assert_eq!(backend.count_rows("mode", 1).unwrap(), 1);
        assert_eq!(backend.count_rows("mode", 2).unwrap(), 0);
        assert_eq!(backend.count_rows("other", 1).unwrap(), 0);
    }

    #[test]
    fn update_rewrites_val_and_type() {
        let mut backend = MemoryBackend::new();
        backend.create_table().unwrap();
        backend
            .insert_row(SettingRow {
                site_id: 1,
                key: "mode".into(),
                val: "a".into(),
                kind: SettingType::String,
            })
            .unwrap();

        backend
            .update_row("mode", 1, "yes", SettingType::Boolean)
            .unwrap();

        assert_eq!(backend.rows()[0].val, "yes");
        assert_eq!(backend.rows()[0].kind, SettingType::Boolean);
    }
}
