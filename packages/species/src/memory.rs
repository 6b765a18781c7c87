//! In-memory species catalog.
//!
//! Records are matched by common name ignoring case and surrounding
//! whitespace, like the hosted catalog's `ilike` filter. Used for offline
//! runs and tests.

use std::collections::BTreeMap;
use std::path::Path;

use aquastock_species_models::species_key;
use async_trait::async_trait;
use serde_json::Value;

use crate::parsing::record_name;
use crate::{SpeciesDataSource, SpeciesError};

/// A species catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySpeciesSource {
    records: BTreeMap<String, Value>,
}

impl MemorySpeciesSource {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Builds a catalog from raw records, keyed by each record's
    /// `common_name` (or `commonName` / `name`). Records without a name
    /// are skipped.
    #[must_use]
    pub fn from_records(records: Vec<Value>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            match record_name(&record).map(species_key) {
                Some(key) => {
                    catalog.records.insert(key, record);
                }
                None => log::warn!("skipping species record without a name: {record}"),
            }
        }
        catalog
    }

    /// Parses a JSON array of raw records.
    ///
    /// # Errors
    ///
    /// Returns [`SpeciesError::Json`] if `json` is not a JSON array.
    pub fn from_json_str(json: &str) -> Result<Self, SpeciesError> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Loads a JSON array of raw records from a file.
    ///
    /// # Errors
    ///
    /// Returns [`SpeciesError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, SpeciesError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} species records from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Inserts or replaces the record stored under `common_name` in any
    /// casing.
    pub fn insert(&mut self, common_name: &str, record: Value) {
        self.records.insert(species_key(common_name), record);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SpeciesDataSource for MemorySpeciesSource {
    async fn fetch(&self, common_name: &str) -> Result<Option<Value>, SpeciesError> {
        Ok(self.records.get(&species_key(common_name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keys_records_by_name_and_skips_unnamed() {
        let catalog = MemorySpeciesSource::from_records(vec![
            json!({ "common_name": "Guppy", "max_size": 5 }),
            json!({ "max_size": 5 }),
        ]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn rejects_non_array_json() {
        assert!(MemorySpeciesSource::from_json_str(r#"{"Guppy": {}}"#).is_err());
    }

    #[tokio::test]
    async fn fetch_ignores_case() {
        let catalog = MemorySpeciesSource::from_json_str(
            r#"[{ "commonName": "Neon tetra", "min_tank_size": 40 }]"#,
        )
        .unwrap();
        for name in ["Neon tetra", "NEON TETRA", "neon Tetra", " neon tetra "] {
            assert!(catalog.fetch(name).await.unwrap().is_some(), "{name}");
        }
        assert!(catalog.fetch("Cardinal Tetra").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_replaces_any_casing() {
        let mut catalog = MemorySpeciesSource::new();
        catalog.insert("Guppy", json!({ "max_size": 5 }));
        catalog.insert("GUPPY", json!({ "max_size": 6 }));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.fetch("guppy").await.unwrap(),
            Some(json!({ "max_size": 6 }))
        );
    }
}
