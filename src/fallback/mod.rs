//! Embedded fallback dataset
//!
//! A small hand-authored set of records used only when the initial bulk
//! listing call fails, so dependent surfaces never observe an empty state.
//! The entries cover a representative cross-section of types for degraded
//! and offline testing.

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::Pokemon;

/// Embedded dataset
const CATALOG_JSON: &str = include_str!("starter_pokemon.json");

/// Global catalog instance (loaded once)
static CATALOG: Lazy<Result<FallbackCatalog, FallbackError>> =
    Lazy::new(|| FallbackCatalog::from_json(CATALOG_JSON));

/// Raw catalog structure for deserialization
#[derive(Debug, Deserialize)]
struct RawCatalog {
    schema_version: String,
    #[allow(dead_code)]
    description: String,
    pokemon: Vec<Pokemon>,
}

/// Hand-authored offline dataset.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    schema_version: String,
    entries: Vec<Pokemon>,
}

impl FallbackCatalog {
    /// Load the embedded catalog.
    ///
    /// This is a singleton operation - the catalog is parsed once and
    /// cached for the process lifetime.
    pub fn load() -> Result<&'static Self, &'static FallbackError> {
        CATALOG.as_ref()
    }

    /// Parse a catalog from JSON.
    fn from_json(json: &str) -> Result<Self, FallbackError> {
        let raw: RawCatalog = serde_json::from_str(json)
            .map_err(|e| FallbackError::ParseError(format!("failed to parse catalog: {e}")))?;

        for pokemon in &raw.pokemon {
            pokemon
                .validate()
                .map_err(FallbackError::InvalidEntry)?;
        }

        Ok(Self {
            schema_version: raw.schema_version,
            entries: raw.pokemon,
        })
    }

    /// Schema version of the embedded data.
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// All catalog entries, in ascending id order.
    pub fn entries(&self) -> &[Pokemon] {
        &self.entries
    }

    /// Look up one entry by id.
    pub fn get_by_id(&self, id: u32) -> Option<&Pokemon> {
        self.entries.iter().find(|p| p.id == id)
    }
}

/// Errors that can occur when loading the fallback catalog
#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    /// Failed to parse the embedded JSON
    #[error("fallback catalog parse error: {0}")]
    ParseError(String),

    /// An entry failed record validation
    #[error("invalid fallback entry: {0}")]
    InvalidEntry(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_loads() {
        let catalog = FallbackCatalog::load().unwrap();
        assert!(catalog.entries().len() >= 10);
        assert_eq!(catalog.schema_version(), "1.0");
    }

    #[test]
    fn test_entries_are_sorted_and_unique() {
        let catalog = FallbackCatalog::load().unwrap();
        let ids: Vec<u32> = catalog.entries().iter().map(|p| p.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_covers_a_type_cross_section() {
        let catalog = FallbackCatalog::load().unwrap();
        let types: HashSet<&str> = catalog
            .entries()
            .iter()
            .flat_map(|p| p.types.iter().map(|t| t.type_ref.name.as_str()))
            .collect();
        // Degraded-mode tests need more than a couple of type categories.
        assert!(types.len() >= 8, "only {} types covered", types.len());
    }

    #[test]
    fn test_get_by_id() {
        let catalog = FallbackCatalog::load().unwrap();
        assert_eq!(
            catalog.get_by_id(25).map(|p| p.name.as_str()),
            Some("pikachu")
        );
        assert!(catalog.get_by_id(9999).is_none());
    }
}
