// 🌍 Country Reference - ISO2 code → canonical country name
//
// Loaded once at startup, then shared read-only (Arc) across requests.
// Never re-read per call.

use crate::error::{RegistryError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Bundled reference file, compiled into the binary
const BUNDLED_COUNTRIES: &str = include_str!("../data/countries-iso-2-codes.json");

/// One entry of the reference file: `{"Name": "Chile", "Code": "CL"}`
#[derive(Debug, Clone, Deserialize)]
pub struct Country {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Code")]
    pub code: String,
}

// ============================================================================
// COUNTRY REFERENCE
// ============================================================================

/// Immutable ISO2 → name lookup table.
#[derive(Debug, Clone)]
pub struct CountryReference {
    by_code: HashMap<String, String>,
}

impl CountryReference {
    /// Build from a list of countries; codes are upper-cased, later duplicates win.
    pub fn from_countries(countries: Vec<Country>) -> Self {
        let by_code = countries
            .into_iter()
            .map(|c| (c.code.trim().to_uppercase(), c.name))
            .collect();

        CountryReference { by_code }
    }

    /// Parse the JSON array format.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let countries: Vec<Country> = serde_json::from_str(json)
            .map_err(|e| RegistryError::Country(format!("malformed country data: {}", e)))?;

        Ok(Self::from_countries(countries))
    }

    /// Load from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::Country(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&json)
    }

    /// The reference data shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_COUNTRIES)
    }

    /// Load from `path` if given, otherwise the bundled data.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    /// Case-insensitive membership check
    pub fn is_valid(&self, iso2: &str) -> bool {
        self.by_code.contains_key(&iso2.to_uppercase())
    }

    /// Canonical name for an ISO2 code
    pub fn name_for(&self, iso2: &str) -> Option<&str> {
        self.by_code.get(&iso2.to_uppercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_reference_loads() {
        let countries = CountryReference::bundled().unwrap();

        assert_eq!(countries.len(), 249);
        assert_eq!(countries.name_for("CL"), Some("Chile"));
        assert_eq!(countries.name_for("AL"), Some("Albania"));
        assert_eq!(countries.name_for("PL"), Some("Poland"));
        assert_eq!(countries.name_for("TN"), Some("Tunisia"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let countries = CountryReference::bundled().unwrap();

        assert!(countries.is_valid("cl"));
        assert!(countries.is_valid("Cl"));
        assert_eq!(countries.name_for("cl"), Some("Chile"));
    }

    #[test]
    fn test_unknown_codes() {
        let countries = CountryReference::bundled().unwrap();

        assert!(!countries.is_valid("ABCD"));
        assert!(!countries.is_valid("XX"));
        assert!(!countries.is_valid(""));
        assert_eq!(countries.name_for("ZZ"), None);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[{"Name": "Chile", "Code": "cl"}, {"Name": "Albania", "Code": "AL"}]"#;
        let countries = CountryReference::from_json_str(json).unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries.name_for("CL"), Some("Chile"));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = CountryReference::from_json_str(r#"{"Name": "Chile"}"#).unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"Name": "Tunisia", "Code": "TN"}}]"#).unwrap();

        let countries = CountryReference::load(Some(file.path())).unwrap();
        assert_eq!(countries.name_for("TN"), Some("Tunisia"));

        let missing = CountryReference::from_path(Path::new("/nonexistent/countries.json"));
        assert!(missing.is_err());
    }
}
