// 🏦 SWIFT Code Record + response views
//
// The record is the only persisted entity. Views are what the registry hands
// back to callers; they never carry more than the operation promises.

use crate::validator;
use serde::{Deserialize, Serialize};

// ============================================================================
// RECORD
// ============================================================================

/// One bank identifier code and the institution it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwiftCodeRecord {
    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    pub address: String,

    #[serde(rename = "townName", default, skip_serializing_if = "Option::is_none")]
    pub town_name: Option<String>,

    /// Must agree with the code's `XXX` suffix
    #[serde(rename = "isHeadquarter", alias = "headquarter", default)]
    pub is_headquarter: bool,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,
}

impl SwiftCodeRecord {
    /// Build a record whose headquarter flag is derived from the code.
    pub fn new(
        swift_code: &str,
        bank_name: &str,
        address: &str,
        town_name: Option<&str>,
        country_iso2: &str,
        country_name: &str,
    ) -> Self {
        SwiftCodeRecord {
            swift_code: swift_code.to_string(),
            bank_name: bank_name.to_string(),
            address: address.to_string(),
            town_name: town_name.map(str::to_string),
            is_headquarter: validator::derived_is_headquarter(swift_code),
            country_iso2: country_iso2.to_string(),
            country_name: country_name.to_string(),
        }
    }

    /// Entity-level normalization: code and country fields upper-cased.
    pub fn normalized(mut self) -> Self {
        self.swift_code = validator::normalize(&self.swift_code);
        self.country_iso2 = self.country_iso2.to_uppercase();
        self.country_name = self.country_name.to_uppercase();
        self
    }

    /// First 8 characters, if this is an 11-character code
    pub fn base_code(&self) -> Option<&str> {
        validator::base_code(&self.swift_code)
    }
}

// ============================================================================
// VIEWS
// ============================================================================

/// Per-record view used in branch lists and country listings (no country name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwiftCodeSummary {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,
}

impl From<SwiftCodeRecord> for SwiftCodeSummary {
    fn from(record: SwiftCodeRecord) -> Self {
        Self {
            address: record.address,
            bank_name: record.bank_name,
            country_iso2: record.country_iso2,
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code,
        }
    }
}

/// Single-code lookup result.
///
/// `branches` is present only for headquarter codes; `message` only when a
/// headquarter has no branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwiftCodeDetail {
    pub address: String,

    #[serde(rename = "bankName")]
    pub bank_name: String,

    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "isHeadquarter")]
    pub is_headquarter: bool,

    #[serde(rename = "swiftCode")]
    pub swift_code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<SwiftCodeSummary>>,
}

impl From<SwiftCodeRecord> for SwiftCodeDetail {
    fn from(record: SwiftCodeRecord) -> Self {
        Self {
            address: record.address,
            bank_name: record.bank_name,
            country_iso2: record.country_iso2,
            country_name: record.country_name,
            is_headquarter: record.is_headquarter,
            swift_code: record.swift_code,
            message: None,
            branches: None,
        }
    }
}

/// All codes registered for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySwiftCodes {
    #[serde(rename = "countryISO2")]
    pub country_iso2: String,

    #[serde(rename = "countryName")]
    pub country_name: String,

    #[serde(rename = "swiftCodes")]
    pub swift_codes: Vec<SwiftCodeSummary>,
}

/// Plain confirmation or rejection body: `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of one bulk import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub message: String,
    pub total_rows: usize,
    pub inserted: usize,
    pub skipped: usize,
}
