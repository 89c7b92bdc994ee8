// 📥 Bulk Importer - CSV → SWIFT code records
//
// More permissive than the registry's add path: rows are only
// normalized, never validated. The headquarter flag comes from the code alone.
// Re-running an import is safe because existing codes are skipped.

use crate::db::{Event, SwiftCodeStore};
use crate::error::{RegistryError, Result};
use crate::model::{ImportSummary, SwiftCodeRecord};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Actor recorded in the audit trail for imported rows
pub const IMPORT_ACTOR: &str = "csv_importer";

/// One row of the source sheet. Code type and time zone are read but unused.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "COUNTRY ISO2 CODE")]
    pub country_iso2: String,

    #[serde(rename = "SWIFT CODE")]
    pub swift_code: String,

    #[serde(rename = "CODE TYPE", default)]
    pub code_type: String,

    #[serde(rename = "NAME")]
    pub name: String,

    #[serde(rename = "ADDRESS")]
    pub address: String,

    #[serde(rename = "TOWN NAME", default)]
    pub town_name: Option<String>,

    #[serde(rename = "COUNTRY NAME")]
    pub country_name: String,

    #[serde(rename = "TIME ZONE", default)]
    pub time_zone: String,
}

impl CsvRow {
    /// Candidate record: normalized, headquarter flag derived, nothing rejected.
    pub fn into_record(self) -> SwiftCodeRecord {
        let town_name = self.town_name.filter(|t| !t.trim().is_empty());

        SwiftCodeRecord::new(
            &self.swift_code,
            &self.name,
            &self.address,
            town_name.as_deref(),
            &self.country_iso2,
            &self.country_name,
        )
        .normalized()
    }
}

/// Parse CSV (with header row) from any reader.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<SwiftCodeRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let row: CsvRow = result?;
        records.push(row.into_record());
    }

    Ok(records)
}

/// Parse a CSV file from disk.
pub fn load_csv(csv_path: &Path) -> Result<Vec<SwiftCodeRecord>> {
    let file = std::fs::File::open(csv_path).map_err(|e| {
        RegistryError::Io(format!("cannot open {}: {}", csv_path.display(), e))
    })?;

    parse_csv(file)
}

/// Insert every record whose code is not already stored, in one transaction.
pub fn import_records<S: SwiftCodeStore>(
    store: &S,
    records: &[SwiftCodeRecord],
) -> Result<ImportSummary> {
    store.atomically(|store| {
        let mut inserted = 0;
        let mut skipped = 0;

        for record in records {
            if store.exists_by_code(&record.swift_code)? {
                debug!(code = %record.swift_code, "skipping existing code");
                skipped += 1;
                continue;
            }

            store.save(record)?;
            store.append_event(&Event::swift_code_added(record, IMPORT_ACTOR))?;
            inserted += 1;
        }

        info!(inserted, skipped, total = records.len(), "bulk import finished");

        Ok(ImportSummary {
            message: "SWIFT codes imported from CSV.".to_string(),
            total_rows: records.len(),
            inserted,
            skipped,
        })
    })
}
