// 📚 Registry Service - the five user-facing operations
//
// Each operation is an ordered chain of Result-returning checks. The first
// failing check decides the rejection; later checks never run.

use crate::countries::CountryReference;
use crate::db::{Event, SwiftCodeStore};
use crate::error::{RegistryError, Result};
use crate::importer;
use crate::model::{
    CountrySwiftCodes, ImportSummary, MessageResponse, SwiftCodeDetail, SwiftCodeRecord,
    SwiftCodeSummary,
};
use crate::validator;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Level};

/// Actor recorded in the audit trail for direct adds and deletes
pub const REGISTRY_ACTOR: &str = "registry";

/// Note attached to a headquarter lookup that has no branches
pub const NO_BRANCHES_NOTE: &str = "No branches found for this headquarter.";

/// Country name used if a validated code somehow has no reference entry
const UNKNOWN_COUNTRY: &str = "Unknown";

// ============================================================================
// VALIDATION STEPS
// ============================================================================

fn ensure(condition: bool, rejection: impl FnOnce() -> RegistryError) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(rejection())
    }
}

fn check_lookup_length(code: &str) -> Result<()> {
    ensure(validator::code_length(code) == validator::CODE_LENGTH, || {
        RegistryError::Format("SWIFT code must be 11 characters long.".to_string())
    })
}

fn check_lookup_pattern(code: &str) -> Result<()> {
    ensure(validator::is_structurally_valid(code), || {
        RegistryError::Format("SWIFT code format is invalid.".to_string())
    })
}

fn check_creation_format(code: &str) -> Result<()> {
    ensure(validator::is_simple_alnum11(code), || {
        RegistryError::Format("Invalid SWIFT code format.".to_string())
    })
}

fn check_headquarter_flag(code: &str, claimed: bool) -> Result<()> {
    match (validator::derived_is_headquarter(code), claimed) {
        (true, false) => Err(RegistryError::Consistency(
            "SWIFT code ending with 'XXX' indicates a headquarter. Please set headquarter = true."
                .to_string(),
        )),
        (false, true) => Err(RegistryError::Consistency(
            "SWIFT code not ending with 'XXX' indicates a branch. Please set headquarter = false."
                .to_string(),
        )),
        _ => Ok(()),
    }
}

/// Client mistakes are warnings; store and file failures are errors.
fn failure_level(err: &RegistryError) -> Level {
    if err.status_code() >= 500 {
        Level::ERROR
    } else {
        Level::WARN
    }
}

fn log_failure(operation: &'static str, input: &str, err: &RegistryError) {
    if failure_level(err) == Level::ERROR {
        error!(operation, input = %input, error = %err, "operation failed");
    } else {
        warn!(operation, input = %input, reason = %err, "request rejected");
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Validation, cross-checks against the country reference, and store calls.
pub struct SwiftCodeRegistry<S: SwiftCodeStore> {
    store: S,
    countries: Arc<CountryReference>,
}

impl<S: SwiftCodeStore> SwiftCodeRegistry<S> {
    pub fn new(store: S, countries: Arc<CountryReference>) -> Self {
        SwiftCodeRegistry { store, countries }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn countries(&self) -> &CountryReference {
        &self.countries
    }

    fn check_country_code(&self, iso2: &str, message: &str) -> Result<()> {
        ensure(self.countries.is_valid(iso2), || {
            RegistryError::Format(message.to_string())
        })
    }

    fn check_country_name(&self, iso2: &str, candidate_name: &str) -> Result<()> {
        let matches = self
            .countries
            .name_for(iso2)
            .map(|canonical| canonical.to_lowercase() == candidate_name.to_lowercase())
            .unwrap_or(false);

        ensure(matches, || {
            RegistryError::Consistency("Country name does not match the ISO2 code.".to_string())
        })
    }

    /// Look up one code; headquarters also get their branch list.
    pub fn get_by_code(&self, raw_code: &str) -> Result<SwiftCodeDetail> {
        let code = validator::normalize(raw_code);
        self.lookup(&code).inspect_err(|e| log_failure("get", &code, e))
    }

    fn lookup(&self, code: &str) -> Result<SwiftCodeDetail> {
        check_lookup_length(code)?;
        check_lookup_pattern(code)?;

        let record = self
            .store
            .find_by_code(code)?
            .ok_or_else(|| RegistryError::NotFound("SWIFT code not found.".to_string()))?;

        let mut detail = SwiftCodeDetail::from(record);

        if validator::derived_is_headquarter(code) {
            let base = validator::base_code(code).unwrap_or(code);
            let branches: Vec<SwiftCodeSummary> = self
                .store
                .find_by_prefix_excluding(base, code)?
                .into_iter()
                .map(SwiftCodeSummary::from)
                .collect();

            if branches.is_empty() {
                detail.message = Some(NO_BRANCHES_NOTE.to_string());
            }
            detail.branches = Some(branches);
        }

        debug!(code = %code, "lookup hit");
        Ok(detail)
    }

    /// All codes registered for one country.
    pub fn list_by_country(&self, raw_iso2: &str) -> Result<CountrySwiftCodes> {
        let iso2 = raw_iso2.to_uppercase();
        self.country_listing(iso2.clone())
            .inspect_err(|e| log_failure("list_by_country", &iso2, e))
    }

    fn country_listing(&self, iso2: String) -> Result<CountrySwiftCodes> {
        self.check_country_code(&iso2, "Invalid country code.")?;

        let records = self.store.find_by_country(&iso2)?;
        ensure(!records.is_empty(), || {
            RegistryError::NotFound(format!("No SWIFT codes found for country code {}", iso2))
        })?;

        let country_name = self
            .countries
            .name_for(&iso2)
            .unwrap_or(UNKNOWN_COUNTRY)
            .to_string();

        debug!(country = %iso2, count = records.len(), "country listing");

        Ok(CountrySwiftCodes {
            country_iso2: iso2,
            country_name,
            swift_codes: records.into_iter().map(SwiftCodeSummary::from).collect(),
        })
    }

    /// Validate and insert a caller-supplied record.
    pub fn add(&self, candidate: SwiftCodeRecord) -> Result<SwiftCodeRecord> {
        let code = validator::normalize(&candidate.swift_code);
        let iso2 = candidate.country_iso2.to_uppercase();

        let outcome = check_creation_format(&code)
            .and_then(|_| self.check_country_code(&iso2, "Invalid country ISO2 code."))
            .and_then(|_| self.check_country_name(&iso2, &candidate.country_name));

        if let Err(e) = outcome {
            log_failure("add", &code, &e);
            return Err(e);
        }

        let record = SwiftCodeRecord {
            swift_code: code,
            country_iso2: iso2,
            ..candidate
        }
        .normalized();

        let saved = self.store.atomically(|store| {
            ensure(!store.exists_by_code(&record.swift_code)?, || {
                RegistryError::Conflict("SWIFT code already exists.".to_string())
            })?;
            check_headquarter_flag(&record.swift_code, record.is_headquarter)?;

            let saved = store.save(&record)?;
            store.append_event(&Event::swift_code_added(&saved, REGISTRY_ACTOR))?;
            Ok(saved)
        });

        match &saved {
            Ok(record) => info!(code = %record.swift_code, "SWIFT code added"),
            Err(e) => log_failure("add", &record.swift_code, e),
        }

        saved
    }

    /// Delete one code by exact match. Branches of a deleted headquarter stay.
    pub fn delete(&self, raw_code: &str) -> Result<MessageResponse> {
        let code = validator::normalize(raw_code);
        self.remove(&code).inspect_err(|e| log_failure("delete", &code, e))?;

        info!(code = %code, "SWIFT code deleted");
        Ok(MessageResponse::new("SWIFT code deleted successfully."))
    }

    fn remove(&self, code: &str) -> Result<()> {
        ensure(validator::is_structurally_valid(code), || {
            RegistryError::Format("Invalid SWIFT code format.".to_string())
        })?;

        self.store.atomically(|store| {
            ensure(store.exists_by_code(code)?, || {
                RegistryError::NotFound(format!("SWIFT code not found: {}", code))
            })?;

            store.delete_by_code(code)?;
            store.append_event(&Event::swift_code_deleted(code, REGISTRY_ACTOR))?;
            Ok(())
        })
    }

    /// Import every row of a CSV file, skipping codes already stored.
    pub fn bulk_import(&self, csv_path: &Path) -> Result<ImportSummary> {
        info!(path = %csv_path.display(), "starting bulk import");
        importer::load_csv(csv_path)
            .and_then(|records| importer::import_records(&self.store, &records))
            .inspect_err(|e| log_failure("import", &csv_path.display().to_string(), e))
    }

    /// Same as `bulk_import`, from an already-open source.
    pub fn bulk_import_from_reader<R: Read>(&self, reader: R) -> Result<ImportSummary> {
        let records = importer::parse_csv(reader)?;
        importer::import_records(&self.store, &records)
    }
}
