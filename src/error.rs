// ⚠️ Error Taxonomy
// Every rejection path returns a typed error carrying the message shown to the caller

use thiserror::Error;

/// Errors surfaced by the registry, the store, and the importer.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Malformed code or country input
    #[error("{0}")]
    Format(String),

    /// Well-formed input, absent record
    #[error("{0}")]
    NotFound(String),

    /// Duplicate code on create
    #[error("{0}")]
    Conflict(String),

    /// Country name / ISO2 mismatch, headquarter flag mismatch
    #[error("{0}")]
    Consistency(String),

    /// Import source unreadable or unparseable
    #[error("Import failed: {0}")]
    Io(String),

    /// Country reference data could not be loaded
    #[error("Country reference error: {0}")]
    Country(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl RegistryError {
    /// HTTP-equivalent classification of this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::Format(_) => 400,
            RegistryError::Consistency(_) => 400,
            RegistryError::NotFound(_) => 404,
            RegistryError::Conflict(_) => 409,
            RegistryError::Io(_) | RegistryError::Country(_) | RegistryError::Store(_) => 500,
        }
    }

    /// Caller-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<csv::Error> for RegistryError {
    fn from(err: csv::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
