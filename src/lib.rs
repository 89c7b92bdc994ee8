// SWIFT Code Registry - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod validator;   // Code shape checks + headquarter derivation
pub mod countries;   // ISO2 → country name reference
pub mod model;       // Record + response views
pub mod error;       // Error taxonomy
pub mod db;          // Record store (SQLite)
pub mod importer;    // CSV bulk import
pub mod registry;    // The five operations
pub mod config;      // Flags / environment

#[cfg(feature = "server")]
pub mod api;         // HTTP routes

// Re-export commonly used types
pub use countries::{Country, CountryReference};
pub use db::{Event, SqliteStore, SwiftCodeStore, setup_database};
pub use error::{RegistryError, Result};
pub use model::{
    CountrySwiftCodes, ImportSummary, MessageResponse, SwiftCodeDetail, SwiftCodeRecord,
    SwiftCodeSummary,
};
pub use registry::SwiftCodeRegistry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
