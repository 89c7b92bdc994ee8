// ⚙️ Configuration - every option is a flag or an environment variable

use crate::countries::CountryReference;
use crate::db::SqliteStore;
use crate::error::Result;
use crate::registry::SwiftCodeRegistry;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Default log filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "swift_registry=info,tower_http=info";

/// Options shared by the CLI and the server.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// SQLite database file
    #[arg(long, env = "SWIFT_DB_PATH", default_value = "swift_codes.db")]
    pub db_path: PathBuf,

    /// Country reference JSON ([{"Name": .., "Code": ..}]); bundled data if unset
    #[arg(long, env = "SWIFT_COUNTRIES_PATH")]
    pub countries_path: Option<PathBuf>,

    /// CSV source for bulk import
    #[arg(long, env = "SWIFT_IMPORT_CSV", default_value = "data/swift_codes.csv")]
    pub import_csv: PathBuf,
}

impl StoreConfig {
    /// Load the country reference once and open the store.
    pub fn open_registry(&self) -> Result<SwiftCodeRegistry<SqliteStore>> {
        let countries = CountryReference::load(self.countries_path.as_deref())?;
        let store = SqliteStore::open(&self.db_path)?;

        tracing::info!(
            db = %self.db_path.display(),
            countries = countries.len(),
            "registry opened"
        );

        Ok(SwiftCodeRegistry::new(store, Arc::new(countries)))
    }
}

/// Server-only options.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    #[command(flatten)]
    pub store: StoreConfig,

    /// Listen address
    #[arg(long = "bind", env = "SWIFT_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Allowed CORS origin; any origin if unset
    #[arg(long, env = "SWIFT_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Skip importing the CSV before serving traffic
    #[arg(long, env = "SWIFT_NO_STARTUP_IMPORT")]
    pub no_startup_import: bool,
}

/// Install the tracing subscriber (RUST_LOG, else `DEFAULT_LOG_FILTER`).
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        server: ServerConfig,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "swift-server",
            "--db-path",
            "/tmp/codes.db",
            "--bind",
            "127.0.0.1:9000",
            "--cors-origin",
            "http://localhost:3000",
            "--no-startup-import",
        ]);

        assert_eq!(cli.server.store.db_path, PathBuf::from("/tmp/codes.db"));
        assert_eq!(cli.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(cli.server.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert!(cli.server.no_startup_import);
    }

    #[test]
    fn test_open_registry_with_bundled_countries() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("swift.db"),
            countries_path: None,
            import_csv: PathBuf::from("data/swift_codes.csv"),
        };

        let registry = config.open_registry().unwrap();
        assert!(registry.countries().is_valid("CL"));
    }
}
