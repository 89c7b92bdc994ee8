use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use swift_registry::config::{init_logging, StoreConfig};
use swift_registry::{SwiftCodeRecord, SwiftCodeStore};

/// SWIFT code registry - command line front end
#[derive(Debug, Parser)]
#[command(name = "swift-registry", version)]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import the CSV source (existing codes are skipped)
    Import,

    /// Show one code; headquarters include their branches
    Get { swift_code: String },

    /// List all codes for an ISO2 country code
    Country { country_iso2: String },

    /// Delete one code
    Delete { swift_code: String },

    /// Add one code
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        bank_name: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        town_name: Option<String>,

        #[arg(long)]
        country_iso2: String,

        #[arg(long)]
        country_name: String,

        /// Code is a headquarter (must end in XXX)
        #[arg(long)]
        headquarter: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let registry = cli
        .store
        .open_registry()
        .context("Failed to open registry")?;

    match cli.command {
        Command::Import => {
            println!("📥 Importing {}", cli.store.import_csv.display());
            let summary = registry.bulk_import(&cli.store.import_csv)?;
            println!("✓ Inserted: {} codes", summary.inserted);
            println!("✓ Skipped existing: {}", summary.skipped);
            println!("✓ Store now holds {} codes", registry.store().count()?);
        }
        Command::Get { swift_code } => print_json(&registry.get_by_code(&swift_code)?)?,
        Command::Country { country_iso2 } => {
            print_json(&registry.list_by_country(&country_iso2)?)?
        }
        Command::Delete { swift_code } => print_json(&registry.delete(&swift_code)?)?,
        Command::Add {
            code,
            bank_name,
            address,
            town_name,
            country_iso2,
            country_name,
            headquarter,
        } => {
            let candidate = SwiftCodeRecord {
                swift_code: code,
                bank_name,
                address,
                town_name,
                is_headquarter: headquarter,
                country_iso2,
                country_name,
            };
            print_json(&registry.add(candidate)?)?
        }
    }

    Ok(())
}
