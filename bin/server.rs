// SWIFT Code Registry - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use swift_registry::api::{build_router, cors_layer, AppState};
use swift_registry::config::{init_logging, ServerConfig};
use swift_registry::RegistryError;

#[derive(Debug, Parser)]
#[command(name = "swift-server", version)]
struct Cli {
    #[command(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = Cli::parse().server;

    tracing::info!("🌐 SWIFT Code Registry - Web Server");

    // Country reference is loaded here, once, before any request
    let registry = config
        .store
        .open_registry()
        .context("Failed to open registry")?;

    if config.no_startup_import {
        tracing::info!("startup import disabled");
    } else {
        match registry.bulk_import(&config.store.import_csv) {
            Ok(summary) => tracing::info!(
                inserted = summary.inserted,
                skipped = summary.skipped,
                "startup import complete"
            ),
            Err(RegistryError::Io(reason)) => {
                tracing::warn!(%reason, "startup import skipped")
            }
            Err(e) => return Err(e).context("Startup import failed"),
        }
    }

    let cors = cors_layer(config.cors_origin.as_deref()).context("Invalid CORS origin")?;
    let state = AppState::new(registry, config.store.import_csv.clone());
    let app = build_router(state, cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "🚀 Server running");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
