// samplesink - HTTP ingestion endpoint for timestamped samples
//
// Clients post batches of samples as a stream of JSON arrays; each sample is
// normalized and written to SQLite on its own. A browser view lists
// everything stored, newest first.
//
// Architecture:
// - Server (axum): routes, request logging, graceful shutdown
// - Ingest: streaming multi-array decoding, normalization, per-record writes
// - Storage: SQLite tables for samples and audit events (r2d2 pool)
// - Render: bundled HTML template for the listing page

mod cli;
mod config;
mod ingest;
mod logging;
mod render;
mod server;
mod startup;
mod storage;
mod util;

use anyhow::{Context, Result};
use config::Config;
use server::AppState;
use std::sync::Arc;
use storage::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --path)
    if cli::handle_cli()? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env()?;

    // Keep the guard alive for the whole run so file logs flush
    let _file_guard = logging::init(&config.logging);

    // Store must be reachable with its schema in place before serving
    let store = SqliteStore::open(&config.storage).with_context(|| {
        format!(
            "Failed to initialize database {}",
            config.storage.db_path.display()
        )
    })?;
    tracing::info!("Database ready: {}", store.db_path().display());

    let state = AppState::new(Arc::new(store));

    // Oneshot channel signals the server to stop accepting connections
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let mut server_handle = tokio::spawn(server::start_server(
        config.bind_addr,
        state,
        shutdown_rx,
    ));

    startup::print_startup(&config);
    startup::log_startup(&config);

    tokio::select! {
        // Server ended on its own (e.g. bind failure)
        result = &mut server_handle => {
            return result.context("Server task panicked")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
        }
    }

    tracing::info!("Shutting down...");

    // If the send fails, the server has already stopped
    let _ = shutdown_tx.send(());

    server_handle.await.context("Server task panicked")??;

    tracing::info!("Shutdown complete");
    Ok(())
}
