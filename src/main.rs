//! chatterd - a small multi-user chat daemon.
//!
//! Clients hold a long-lived TLS connection, authenticate, discover their
//! chats, post messages and receive live pushes. History lives in SQLite
//! and survives restarts.

mod admin;
mod config;
mod db;
mod error;
mod handlers;
mod network;
mod state;

use crate::config::Config;
use crate::db::Store;
use crate::network::Gateway;
use crate::state::Hub;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
/// Falls back to `config.toml` when no argument is provided.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);

    let raw_path = match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "config.toml".to_string(),
    };

    // Canonicalize so later file access does not depend on the current
    // working directory.
    match std::fs::canonicalize(Path::new(&raw_path)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => raw_path,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (before tracing, so we can use log_format).
    let config_path = resolve_config_path();

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("ERROR: Failed to load config from {}: {}", config_path, e);
        e
    })?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match config.server.log_format {
        config::LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .json()
                .init();
        }
        config::LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }

    if let Err(errors) = config::validate(&config) {
        for err in &errors {
            error!(error = %err, "Configuration validation failed");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    info!(listen = %config.server.listen, "Starting chatterd");

    let store = Store::open(&config.database.path).await?;

    // Key/cert mismatch and unreadable material are fatal here.
    let acceptor =
        network::tls::build_acceptor(&config.tls.cert_path, &config.tls.key_path).await?;
    info!(cert = %config.tls.cert_path, "TLS material loaded");

    let hub = Arc::new(Hub::new(store));

    admin::spawn(Arc::clone(&hub));
    info!("Admin channel started");

    let gateway = Gateway::bind(config.server.listen, acceptor, Arc::clone(&hub)).await?;
    gateway.run().await?;

    info!("Gateway stopped, waiting for tasks to finish...");
    // Give connection tasks a moment to flush buffers before the process
    // exits.
    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;

    Ok(())
}
