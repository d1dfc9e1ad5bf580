//! Gatesearch Server Entry Point

use gatesearch::api::{self, ApiState};
use gatesearch::{admin, AclTable, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,gatesearch=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting gatesearch server...");

    // Load config
    let config = Config::from_env()?;
    tracing::info!("Loaded config: {:?}", config);

    // Load ACL
    let acl = Arc::new(AclTable::load_or_empty(&config.acl.path)?);
    tracing::info!(
        resources = acl.len(),
        users = acl.users().count(),
        "ACL loaded"
    );

    // Build index from the snapshot, or reset and ingest resource files
    let index = admin::open_index(&config, acl.clone())?;

    // Start API server
    let state = Arc::new(ApiState::new(index.clone(), acl, &config.engine));
    api::serve(state, &config.api, shutdown_signal()).await?;

    if let Some(path) = &config.ingest.snapshot_path {
        index.save_snapshot(path)?;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
