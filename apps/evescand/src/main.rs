//! Public contract sync daemon.
//!
//! Loads configuration, opens the connection pool, ensures the schema, and
//! runs one sync worker per configured region until ctrl-c.

mod config;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use evescan_esi::EsiClient;
use evescan_store::{ensure_schema, ContractRepository};
use evescan_sync::{ShutdownSignal, SyncWorker};

use crate::config::EvescandConfig;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = EvescandConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    tracing::info!(
        regions = config.regions.len(),
        interval_secs = config.sync.sync_interval_secs,
        batch_size = config.sync.batch_size,
        "starting evescand"
    );

    // Create database pool
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.database_url)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Database connection error: {e}");
            std::process::exit(1);
        });

    ensure_schema(&pool).await.unwrap_or_else(|e| {
        eprintln!("Schema bootstrap error: {e}");
        std::process::exit(1);
    });

    // Shared collaborators: the client is stateless, the repository is a thin
    // handle over the pool.
    let client = Arc::new(EsiClient::new(config.esi.clone()).unwrap_or_else(|e| {
        eprintln!("Client configuration error: {e}");
        std::process::exit(1);
    }));
    let repository = Arc::new(ContractRepository::new(pool.clone()));

    // One worker task per region; regions are fully independent.
    let shutdown = ShutdownSignal::new();
    let mut workers = Vec::new();
    for (region_name, region) in config.regions.clone() {
        let worker = SyncWorker::new(
            Arc::clone(&client),
            Arc::clone(&repository),
            config.sync.clone(),
            shutdown.clone(),
        );
        workers.push(tokio::spawn(async move {
            worker.run(&region_name, region).await;
        }));
    }

    // Run until interrupted, then let in-flight cycles finish.
    tokio::signal::ctrl_c().await.ok();
    tracing::info!("shutdown requested, stopping workers");
    shutdown.request();

    for worker in workers {
        let _ = worker.await;
    }

    pool.close().await;
    tracing::info!("evescand stopped");
}
