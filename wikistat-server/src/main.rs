//! Wikistat Server
//!
//! Counts Wikimedia recent changes per language per day and serves the
//! counters, live filtered changes and channel preferences over HTTP.

mod api;
mod config;
mod preferences;
mod server;
mod shutdown;
mod state;
mod workers;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use preferences::ChannelPreferences;
use server::{build_router, run_server};
use shutdown::spawn_shutdown_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wikistat_core::events::event_queue;
use wikistat_core::framework::DatabaseProcessor;
use wikistat_core::processors::{Aggregator, Collector, LiveFetcher};
use wikistat_core::source::{EventSource, SseEventSource};
use wikistat_core::store::{CounterStore, MemoryCounterStore};

/// Wikistat - per-language daily statistics of Wikimedia recent changes
#[derive(Parser, Debug)]
#[command(name = "wikistat-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./wikistat-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Keep counters in memory instead of PostgreSQL (lost on exit)
    #[arg(long, default_value = "false", conflicts_with = "migrate")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting wikistat-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Pick the counter store
    let mut db_pool = None;
    let store: Arc<dyn CounterStore> = if args.in_memory {
        tracing::warn!("Running with in-memory counters, nothing will be persisted");
        Arc::new(MemoryCounterStore::new())
    } else {
        // Get database URL from environment
        let database_url = get_database_url().map_err(|e| {
            tracing::error!("DATABASE_URL environment variable not set");
            e
        })?;

        // Create database connection pool
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        // Run migrations if requested
        if args.migrate {
            tracing::info!("Running database migrations...");
            sqlx::migrate!("../migrations")
                .run(&pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to run migrations: {}", e);
                    e
                })?;
            tracing::info!("Migrations completed successfully");
        }

        db_pool = Some(pool.clone());
        Arc::new(DatabaseProcessor { pool })
    };

    let shutdown_rx = spawn_shutdown_handler();

    // Wire up the pipeline
    let source: Arc<dyn EventSource> = Arc::new(SseEventSource::new(config.stream_url.clone()));
    tracing::info!(url = %config.stream_url, "Using event stream");

    let (queue_tx, queue_rx) = event_queue(config.collector.queue_capacity);
    let collector = Collector::new(Arc::clone(&source), queue_tx, &config.collector);
    let collector_stats = collector.stats();
    let aggregator = Aggregator::new(queue_rx, Arc::clone(&store), &config.aggregator);

    let collector_handle = workers::spawn_collector(collector, shutdown_rx.clone());
    let aggregator_handle =
        workers::spawn_aggregator(aggregator, config.aggregator.interval, shutdown_rx.clone());

    // Create application state
    let fetcher = LiveFetcher::new(source, config.fetch);
    let preferences = ChannelPreferences::new();
    let state = AppState::new(store, fetcher, preferences, collector_stats);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", config.listen);
    let result = run_server(router, config.listen, shutdown_rx).await;

    // Wait for the workers; the aggregator flushes on its way out
    match collector_handle.await {
        Ok(exit) => tracing::info!(?exit, "Collector finished"),
        Err(e) => tracing::error!(error = %e, "Collector task panicked"),
    }
    if let Err(e) = aggregator_handle.await {
        tracing::error!(error = %e, "Aggregator task panicked");
    }

    // Close database connections gracefully
    if let Some(pool) = db_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
