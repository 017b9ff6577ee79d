//! CSM Queue Monitor
//!
//! Polls the CSM API for our validator's deposit-queue position, keeps the
//! sample history in SQLite and serves forecast/efficiency analytics.
//!
//! Usage:
//!   queue-monitor --config monitor.toml --listen 0.0.0.0:8090
//!
//! Environment Variables:
//!   CSM_API_ENDPOINT - Base URL of the CSM API (default: http://localhost:9000)
//!   QUEUE_DATA_PATH - SQLite history file (default: queue_history.db)
//!   QUEUE_REFRESH_INTERVAL_SECS - Poll interval (default: 300)
//!   QUEUE_LISTEN_ADDR - HTTP listen address (default: 0.0.0.0:8090)
//!   RUST_LOG - tracing filter

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use csm_queue_monitor::{
    api,
    queue::QueueAnalyzer,
    source::CsmQueueClient,
    store::SqliteHistoryStore,
    MonitorConfig, QueueMonitor,
};

#[derive(Parser, Debug)]
#[command(name = "queue-monitor")]
#[command(about = "Deposit queue forecasting and efficiency dashboard backend")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "QUEUE_MONITOR_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen address (overrides config)
    #[arg(short, long)]
    listen: Option<String>,

    /// SQLite history file (overrides config)
    #[arg(short, long)]
    database: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "csm_queue_monitor=info,tower_http=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = MonitorConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    info!("🚀 CSM Queue Monitor starting");
    info!(
        endpoint = %config.csm_api_endpoint,
        refresh_secs = config.refresh_interval.as_secs(),
        window_days = config.analytics.window_days,
        "Configuration loaded"
    );

    let store = Arc::new(SqliteHistoryStore::open(&config.database_path)?);
    let source = Arc::new(
        CsmQueueClient::new(&config.csm_api_endpoint, config.fetch_timeout)
            .context("Failed to build HTTP client")?,
    );
    let monitor = Arc::new(QueueMonitor::new(
        store,
        source,
        QueueAnalyzer::new(config.analytics.clone()),
    ));

    tokio::spawn(monitor.clone().run_poller(config.refresh_interval));

    let app = api::router(monitor)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🎯 API server listening on {}", config.listen_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate directory.
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
