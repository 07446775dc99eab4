//! Prometheus exporter for Jitsi Videobridge Colibri statistics.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use colibri_exporter::collector::{CachedCollector, Collector, OnDemandCollector, RefreshLoop};
use colibri_exporter::config::{CollectionMode, LogFormat};
use colibri_exporter::{ExporterConfig, HttpServer, Prober, SharedState};

/// Prometheus exporter for Jitsi Videobridge Colibri statistics.
#[derive(Parser, Debug)]
#[command(name = "colibri-exporter")]
#[command(about = "Export Jitsi Videobridge Colibri statistics as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Colibri statistics URL (overrides config).
    #[arg(long)]
    colibri_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        ExporterConfig::load_from_file(config_path)?
    } else {
        ExporterConfig::default()
    };

    // CLI overrides
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
    }
    if let Some(url) = args.colibri_url {
        config.colibri.url = url;
    }
    config.validate()?;

    // Initialize logging
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("colibri_exporter={}", log_level).parse()?);

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    info!("Starting Colibri exporter");

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let prober = Prober::new(&config.colibri)
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let listen_addr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    // Assemble the configured collection strategy
    let mut refresh_task = None;
    let collector = match config.collection.mode {
        CollectionMode::OnDemand => {
            info!(url = %config.colibri.url, "Using on-demand collection");
            Arc::new(Collector::OnDemand(OnDemandCollector::new(prober)))
        }
        CollectionMode::Cached => {
            info!(
                url = %config.colibri.url,
                interval_secs = config.collection.refresh_interval_secs,
                "Using cached collection"
            );
            let state = SharedState::default();
            let refresh = RefreshLoop::new(
                prober,
                state.clone(),
                Duration::from_secs(config.collection.refresh_interval_secs),
            );
            let refresh_shutdown = shutdown_rx.clone();
            refresh_task = Some(tokio::spawn(refresh.run(refresh_shutdown)));

            Arc::new(Collector::Cached(CachedCollector::new(state)))
        }
    };

    // Start HTTP server
    let http_server = HttpServer::new(collector, listen_addr, config.prometheus.path.clone());
    let http_shutdown = shutdown_rx.clone();
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(http_shutdown).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate()
                ).unwrap();
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for tasks to complete
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = http_task.await;
        if let Some(task) = refresh_task {
            let _ = task.await;
        }
    })
    .await;

    info!("Exporter stopped");
    Ok(())
}
