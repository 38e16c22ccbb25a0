use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use vitals_monitor::{
    create_router, AppState, Config, MonitoringService, SensingBackendFactory, SensingSource,
    StaticPermission, StatsStore,
};

#[derive(Parser, Debug)]
#[command(name = "vitals-monitor", about = "Pulse-rate monitoring session demo")]
struct Args {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/vitals-monitor")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP control API
    Serve,
    /// Run one session over a recorded metrics file and print the summary
    Replay {
        /// JSON-lines file of metrics batches
        file: PathBuf,

        /// Delay between batches in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;

    info!("Vitals Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match args.command {
        Command::Serve => serve(cfg).await,
        Command::Replay { file, interval_ms } => replay(cfg, file, interval_ms).await,
    }
}

fn build_service(cfg: &Config, source: SensingSource, interval_ms: Option<u64>) -> Result<MonitoringService> {
    let mut backend_config = cfg.sensing.backend_config();
    if let Some(ms) = interval_ms {
        backend_config.batch_interval = Duration::from_millis(ms);
    }

    let backend = SensingBackendFactory::create(source, backend_config)?;
    let mut service = MonitoringService::new(backend)?;

    if cfg.storage.persist_stats {
        let store = StatsStore::new(cfg.storage.stats_path());
        info!("Caching session stats at {}", store.path().display());
        service = service.with_store(store);
    }

    Ok(service)
}

async fn serve(cfg: Config) -> Result<()> {
    let service = build_service(&cfg, cfg.sensing.source()?, None)?;
    let permission = service
        .resolve_permission(&StaticPermission(cfg.sensing.camera_permission))
        .await;
    info!("Camera permission resolved: {:?}", permission);

    let service = Arc::new(service);
    let app = create_router(AppState::new(Arc::clone(&service)));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server error")?;

    service.shutdown().await;
    Ok(())
}

async fn replay(cfg: Config, file: PathBuf, interval_ms: Option<u64>) -> Result<()> {
    let service = build_service(&cfg, SensingSource::Replay(file), interval_ms)?;
    service
        .resolve_permission(&StaticPermission(cfg.sensing.camera_permission))
        .await;

    service.start().await?;

    let mut stats_rx = service.watch_stats();
    let progress = tokio::spawn(async move {
        while stats_rx.changed().await.is_ok() {
            let stats = *stats_rx.borrow();
            info!(
                "Pulse rate: min {} / max {} / avg {} bpm",
                stats.min, stats.max, stats.average
            );
        }
    });

    tokio::select! {
        _ = service.wait_for_feed_end() => info!("Replay complete"),
        _ = tokio::signal::ctrl_c() => warn!("Interrupted; stopping early"),
    }

    let snapshot = service.snapshot().await;
    let stats = service.shutdown().await;
    progress.abort();

    println!("Session: {}", snapshot.session_id.as_deref().unwrap_or("-"));
    println!("Samples: {}", snapshot.sample_count);
    println!("Min Pulse Rate: {} bpm", stats.min);
    println!("Max Pulse Rate: {} bpm", stats.max);
    println!("Avg Pulse Rate: {} bpm", stats.average);

    Ok(())
}
