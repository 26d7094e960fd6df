//! Trail-conditions: off-road park trail condition service.
//!
//! Single-binary Tokio application that:
//! 1. Fetches One Call forecasts for every configured park
//! 2. Derives rain, mud and dust metrics per park
//! 3. Caches the latest result (or a fallback marker) in memory
//! 4. Serves the cache at `GET /current-conditions`
//! 5. Repeats the sweep on a fixed period

mod api;
mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn};

use conditions::{ConditionsCache, RefreshScheduler};
use openweather_client::OpenWeatherClient;

/// Off-road trail conditions service
#[derive(Parser)]
#[command(name = "trail-conditions", about = "Off-road park trail conditions service")]
struct Cli {
    /// Path to the TOML config file (optional).
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Run a single refresh cycle, print the results as JSON, then exit.
    #[arg(long)]
    once: bool,
}

/// Upper bound on waiting for an in-flight cycle during shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trail_conditions=info,conditions=info,openweather_client=info,tower_http=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Trail conditions service starting up...");

    // Load configuration.
    let cfg = match config::load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Parks: {:?}",
        cfg.parks.iter().map(|p| &p.name).collect::<Vec<_>>()
    );
    let client = match OpenWeatherClient::new(cfg.api_key.clone(), &cfg.provider) {
        Ok(c) => c,
        Err(e) => {
            error!("Weather client initialization failed: {}", e);
            std::process::exit(1);
        }
    };
    info!("Provider endpoint: {}", client.endpoint());

    // ── Shared state ─────────────────────────────────────────────────
    let cache = ConditionsCache::new();
    let scheduler = RefreshScheduler::new(client, cfg.parks.clone(), cache.clone(), &cfg.timing);
    info!(
        "Timing: refresh every {:?}, fetch timeout {}s",
        scheduler.period(),
        cfg.timing.fetch_timeout_secs
    );

    // ── Single-cycle mode ────────────────────────────────────────────
    if cli.once {
        info!("Running a single refresh cycle...");
        let summary = scheduler.run_cycle().await;
        let report = json!({
            "cycle": summary,
            "conditions": cache.snapshot(),
        });
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to render results: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // ── Refresh task + HTTP endpoint ─────────────────────────────────
    let refresh = scheduler.start();

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            refresh.stop().await;
            std::process::exit(1);
        }
    };
    info!("Server running on {}{}", addr, api::CONDITIONS_PATH);

    let app = api::create_router(cache);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("HTTP server error: {}", e);
    }

    info!(
        "Stopping refresh scheduler ({} cycles completed)",
        refresh.cycles_completed()
    );
    if tokio::time::timeout(SHUTDOWN_GRACE, refresh.stop())
        .await
        .is_err()
    {
        warn!("Refresh cycle still running after {:?}; exiting anyway", SHUTDOWN_GRACE);
    }

    info!("Trail conditions service shut down.");
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
