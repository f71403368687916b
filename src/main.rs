//! King Cache demo host
//!
//! Runs a cache wired to the process's lifecycle signals and reports its stats.
//! Send `SIGUSR1` (memory pressure) or `SIGUSR2` (entered background) to watch
//! the cache flush.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use king_cache::{spawn_os_signal_listener, spawn_stats_reporter, Config, KingCache, SignalBus};

/// Main entry point for the demo host.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache on the process-wide signal bus
/// 4. Preload demo entries
/// 5. Forward OS signals to the bus and start the stats reporter
/// 6. Wait for Ctrl+C/SIGTERM and stop background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "king_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting King Cache demo host");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: count_limit={}, stats_interval={}s, seed_entries={}",
        config.count_limit, config.stats_interval, config.seed_entries
    );

    let bus = SignalBus::global();
    let cache = Arc::new(KingCache::from_config(&config, bus.clone()));

    for index in 0..config.seed_entries {
        cache.set(index as i64, format!("value_{}", index));
    }
    info!(count = cache.count(), "Cache seeded");

    let listener_handle =
        spawn_os_signal_listener(bus).context("Failed to start OS signal listener")?;
    let report_handle = spawn_stats_reporter(cache.clone(), config.stats_interval);

    shutdown_signal().await;

    listener_handle.abort();
    report_handle.abort();
    warn!("Background tasks aborted");

    info!(stats = ?cache.stats(), "Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
