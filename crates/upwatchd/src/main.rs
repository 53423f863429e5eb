//! upwatchd: the upwatch daemon.
//!
//! Single binary that assembles the monitor:
//! - Status store (in memory, rebuilt from config at start)
//! - Sweep scheduler (one eager sweep, then every `interval_secs`)
//! - Dashboard, badges, and JSON API over HTTP
//!
//! # Usage
//!
//! ```text
//! upwatchd run --config upwatch.toml
//! upwatchd check https://example.com https://example.org
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use upwatch_dashboard::DisplayOptions;
use upwatch_health::{HttpProber, StatusClass, SweepScheduler, classify};
use upwatch_state::{MonitorConfig, ProbeResult, StatusStore};

#[derive(Parser)]
#[command(name = "upwatchd", about = "upwatch daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the configured targets and serve the dashboard.
    Run {
        /// Path to the TOML config file.
        #[arg(long, default_value = "upwatch.toml")]
        config: PathBuf,

        /// Listen address (overrides `server.listen`).
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Probe URLs once and print the results.
    Check {
        /// URLs to probe.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Per-probe timeout in seconds.
        #[arg(long, default_value = "10")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,upwatchd=debug,upwatch=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, listen } => {
            run(config, listen).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { urls, timeout_secs } => check(urls, timeout_secs).await,
    }
}

async fn run(config_path: PathBuf, listen: Option<SocketAddr>) -> anyhow::Result<()> {
    let config = MonitorConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    info!(
        path = %config_path.display(),
        targets = config.targets.len(),
        "configuration loaded"
    );

    // ── Initialize subsystems ──────────────────────────────────

    let store = StatusStore::new(config.targets.clone());

    let prober = Arc::new(
        HttpProber::with_timeout(config.monitor.timeout()).context("failed to build prober")?,
    );
    info!(timeout_secs = config.monitor.timeout_secs, "prober initialized");

    let scheduler = SweepScheduler::new(store.clone(), prober.clone(), config.monitor.interval())
        .with_max_concurrency(config.monitor.max_concurrency);
    let phase = scheduler.phase();

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    // ── Start HTTP server ──────────────────────────────────────

    let router = upwatch_api::build_router(
        store,
        prober,
        DisplayOptions::from(&config.dashboard),
        phase,
    );
    let addr = listen.unwrap_or(config.server.listen);

    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for background tasks.
    let _ = scheduler_handle.await;

    info!("upwatch daemon stopped");
    Ok(())
}

async fn check(urls: Vec<String>, timeout_secs: u64) -> anyhow::Result<ExitCode> {
    let prober = HttpProber::with_timeout(Duration::from_secs(timeout_secs.max(1)))
        .context("failed to build prober")?;

    let mut all_ok = true;
    for url in &urls {
        let result = prober.check(url).await;
        let (line, ok) = report_line(url, &result);
        all_ok &= ok;
        println!("{line}");
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// One `check` output line, and whether the result counts as healthy.
fn report_line(url: &str, result: &ProbeResult) -> (String, bool) {
    let c = classify(&result.outcome);
    let elapsed = result
        .elapsed_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());
    let detail = result
        .error()
        .map(|e| format!(" ({e})"))
        .or_else(|| result.redirect_location.as_ref().map(|l| format!(" -> {l}")))
        .unwrap_or_default();

    let line = format!("{:<12} {:<6} {:>10} {url}{detail}", c.class, c.label, elapsed);
    (line, c.class == StatusClass::Ok)
}
