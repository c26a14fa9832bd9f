//! birokt daemon - hands-free hive inspection by voice
//!
//! Transcripts arrive from a recognizer command or on the IPC socket,
//! UI clients connect to the UI socket.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use birokt_daemon::{Daemon, DaemonConfig, IpcServer};

#[derive(Parser, Debug)]
#[command(name = "birokt-daemon", version, about = "Voice-driven hive inspection daemon")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Start listening right away
    #[arg(long)]
    listen: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    info!("🐝 Starting birokt daemon v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => DaemonConfig::load_from(path),
        None => DaemonConfig::load(),
    }
    .context("Failed to load configuration")?;

    info!("📋 Configuration loaded from {}", config.config_path.display());
    info!("  - Locale: {}", config.engine.locale);
    info!(
        "  - Correction: {:?} >= {}",
        config.engine.similarity_metric, config.engine.fuzzy_threshold
    );
    if config.recognizer_command.is_empty() {
        warn!("⚠️ No recognizer command configured, transcripts via IPC only");
    }
    if config.camera.command.is_empty() {
        warn!("⚠️ No camera command configured, photos unavailable");
    }

    let daemon = Daemon::from_config(&config)
        .await
        .context("Failed to initialize daemon")?;

    info!("🔌 Starting IPC server on {}", config.ipc_socket_path.display());
    let ipc_server = IpcServer::new(&config.ipc_socket_path, Arc::clone(&daemon))
        .context("Failed to start IPC server")?;

    if cli.listen || config.listen_on_start {
        match daemon.listen().await {
            Ok(_) => info!("🎙️ Listening"),
            Err(e) => error!("Failed to start listening: {}", e),
        }
    }

    info!("🚀 birokt daemon ready!");
    info!("   Send 'toggle' or 'utterance <text>' to the IPC socket");

    tokio::select! {
        result = ipc_server.run() => {
            if let Err(e) = result {
                error!("IPC server error: {}", e);
            }
        }
        _ = daemon.wait_for_shutdown() => {
            info!("🛑 Shutdown requested over IPC");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received shutdown signal");
        }
    }

    info!("🧹 Shutting down...");
    if let Err(e) = daemon.shutdown().await {
        error!("Shutdown error: {}", e);
    }
    let _ = std::fs::remove_file(&config.ipc_socket_path);
    info!("👋 birokt daemon stopped");

    Ok(())
}
