//! EduScan AI grading assistant server
//!
//! Serves the web UI (login, upload, grading dashboard, feedback,
//! analytics) on a local address, with the signed-in session persisted to a
//! JSON state file.
//!
//! Usage:
//! ```bash
//! # Defaults: http://127.0.0.1:8080, state in ~/.eduscan/state.json
//! eduscan-server
//!
//! # With config file (YAML or TOML); EDUSCAN_* env vars override it
//! eduscan-server --config eduscan.yaml
//!
//! # Forget the saved session
//! eduscan-server reset-session
//!
//! # Print the effective configuration
//! eduscan-server check-config
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use eduscan_server::{App, LoggingConfig, ServerConfig};
use eduscan_session::purge_persisted_session;
use eduscan_storage::FileStateStore;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// EduScan AI - grading assistant demo server
#[derive(Parser)]
#[command(name = "eduscan-server")]
#[command(about = "EduScan AI grading assistant server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "EDUSCAN_CONFIG",
        global = true
    )]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Remove the persisted session token and profile
    ResetSession,
    /// Load and validate the configuration, then print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.merge_env();
    config.validate()?;

    init_logging(&config.logging)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::ResetSession => reset_session(&config).await,
        Commands::CheckConfig => {
            let mut shown = config.clone();
            shown.auth.password = "<redacted>".to_string();
            let rendered = serde_yaml::to_string(&shown).context("Failed to render config")?;
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins over the configured level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", log_level)));

    if logging.json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Starting EduScan AI");
    info!(
        "   Account: {} (login delay {}ms)",
        config.auth.email, config.auth.login_delay_ms
    );
    info!(
        "   Uploads: max {} bytes, tick {}ms, processing {}ms",
        config.uploads.intake.max_file_size_bytes,
        config.uploads.pipeline.tick_interval_ms,
        config.uploads.pipeline.processing_delay_ms
    );

    let app = App::build(config).await?;
    app.serve(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn reset_session(config: &ServerConfig) -> anyhow::Result<()> {
    let path = config.state_path()?;
    let store = FileStateStore::open_or_reset(&path).await?;
    purge_persisted_session(&store, &config.auth).await?;
    info!("Cleared saved session in {}", path.display());
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
