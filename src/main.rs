use anyhow::{Context, Result};
use clap::Parser;
use civictwin::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file before anything else (silently ignore if missing)
    dotenvy::dotenv().ok();

    let cli_args = cli::Cli::parse();

    // Configuration decides the log level, so it is read before logging starts
    let config = cli::load_config(cli_args.config.as_deref())?;

    let mut log_config = logging::LogConfig::new()
        .with_debug_mode(cli_args.debug)
        .with_level(config.logging.level.clone());

    if let Some(log_dir) = &config.logging.dir {
        log_config = log_config.with_log_dir(log_dir.clone());
    }

    let log_dir = log_config.log_dir.clone();
    let _guard = logging::init_logging(log_config).context("Failed to initialize logging")?;

    // Clean up old log files (keep last 7 days)
    if cli_args.debug {
        match logging::cleanup_old_logs(&log_dir, 7) {
            Ok(removed) if removed > 0 => {
                tracing::info!("🧹 Cleaned up {} old log file(s)", removed)
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to clean up old logs: {}", e),
        }
    }

    cli::run(cli_args, config).await
}
