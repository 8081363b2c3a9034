use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundpool_core::{
    load_config, validate_config, ConversionPool, FfmpegMedia, MediaCapability, RunSummary,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Config file used when `SOUNDPOOL_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "soundpool.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("soundpool {}", VERSION);

    // Determine config path
    let config_path = std::env::var("SOUNDPOOL_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Source root: {:?}", config.pool.source_root);
    info!("Target root: {:?}", config.pool.target_root);
    match &config.pool.categories {
        Some(categories) => info!("Categories: {}", categories.join(", ")),
        None => info!("No categories configured, treating source root as flat"),
    }
    if config.pool.failed_log.is_none() {
        warn!("No failed log configured, failures will only be traced");
    }
    if config.pool.no_audio_log.is_none() {
        warn!("No no-audio log configured, silent videos will only be traced");
    }

    let media = FfmpegMedia::new(config.media.clone());
    media
        .validate()
        .await
        .context("ffmpeg/ffprobe are not usable")?;

    tokio::fs::create_dir_all(&config.pool.target_root)
        .await
        .with_context(|| format!("Failed to create {:?}", config.pool.target_root))?;

    let pool = ConversionPool::new(config.pool.clone(), media)
        .context("Failed to create conversion pool")?;
    let summary = pool.run().await.context("Conversion pool failed")?;

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    info!(
        "Done in {:.1}s: {} videos, {} converted, {} already present, {} without audio, {} failed",
        summary.elapsed_ms() as f64 / 1000.0,
        summary.enqueued,
        summary.converted,
        summary.skipped,
        summary.no_audio,
        summary.failed
    );
}
