//! Skywave - Shortwave Propagation Forecasting Engine
//!
//! Runs the report pipeline against a replay file or the synthetic feed,
//! either once (printing the report as JSON) or continuously with background
//! refresh until Ctrl+C.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skywave::background;
use skywave::pipeline::{
    PropagationService, ReplayFeed, ReportGenerator, SyntheticBaseline, SyntheticFeed, UpstreamFeed,
};
use skywave::{CacheManager, SkywaveConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "skywave")]
#[command(about = "Shortwave propagation forecasting engine")]
#[command(version)]
struct CliArgs {
    /// Path to a skywave.toml (otherwise $SKYWAVE_CONFIG, ./skywave.toml, defaults)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replay recorded readings from a JSON file
    #[arg(long, value_name = "FILE", conflicts_with = "synthetic")]
    replay: Option<PathBuf>,

    /// Use the synthetic feed (default when no replay file is given)
    #[arg(long)]
    synthetic: bool,

    /// Produce one report, print it as JSON and exit
    #[arg(long)]
    once: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Write the effective configuration as TOML to PATH and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).with_target(false).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SkywaveConfig> {
    match path {
        Some(path) => {
            let mut config = SkywaveConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Ok(SkywaveConfig::load()),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    let config = load_config(args.config.as_ref())?;

    if let Some(path) = &args.write_default_config {
        config
            .save_to_file(path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!(path = %path.display(), "Configuration written");
        return Ok(());
    }

    let feed: Arc<dyn UpstreamFeed> = match &args.replay {
        Some(path) => Arc::new(ReplayFeed::from_file(path)?),
        None => {
            if !args.synthetic {
                info!("No replay file given, using synthetic feed");
            }
            Arc::new(SyntheticFeed::new(SyntheticBaseline::default()))
        }
    };

    info!(
        station = %config.station.name,
        latitude = config.station.latitude,
        longitude = config.station.longitude,
        feed = feed.name(),
        "Skywave starting"
    );

    let cache = Arc::new(CacheManager::from_config(&config.cache));
    let scheduler_config = config.scheduler.clone();
    let generator = Arc::new(ReportGenerator::new(config, feed, Arc::clone(&cache)));
    let service = PropagationService::new(generator, Arc::clone(&cache));

    if args.once {
        let report = service.current_report().await.context("No forecast could be produced")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, finishing in-flight cycles...");
        shutdown_token.cancel();
    });

    let handles = background::spawn_all(service.clone(), cache, &scheduler_config, &cancel_token);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }

    let stats = service.cache_stats();
    info!(
        entries = stats.total_entries(),
        memory_bytes = stats.total_memory_bytes(),
        "Skywave stopped"
    );
    Ok(())
}
