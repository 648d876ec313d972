//! Fingergate door client.
//!
//! Runs the access pipeline against a recorded sensor frame, a log-only door
//! panel and the HTTP enrollment endpoint. Stops on Ctrl-C or when the
//! pipeline hits an unrecoverable error.

use anyhow::{Context, Result};
use clap::Parser;
use fingergate_core::{DeviceConfig, HardwareId, SharedSecret};
use fingergate_hardware::{IdentityProvider, LogPanel, ReplaySensor, StaticIdentity, SysfsIdentity};
use fingergate_network::{HttpClientConfig, HttpEnrollmentClient};
use fingergate_pipeline::AccessPipeline;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fingergate")]
#[command(version)]
#[command(about = "Biometric door client: capture, encrypt, submit, unlock")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enrollment endpoint, overrides the configuration file
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Shared secret, overrides the configuration file
    #[arg(long, env = "FINGERGATE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Network interface used for the hardware id
    #[arg(short, long)]
    interface: Option<String>,

    /// Fixed hardware id instead of the interface address
    #[arg(long)]
    hardware_id: Option<String>,

    /// Raw 8-bit frame served as every capture
    #[arg(short, long)]
    replay: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value_t = 256)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 288)]
    height: u32,

    /// Stop after this many captures
    #[arg(short = 'n', long)]
    count: Option<usize>,
}

fn load_config(cli: &Cli) -> Result<DeviceConfig> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::parse_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DeviceConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config = config.endpoint_url(endpoint.clone());
    }
    if let Some(secret) = &cli.secret {
        config.shared_secret = SharedSecret::new(secret.clone());
    }
    if let Some(interface) = &cli.interface {
        config = config.network_interface(interface.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn resolve_hardware_id(cli: &Cli, config: &DeviceConfig) -> Result<HardwareId> {
    let id = match &cli.hardware_id {
        Some(id) => {
            StaticIdentity::new(HardwareId::new(id.clone())?)
                .hardware_id(&config.network_interface)
                .await?
        }
        None => SysfsIdentity::new()
            .hardware_id(&config.network_interface)
            .await
            .with_context(|| format!("reading address of {}", config.network_interface))?,
    };
    Ok(id)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let hardware_id = resolve_hardware_id(&cli, &config).await?;

    let sensor = ReplaySensor::from_file(&cli.replay, cli.width, cli.height)
        .with_context(|| format!("loading frame {}", cli.replay.display()))?
        .with_limit(cli.count);
    let transport = HttpEnrollmentClient::new(HttpClientConfig::from(&config))?;

    info!(
        endpoint = %config.endpoint_url,
        hardware_id = %hardware_id,
        "starting door client"
    );
    let mut pipeline = AccessPipeline::new(sensor, LogPanel::new(), transport, config, hardware_id);

    let result = tokio::select! {
        result = pipeline.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    };

    if let Err(e) = pipeline.shutdown().await {
        warn!(error = %e, "shutdown incomplete");
    }
    info!(cycles = pipeline.cycles_completed(), "stopped");

    match result {
        Ok(()) => Ok(()),
        // The replay ran out of frames.
        Err(e) if cli.count.is_some() && is_exhausted(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn is_exhausted(e: &fingergate_pipeline::PipelineError) -> bool {
    matches!(e, fingergate_pipeline::PipelineError::SensorUnavailable(inner) if inner.is_disconnected())
}
