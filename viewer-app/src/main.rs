//! Native launcher for the radar viewer.
//!
//! Space pauses, R resets the rotation, F toggles fullscreen, Esc quits.

mod config;

use clap::Parser;
use radar_viewer::runtime::{LogSetup, NativeOptions, run_native};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

const DEFAULT_FILTER: &str = "radar_viewer=info,viewer_app=info,wgpu=error";

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = match &config.log_filter {
        Some(f) => EnvFilter::try_new(f)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let viewer = config.viewer_config()?;
    if config.print_config {
        println!("{}", serde_json::to_string_pretty(&viewer)?);
        return Ok(());
    }

    info!(
        "Starting radar viewer {}x{} (cap {}, seed {:?})",
        config.width, config.height, viewer.sim.max_blips, viewer.sim.seed
    );

    run_native(
        viewer,
        NativeOptions {
            width: config.width,
            height: config.height,
            log: LogSetup::External,
            ..Default::default()
        },
    )
    .map_err(|report| anyhow::anyhow!("radar viewer failed: {report:?}"))?;

    info!("Radar viewer closed");
    Ok(())
}
