//! Launcher configuration: CLI flags layered over an optional JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use radar_viewer::core::ViewerConfig;
use thiserror::Error;

/// Procedural 3D radar scope
#[derive(Parser, Clone, Debug)]
#[command(name = "viewer-app")]
#[command(about = "Animated radar scope with simulated targets")]
pub struct Config {
    /// JSON viewer configuration; missing fields take their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fixed RNG seed for reproducible blips and particles
    #[arg(long)]
    pub seed: Option<u64>,

    /// Hard cap on live blips
    #[arg(long)]
    pub max_blips: Option<usize>,

    /// Window width in logical pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Start with the simulation paused
    #[arg(long)]
    pub paused: bool,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Print the effective viewer configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid viewer config in {path}: {message}")]
    Invalid { path: PathBuf, message: String },

    #[error("viewer config rejected: {0}")]
    Rejected(String),
}

fn load_file(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ViewerConfig::from_json(&json).map_err(|report| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("{report:?}"),
    })
}

impl Config {
    /// Resolve the viewer configuration: file (or defaults), then CLI overrides.
    pub fn viewer_config(&self) -> Result<ViewerConfig, ConfigError> {
        let mut viewer = match &self.config {
            Some(path) => load_file(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(seed) = self.seed {
            viewer.sim.seed = Some(seed);
        }
        if let Some(max) = self.max_blips {
            viewer.sim.max_blips = max;
            viewer.sim.initial_blips = viewer.sim.initial_blips.min(max);
        }
        if self.paused {
            viewer.start_paused = true;
        }

        viewer
            .validate()
            .map_err(|report| ConfigError::Rejected(format!("{report:?}")))?;
        Ok(viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("viewer-app").chain(args.iter().copied()))
    }

    #[test]
    fn cli_overrides_apply() {
        let viewer = parse(&["--seed", "7", "--max-blips", "4", "--paused"])
            .viewer_config()
            .expect("valid");
        assert_eq!(viewer.sim.seed, Some(7));
        assert_eq!(viewer.sim.max_blips, 4);
        assert_eq!(viewer.sim.initial_blips, 4);
        assert!(viewer.start_paused);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let err = parse(&["--max-blips", "0"]).viewer_config().unwrap_err();
        assert!(matches!(err, ConfigError::Rejected(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = parse(&["--config", "/definitely/not/here.json"])
            .viewer_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn config_file_is_layered_under_flags() {
        let path = std::env::temp_dir().join(format!("radar-viewer-{}.json", std::process::id()));
        fs::write(&path, r#"{ "sim": { "max_blips": 9, "seed": 1 } }"#).expect("write temp config");
        let path_arg = path.to_string_lossy().into_owned();
        let viewer = parse(&["--config", &path_arg, "--seed", "2"])
            .viewer_config()
            .expect("valid");
        let _ = fs::remove_file(&path);
        assert_eq!(viewer.sim.max_blips, 9);
        assert_eq!(viewer.sim.seed, Some(2));
    }
}
