//! Configuration for the orrery viewer: RON-backed settings with CLI
//! overrides.

pub mod cli;
pub mod config;
pub mod error;

pub use cli::CliArgs;
pub use config::{BloomSettings, CameraSettings, Config, DebugSettings, WindowSettings};
pub use error::ConfigError;

use std::path::PathBuf;

/// Resolve the config directory: an explicit override, or the platform config
/// dir under `orrery/`, or `./` as a last resort.
pub fn config_dir(override_dir: Option<&PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.clone();
    }
    dirs::config_dir()
        .map(|d| d.join("orrery"))
        .unwrap_or_else(|| PathBuf::from("."))
}
