//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "orrery", about = "Animated solar system viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Disable the bloom pass.
    #[arg(long)]
    pub no_bloom: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to the config directory (overrides the default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the directory holding texture assets.
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if args.no_bloom {
            self.bloom.enabled = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            no_bloom: false,
            log_level: None,
            config: None,
            assets: PathBuf::from("assets"),
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let mut a = args();
        a.width = Some(1920);
        a.no_bloom = true;
        config.apply_cli_overrides(&a);
        assert_eq!(config.window.width, 1920);
        assert!(!config.bloom.enabled);
        // Non-overridden fields retain defaults.
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&args());
        assert_eq!(config, original);
    }
}
