//! Structured logging via the `tracing` ecosystem.
//!
//! Console output with uptime timestamps and module paths, plus an optional
//! JSON file layer in debug builds. The filter comes from `RUST_LOG` when
//! set, otherwise from the config's `debug.log_level`.

use std::path::Path;

use orrery_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter: info everywhere, with the noisy GPU crates turned down.
const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Initialize the global tracing subscriber.
///
/// `log_dir` enables JSON file logging in debug builds. Calling this more
/// than once panics (the subscriber can only be installed once).
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = match config {
        Some(config) if !config.debug.log_level.is_empty() => {
            format!("{},wgpu=warn,naga=warn", config.debug.log_level)
        }
        _ => DEFAULT_FILTER.to_string(),
    };

    // RUST_LOG wins over the config value.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("orrery.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_quiets_gpu_crates() {
        let filter = format!("{}", EnvFilter::new(DEFAULT_FILTER));
        assert!(filter.contains("wgpu=warn"));
        assert!(filter.contains("naga=warn"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_config_level_is_honored() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        let filter_str = format!("{},wgpu=warn,naga=warn", config.debug.log_level);
        let filter = EnvFilter::new(&filter_str);
        assert!(format!("{filter}").contains("debug"));
    }

    #[test]
    fn test_filter_strings_parse() {
        for filter_str in ["info", "debug,orrery_render=trace", "warn", "error"] {
            assert!(
                EnvFilter::try_from(filter_str).is_ok(),
                "failed to parse {filter_str}"
            );
        }
    }

    #[test]
    fn test_log_file_path_shape() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path()).unwrap();
        let path = dir.path().join("orrery.log");
        assert_eq!(path.file_name().unwrap(), "orrery.log");
    }
}
