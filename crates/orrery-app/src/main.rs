//! Binary entry point: parse arguments, load config, set up logging, run the
//! event loop.

mod app;

use clap::Parser;
use tracing::{error, info};
use winit::event_loop::EventLoop;

use orrery_config::{CliArgs, Config, config_dir};

fn main() {
    let args = CliArgs::parse();

    let config_dir = config_dir(args.config.as_ref());
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = dirs::data_local_dir().map(|d| d.join("orrery").join("logs"));
    orrery_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    info!(
        width = config.window.width,
        height = config.window.height,
        assets = %args.assets.display(),
        "Starting orrery"
    );

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };

    let mut app = app::App::new(config, args.assets);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop error: {e}");
        std::process::exit(1);
    }
}
