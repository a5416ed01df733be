//! The daemon: loads configuration, connects to the display, builds the
//! World Model and runs the Scheduler loop forever.
use std::path::PathBuf;
use std::{env, process};

use pytyle::config::Config;
use pytyle::dispatcher::Keymap;
use pytyle::display::X11rbDisplay;
use pytyle::ipc;
use pytyle::scheduler::Scheduler;
use pytyle::world::WorldModel;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "-v" || a == "--version") {
        println!("pytyle-{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    let config_path = explicit_config_path(&args).unwrap_or_else(default_config_path);
    if let Err(e) = run(config_path) {
        tracing::error!(error = %e, "pytyled exiting");
        process::exit(1);
    }
}

fn explicit_config_path(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// `$XDG_CONFIG_HOME/pytyle/config.toml`, falling back to
/// `$HOME/.config/pytyle/config.toml`.
fn default_config_path() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("pytyle").join("config.toml")
}

fn run(config_path: PathBuf) -> pytyle::Result<()> {
    let config = Config::load_or_default(&config_path);
    tracing::info!(path = %config_path.display(), "configuration loaded");

    let mut display = X11rbDisplay::connect()?;
    let keymap = Keymap::build(&display, &config)?;

    let mut scheduler = Scheduler::new(config, keymap, Some(config_path));
    match scheduler.listen_ipc(&ipc::socket_path()) {
        Ok(()) => tracing::info!(path = %ipc::socket_path().display(), "listening for pytylectl"),
        Err(e) => tracing::warn!(error = %e, "ipc socket unavailable, continuing without it"),
    }

    let mut world = WorldModel::new();
    scheduler.seed_world(&mut world, &display)?;
    tracing::info!(desktops = world.desktops.len(), "world model loaded, entering main loop");

    scheduler.run(&mut world, &mut display)
}
