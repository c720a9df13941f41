use std::path::PathBuf;

use clap::Parser;
use derive_more::From;
use rote::OptionSet;
use thiserror::Error;

mod app;
mod config;
mod library;
mod logging;
mod page;
mod stats;
mod utils;

use app::App;
use config::{Config, ConfigError, Overrides};

/// Drill code templates into muscle memory, right in your terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding settings.toml and templates/
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma separated options to start with, replacing `default_options`.
    /// One of power-mode, repeat (or back-to-back), randomization, instant-death
    #[arg(short, long)]
    options: Option<OptionSet>,

    /// Category shown first in the menu
    #[arg(long)]
    category: Option<u32>,

    /// Log filter, like `debug` or `rote=trace`. Defaults to ROTETYPE_LOG, then `info`
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, From, Error)]
enum RunError {
    #[error("{0}")]
    Config(ConfigError),

    #[error("Terminal error: {0}")]
    Io(std::io::Error),
}

fn main() -> Result<(), RunError> {
    let cli = Cli::parse();

    let log_dir = cli.config.clone().or_else(|| {
        config::project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
    });
    let _guard = log_dir.and_then(|dir| logging::init(&dir, cli.log_level.as_deref()));

    let config = Config::get(Overrides {
        directory: cli.config,
        options: cli.options,
        category: cli.category,
    })
    .inspect_err(|error| tracing::error!(%error, "could not load configuration"))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");
    App::new(config).run()?;
    tracing::info!("exiting");

    Ok(())
}
