//! Jewelcase server
//!
//! Server-rendered jewelry catalog backed by a headless CMS.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use jewelcase::Config;

/// Command-line interface for Jewelcase.
#[derive(Parser)]
#[command(
    name = "jewelcase",
    version,
    about = "Server-rendered jewelry catalog backed by a headless CMS"
)]
struct Cli {
    /// Path to configuration file (skipped when absent)
    #[arg(short, long, default_value = "jewelcase.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    jewelcase::init_tracing(cli.verbose);

    let config = Config::load(Some(cli.config.as_path())).wrap_err("Failed to load configuration")?;
    jewelcase::server::run(config).await
}
