//! applaunch - prepare the launch context of a sandboxed application
//!
//! Thin binary entry point that delegates to the CLI handlers.

use std::io;

use anyhow::Result;
use applaunch::StartupContext;
use applaunch::cli::{self, args::Cli};
use clap::Parser as _;

mod main_helpers;

use main_helpers::{initialize_tracing, initialize_tracing_from_config};

fn main() -> Result<()> {
    let args = Cli::parse();

    // Installed before config loading so layer warnings reach stderr
    let filter_handle = match initialize_tracing() {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("warning: {err:#}");
            None
        }
    };

    let startup = StartupContext::from_cli_args(&args)?;
    if let Some(handle) = &filter_handle
        && let Err(err) = initialize_tracing_from_config(handle, &startup.config.debug)
    {
        eprintln!("warning: {err:#}");
    }
    if let Some(path) = &startup.config_path {
        tracing::debug!(path = %path.display(), "Loaded configuration file");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::dispatch(&startup, &args.command, &mut out)
}
