//! Command-line arguments for the `applaunch` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "applaunch")]
#[command(about = "Prepare the launch context of a sandboxed application")]
#[command(version)]
pub struct Cli {
    /// Configuration file, or a `key=value` override such as
    /// `launch.proxy=false` (can be repeated)
    #[arg(short, long, value_name = "PATH|KEY=VALUE", global = true)]
    pub config: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Resolve capability grants, launcher arguments and bus proxies.
    Resolve(ResolveArgs),

    /// Print the session bus filter rules for an application.
    Filters(FiltersArgs),

    /// Print the environment the application is started with.
    Env(EnvArgs),

    /// Place a running process in a transient systemd scope.
    Register(RegisterArgs),

    /// Check that capability names are known.
    Verify(VerifyArgs),
}

/// Manifest inputs shared by commands that read policy stores.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Application metadata (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Runtime metadata (TOML); its bus policy takes priority
    #[arg(long, value_name = "PATH")]
    pub runtime_manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ResolveArgs {
    /// Application id, e.g. `org.gnome.Maps`
    pub app_id: String,

    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Grant capabilities the manifest does not declare
    #[arg(long, value_delimiter = ',', value_name = "CAPS")]
    pub allow: Vec<String>,

    /// Withhold capabilities even when declared or allowed
    #[arg(long, value_delimiter = ',', value_name = "CAPS")]
    pub forbid: Vec<String>,

    /// Output the launch context as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FiltersArgs {
    pub app_id: String,

    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Output the rules as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EnvArgs {
    pub app_id: String,

    /// Application metadata whose `Environment Vars` are applied
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Use the developer exports and skip locale variables
    #[arg(long)]
    pub devel: bool,

    /// Create the application's data directory
    #[arg(long)]
    pub ensure_data_dir: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    pub app_id: String,

    /// Process to place in the scope
    #[arg(long)]
    pub pid: u32,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Capability names (comma separated or repeated)
    #[arg(value_delimiter = ',', required = true)]
    pub capabilities: Vec<String>,
}
