use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use applaunch_commons::ProcessEnv;
use applaunch_core::bus::ProxySocketProvisioner;
use applaunch_core::{AccessPolicyResolver, ManifestStore};

use crate::startup::StartupContext;

pub mod args;
pub mod env;
pub mod filters;
pub mod register;
pub mod resolve;
pub mod verify;

use args::{Commands, ManifestArgs};

pub use env::handle_env_command;
pub use filters::handle_filters_command;
pub use register::handle_register_command;
pub use resolve::handle_resolve_command;
pub use verify::handle_verify_command;

/// Run one subcommand, writing its output to `out`.
pub fn dispatch(startup: &StartupContext, command: &Commands, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Resolve(args) => handle_resolve_command(startup, args, out),
        Commands::Filters(args) => handle_filters_command(args, out),
        Commands::Env(args) => handle_env_command(args, out),
        Commands::Register(args) => handle_register_command(startup, args, out),
        Commands::Verify(args) => handle_verify_command(args, out),
    }
}

pub(crate) fn load_manifest(path: &Path) -> Result<ManifestStore> {
    ManifestStore::load(path)
        .with_context(|| format!("Failed to load manifest '{}'", path.display()))
}

/// Application manifest and optional runtime manifest.
pub(crate) fn load_manifests(args: &ManifestArgs) -> Result<(ManifestStore, Option<ManifestStore>)> {
    let manifest = load_manifest(&args.manifest)?;
    let runtime = args
        .runtime_manifest
        .as_deref()
        .map(load_manifest)
        .transpose()?;
    Ok((manifest, runtime))
}

/// Resolver for the process environment, configured from `[launch]`.
pub(crate) fn build_resolver(startup: &StartupContext) -> AccessPolicyResolver<ProcessEnv> {
    let launch = &startup.config.launch;
    let paths = launch.host_paths(&ProcessEnv);
    let provisioner = launch
        .proxy
        .then(|| ProxySocketProvisioner::in_runtime_dir(&paths, &launch.proxy_dir_name));

    let resolver = AccessPolicyResolver::new(ProcessEnv, paths);
    match provisioner {
        Some(provisioner) => resolver.with_proxy(provisioner),
        None => resolver,
    }
}
