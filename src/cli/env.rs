use std::io::Write;

use anyhow::{Context, Result};
use applaunch_commons::ProcessEnv;
use applaunch_core::AppId;
use applaunch_core::environ::{
    app_data_dir, apply_app_dirs, apply_manifest_env_vars, ensure_app_data_dir, minimal_env,
};

use super::args::EnvArgs;
use super::load_manifest;

/// Print the application's launch environment as `KEY=value` lines.
pub fn handle_env_command(args: &EnvArgs, out: &mut dyn Write) -> Result<()> {
    let app_id = AppId::parse(&args.app_id)?;
    let home = dirs::home_dir().context("Could not determine the home directory")?;

    let app_dir = if args.ensure_data_dir {
        ensure_app_data_dir(&home, &app_id)
            .with_context(|| format!("Failed to create data directory for {app_id}"))?
    } else {
        app_data_dir(&home, &app_id)
    };

    let mut launch_env = minimal_env(&ProcessEnv, args.devel);
    apply_app_dirs(&mut launch_env, &app_dir);
    if let Some(path) = &args.manifest {
        let manifest = load_manifest(path)?;
        apply_manifest_env_vars(&mut launch_env, &manifest);
    }

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &launch_env)?;
        writeln!(out)?;
    } else {
        for entry in launch_env.to_envp() {
            writeln!(out, "{entry}")?;
        }
    }
    Ok(())
}
