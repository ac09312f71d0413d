use std::io::Write;

use anyhow::Result;
use applaunch_core::bus::{FilterRuleCompiler, render_filter_args};
use applaunch_core::{AppId, PolicyStore};

use super::args::FiltersArgs;
use super::load_manifests;

/// Print the filter the session bus proxy would enforce.
pub fn handle_filters_command(args: &FiltersArgs, out: &mut dyn Write) -> Result<()> {
    let app_id = AppId::parse(&args.app_id)?;
    let (manifest, runtime) = load_manifests(&args.manifest)?;

    let mut stores: Vec<&dyn PolicyStore> = Vec::with_capacity(2);
    if let Some(runtime) = &runtime {
        stores.push(runtime);
    }
    stores.push(&manifest);

    let rules = FilterRuleCompiler::new().compile(&app_id, &stores);
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &rules)?;
        writeln!(out)?;
    } else {
        for arg in render_filter_args(&rules) {
            writeln!(out, "{arg}")?;
        }
    }
    Ok(())
}
