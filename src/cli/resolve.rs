use std::io::Write;

use anyhow::{Context, Result};
use applaunch_core::PolicyStore;
use applaunch_core::resolver::{Access, BusAccess, LaunchContext};
use tracing::info;

use super::args::ResolveArgs;
use super::{build_resolver, load_manifests};
use crate::startup::StartupContext;

pub fn handle_resolve_command(
    startup: &StartupContext,
    args: &ResolveArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let (manifest, runtime) = load_manifests(&args.manifest)?;
    let resolver = build_resolver(startup);

    let context = resolver
        .resolve(
            &args.app_id,
            &manifest,
            runtime.as_ref().map(|store| store as &dyn PolicyStore),
            args.allow.as_slice(),
            args.forbid.as_slice(),
        )
        .with_context(|| format!("Failed to resolve capabilities for {}", args.app_id))?;
    info!(
        app_id = %context.app_id,
        granted = context.grants.granted_capabilities().len(),
        "Resolved launch context"
    );

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &context)?;
        writeln!(out)?;
        return Ok(());
    }
    write_context(&context, out)
}

fn describe(access: &Access) -> String {
    match access {
        Access::Denied => "denied".to_string(),
        Access::Flag => "granted".to_string(),
        Access::Socket { path } => format!("socket {}", path.display()),
        Access::MissingBackingResource => "granted (no socket)".to_string(),
        Access::Bus { bus } => match bus {
            BusAccess::Unrestricted { socket } => format!("direct {}", socket.display()),
            BusAccess::Proxied { endpoint, filtered } => {
                let mode = if *filtered { "filtered" } else { "proxied" };
                format!("{mode} {}", endpoint.display())
            }
            BusAccess::Unavailable => "unavailable".to_string(),
        },
    }
}

fn write_context(context: &LaunchContext, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", context.app_id)?;
    for (capability, grant) in context.grants.iter() {
        writeln!(out, "  {:<12} {}", capability.as_str(), describe(&grant.access))?;
    }
    writeln!(out, "launcher args: {}", context.launcher_args.join(" "))?;
    for request in context.proxy.requests() {
        writeln!(out, "proxy: {}", request.to_args().join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn describes_bus_outcomes() {
        let proxied = Access::Bus {
            bus: BusAccess::Proxied {
                endpoint: PathBuf::from("/run/user/1000/bus-proxy/session-bus-proxy-a1b2c3"),
                filtered: true,
            },
        };
        assert_eq!(
            describe(&proxied),
            "filtered /run/user/1000/bus-proxy/session-bus-proxy-a1b2c3"
        );
        assert_eq!(
            describe(&Access::Bus {
                bus: BusAccess::Unavailable
            }),
            "unavailable"
        );
        assert_eq!(describe(&Access::Denied), "denied");
    }
}
