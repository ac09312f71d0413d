//! Access policy resolution.
//!
//! [`AccessPolicyResolver`] merges a manifest's declared capabilities with
//! the caller's allow/forbid overlays and turns the result into sandbox
//! launcher arguments plus requests for the external bus proxy.

pub mod grants;
pub mod launcher_args;
pub mod proxy_plan;
pub mod resources;

use std::path::PathBuf;

use applaunch_commons::{EnvLookup, HostPaths};
use serde::Serialize;
use tracing::{debug, info};

pub use grants::{Access, BusAccess, ResolvedGrant, ResolvedGrants, evaluate, is_granted};
pub use launcher_args::{FlagSet, LauncherArgs};
pub use proxy_plan::{BusProxyPlan, ProxyRequest};

use crate::app_id::AppId;
use crate::bus::{
    FilterRuleCompiler, ProxySocketProvisioner, SESSION_BUS_TEMPLATE, SYSTEM_BUS_TEMPLATE,
    extract_local_path,
};
use crate::capability::{Capability, CapabilityOverrides};
use crate::error::ResolveError;
use crate::policy_store::PolicyStore;

const SYSTEM_BUS_ADDRESS_VAR: &str = "DBUS_SYSTEM_BUS_ADDRESS";
const SESSION_BUS_ADDRESS_VAR: &str = "DBUS_SESSION_BUS_ADDRESS";

/// Everything resolution contributes to one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchContext {
    pub app_id: AppId,
    pub grants: ResolvedGrants,
    /// Ordered sandbox launcher arguments.
    pub launcher_args: Vec<String>,
    pub proxy: BusProxyPlan,
}

impl LaunchContext {
    pub fn proxy_args(&self) -> Vec<String> {
        self.proxy.to_args()
    }
}

/// Resolves capabilities for a launch.
///
/// The proxy channel is disabled unless a provisioner is attached with
/// [`AccessPolicyResolver::with_proxy`]; without it buses that cannot be
/// passed through directly resolve to [`BusAccess::Unavailable`].
#[derive(Debug)]
pub struct AccessPolicyResolver<E> {
    env: E,
    paths: HostPaths,
    proxy: Option<ProxySocketProvisioner>,
    compiler: FilterRuleCompiler,
}

impl<E: EnvLookup> AccessPolicyResolver<E> {
    pub fn new(env: E, paths: HostPaths) -> Self {
        Self {
            env,
            paths,
            proxy: None,
            compiler: FilterRuleCompiler::new(),
        }
    }

    /// Enable the proxy channel, allocating endpoints with `provisioner`.
    pub fn with_proxy(mut self, provisioner: ProxySocketProvisioner) -> Self {
        self.proxy = Some(provisioner);
        self
    }

    /// Validate overlays and identity, then resolve every capability.
    ///
    /// Nothing is provisioned unless `allow`, `forbid` and `app_id` are all
    /// valid.
    pub fn resolve<A, F>(
        &self,
        app_id: &str,
        manifest: &dyn PolicyStore,
        runtime_manifest: Option<&dyn PolicyStore>,
        allow: &[A],
        forbid: &[F],
    ) -> Result<LaunchContext, ResolveError>
    where
        A: AsRef<str>,
        F: AsRef<str>,
    {
        let overrides = CapabilityOverrides::parse(allow, forbid)?;
        let app_id = AppId::parse(app_id)?;
        self.resolve_with(&app_id, manifest, runtime_manifest, &overrides)
    }

    /// Resolve with already validated inputs.
    pub fn resolve_with(
        &self,
        app_id: &AppId,
        manifest: &dyn PolicyStore,
        runtime_manifest: Option<&dyn PolicyStore>,
        overrides: &CapabilityOverrides,
    ) -> Result<LaunchContext, ResolveError> {
        let granted = evaluate(manifest, overrides);
        let mut args = LauncherArgs::new();
        let mut proxy = BusProxyPlan::default();
        let mut grants = ResolvedGrants::default();

        for capability in Capability::FLAG_ONLY {
            let grant = if granted.contains(&capability) {
                debug!("Allowing {capability} access");
                args.push_flag(capability);
                ResolvedGrant::granted(Access::Flag)
            } else {
                ResolvedGrant::denied()
            };
            grants.insert(capability, grant);
        }

        for capability in [Capability::X11, Capability::Wayland, Capability::Pulseaudio] {
            let grant = if granted.contains(&capability) {
                debug!("Allowing {capability} access");
                let access = match capability {
                    Capability::X11 => resources::discover_x11(&self.env, &self.paths),
                    Capability::Wayland => resources::discover_wayland(&self.paths),
                    _ => resources::discover_pulseaudio(&self.paths),
                };
                if let Access::Socket { path } = &access {
                    args.push_resource(capability, path);
                }
                ResolvedGrant::granted(access)
            } else {
                ResolvedGrant::denied()
            };
            grants.insert(capability, grant);
        }

        let system = if granted.contains(&Capability::SystemDbus) {
            debug!("Allowing system-dbus access");
            let bus = self.resolve_system_bus(&mut args, &mut proxy)?;
            ResolvedGrant::granted(Access::Bus { bus })
        } else {
            ResolvedGrant::denied()
        };
        grants.insert(Capability::SystemDbus, system);

        let session_granted = granted.contains(&Capability::SessionDbus);
        let stores: Vec<&dyn PolicyStore> = runtime_manifest
            .into_iter()
            .chain(std::iter::once(manifest))
            .collect();
        let bus =
            self.resolve_session_bus(app_id, session_granted, &stores, &mut args, &mut proxy)?;
        grants.insert(
            Capability::SessionDbus,
            ResolvedGrant {
                granted: session_granted,
                access: Access::Bus { bus },
            },
        );

        let launcher_args = args.to_vec();
        info!(
            app_id = %app_id,
            args = launcher_args.len(),
            proxied = proxy.requests().len(),
            "Resolved launch context"
        );

        Ok(LaunchContext {
            app_id: app_id.clone(),
            grants,
            launcher_args,
            proxy,
        })
    }

    fn resolve_system_bus(
        &self,
        args: &mut LauncherArgs,
        proxy: &mut BusProxyPlan,
    ) -> Result<BusAccess, ResolveError> {
        let address = self.env.non_empty(SYSTEM_BUS_ADDRESS_VAR);
        let direct = match address.as_deref() {
            Some(address) => extract_local_path(address).map(PathBuf::from),
            None => self
                .paths
                .system_bus_socket
                .exists()
                .then(|| self.paths.system_bus_socket.clone()),
        };

        if let Some(socket) = direct {
            args.push_resource(Capability::SystemDbus, &socket);
            return Ok(BusAccess::Unrestricted { socket });
        }

        match (&self.proxy, address) {
            (Some(provisioner), Some(address)) => {
                let endpoint = provisioner.provision(SYSTEM_BUS_TEMPLATE)?;
                debug!(endpoint = %endpoint.display(), "Proxying system bus");
                args.push_resource(Capability::SystemDbus, &endpoint);
                proxy.push(ProxyRequest {
                    address,
                    endpoint: endpoint.clone(),
                    filter: None,
                });
                Ok(BusAccess::Proxied {
                    endpoint,
                    filtered: false,
                })
            }
            _ => Ok(BusAccess::Unavailable),
        }
    }

    fn resolve_session_bus(
        &self,
        app_id: &AppId,
        granted: bool,
        stores: &[&dyn PolicyStore],
        args: &mut LauncherArgs,
        proxy: &mut BusProxyPlan,
    ) -> Result<BusAccess, ResolveError> {
        let Some(address) = self.env.non_empty(SESSION_BUS_ADDRESS_VAR) else {
            debug!("No session bus address");
            return Ok(BusAccess::Unavailable);
        };

        if granted && let Some(path) = extract_local_path(&address) {
            let socket = PathBuf::from(path);
            args.push_resource(Capability::SessionDbus, &socket);
            return Ok(BusAccess::Unrestricted { socket });
        }

        let Some(provisioner) = &self.proxy else {
            return Ok(BusAccess::Unavailable);
        };

        let endpoint = provisioner.provision(SESSION_BUS_TEMPLATE)?;
        let filter = (!granted).then(|| self.compiler.compile(app_id, stores));
        debug!(
            endpoint = %endpoint.display(),
            filtered = filter.is_some(),
            "Proxying session bus"
        );
        args.push_resource(Capability::SessionDbus, &endpoint);
        proxy.push(ProxyRequest {
            address,
            endpoint: endpoint.clone(),
            filter,
        });
        Ok(BusAccess::Proxied {
            endpoint,
            filtered: !granted,
        })
    }
}
