//! Per-capability resolution results.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::capability::{Capability, CapabilityOverrides};
use crate::policy_store::{ENVIRONMENT_SECTION, PolicyStore};

/// How a message bus is exposed to the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum BusAccess {
    /// The host socket is passed through directly.
    Unrestricted { socket: PathBuf },
    /// Traffic flows through a proxy endpoint; `filtered` proxies enforce rules.
    Proxied { endpoint: PathBuf, filtered: bool },
    /// Neither a direct socket nor a proxy could be offered.
    Unavailable,
}

/// What the launch receives for one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Access {
    /// Not granted.
    Denied,
    /// Granted as a launcher option letter.
    Flag,
    /// Granted with a discovered host socket.
    Socket { path: PathBuf },
    /// Granted, but the backing socket does not exist; nothing is passed.
    MissingBackingResource,
    /// Message bus outcome.
    Bus { bus: BusAccess },
}

/// Resolution result for one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGrant {
    /// Outcome of the manifest/allow/forbid rule.
    pub granted: bool,
    pub access: Access,
}

impl ResolvedGrant {
    pub fn denied() -> Self {
        Self {
            granted: false,
            access: Access::Denied,
        }
    }

    pub fn granted(access: Access) -> Self {
        Self {
            granted: true,
            access,
        }
    }

    /// Bus outcome, if this is a bus capability.
    pub fn bus(&self) -> Option<&BusAccess> {
        match &self.access {
            Access::Bus { bus } => Some(bus),
            _ => None,
        }
    }
}

/// Grants for every capability of one launch.
///
/// Built once by the resolver and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedGrants {
    entries: BTreeMap<Capability, ResolvedGrant>,
}

impl ResolvedGrants {
    pub(crate) fn insert(&mut self, capability: Capability, grant: ResolvedGrant) {
        self.entries.insert(capability, grant);
    }

    pub fn get(&self, capability: Capability) -> Option<&ResolvedGrant> {
        self.entries.get(&capability)
    }

    pub fn is_granted(&self, capability: Capability) -> bool {
        self.get(capability).is_some_and(|grant| grant.granted)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, &ResolvedGrant)> {
        self.entries.iter().map(|(capability, grant)| (*capability, grant))
    }

    /// Capabilities whose grant rule evaluated to true.
    pub fn granted_capabilities(&self) -> BTreeSet<Capability> {
        self.iter()
            .filter(|(_, grant)| grant.granted)
            .map(|(capability, _)| capability)
            .collect()
    }
}

/// The grant rule: declared or allowed, and never forbidden.
pub fn is_granted(
    manifest: &dyn PolicyStore,
    overrides: &CapabilityOverrides,
    capability: Capability,
) -> bool {
    let declared = manifest.get_bool(ENVIRONMENT_SECTION, capability.as_str());
    (declared || overrides.is_allowed(capability)) && !overrides.is_forbidden(capability)
}

/// Apply the grant rule to every capability.
pub fn evaluate(manifest: &dyn PolicyStore, overrides: &CapabilityOverrides) -> BTreeSet<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| is_granted(manifest, overrides, *capability))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy_store::ManifestStore;

    fn manifest(declared: &[(&str, bool)]) -> ManifestStore {
        declared
            .iter()
            .fold(ManifestStore::new(), |store, (name, value)| {
                store.with(ENVIRONMENT_SECTION, *name, *value)
            })
    }

    #[test]
    fn forbid_overrides_declaration() {
        let store = manifest(&[("x11", true)]);
        let overrides = CapabilityOverrides::parse::<&str, _>(&[], &["x11"]).unwrap();
        assert!(!is_granted(&store, &overrides, Capability::X11));
    }

    #[test]
    fn forbid_overrides_allow() {
        let store = manifest(&[]);
        let overrides = CapabilityOverrides::none()
            .allow(Capability::Network)
            .forbid(Capability::Network);
        assert!(!is_granted(&store, &overrides, Capability::Network));
    }

    #[test]
    fn declared_or_allowed_suffices() {
        let store = manifest(&[("ipc", true), ("dri", false)]);
        let overrides = CapabilityOverrides::none().allow(Capability::Dri);
        let granted = evaluate(&store, &overrides);
        assert_eq!(
            granted,
            BTreeSet::from([Capability::Ipc, Capability::Dri])
        );
    }

    #[test]
    fn rule_is_uniform_across_capabilities() {
        for capability in Capability::ALL {
            let declared = manifest(&[(capability.as_str(), true)]);
            let empty = manifest(&[]);
            let allow = CapabilityOverrides::none().allow(capability);
            let forbid = CapabilityOverrides::none().allow(capability).forbid(capability);

            assert!(is_granted(&declared, &CapabilityOverrides::none(), capability));
            assert!(is_granted(&empty, &allow, capability));
            assert!(!is_granted(&declared, &forbid, capability));
            assert!(!is_granted(&empty, &CapabilityOverrides::none(), capability));
        }
    }
}
