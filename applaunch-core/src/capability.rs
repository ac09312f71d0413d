//! The closed set of optional host resources an application may be granted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// One optional host resource.
///
/// The set is closed: any name outside of it is rejected with
/// [`ResolveError::InvalidCapability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    X11,
    Wayland,
    Ipc,
    Pulseaudio,
    SystemDbus,
    SessionDbus,
    Network,
    HostFs,
    Homedir,
    Dri,
}

impl Capability {
    /// Every capability, in manifest declaration order.
    pub const ALL: [Capability; 10] = [
        Self::X11,
        Self::Wayland,
        Self::Ipc,
        Self::Pulseaudio,
        Self::SystemDbus,
        Self::SessionDbus,
        Self::Network,
        Self::HostFs,
        Self::Homedir,
        Self::Dri,
    ];

    /// Capabilities that map to a single launcher option letter, in the order
    /// the letters appear in the combined option token.
    pub const FLAG_ONLY: [Capability; 5] = [
        Self::Ipc,
        Self::Dri,
        Self::HostFs,
        Self::Homedir,
        Self::Network,
    ];

    /// Canonical manifest name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X11 => "x11",
            Self::Wayland => "wayland",
            Self::Ipc => "ipc",
            Self::Pulseaudio => "pulseaudio",
            Self::SystemDbus => "system-dbus",
            Self::SessionDbus => "session-dbus",
            Self::Network => "network",
            Self::HostFs => "host-fs",
            Self::Homedir => "homedir",
            Self::Dri => "dri",
        }
    }

    /// Launcher option letter for flag-only capabilities.
    pub fn flag(self) -> Option<char> {
        match self {
            Self::Ipc => Some('i'),
            Self::Dri => Some('g'),
            Self::HostFs => Some('f'),
            Self::Homedir => Some('H'),
            Self::Network => Some('n'),
            _ => None,
        }
    }

    /// Launcher option that precedes an endpoint path for resource capabilities.
    pub fn resource_option(self) -> Option<&'static str> {
        match self {
            Self::X11 => Some("-x"),
            Self::Wayland => Some("-y"),
            Self::Pulseaudio => Some("-p"),
            Self::SystemDbus => Some("-D"),
            Self::SessionDbus => Some("-d"),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ResolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| ResolveError::InvalidCapability(value.to_string()))
    }
}

/// Check that every name in `keys` is a known capability.
///
/// Returns the first unknown name as [`ResolveError::InvalidCapability`].
pub fn verify_environment_keys<S: AsRef<str>>(keys: &[S]) -> Result<(), ResolveError> {
    for key in keys {
        key.as_ref().parse::<Capability>()?;
    }
    Ok(())
}

/// Caller-supplied allow and forbid overlays, validated against the closed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityOverrides {
    allow: BTreeSet<Capability>,
    forbid: BTreeSet<Capability>,
}

impl CapabilityOverrides {
    /// No overrides; the manifest decides alone.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse raw allow and forbid names.
    ///
    /// Fails on the first unrecognized token, allow list first.
    pub fn parse<A, F>(allow: &[A], forbid: &[F]) -> Result<Self, ResolveError>
    where
        A: AsRef<str>,
        F: AsRef<str>,
    {
        let allow = allow
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<_, _>>()?;
        let forbid = forbid
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(Self { allow, forbid })
    }

    /// Builder: allow `capability`.
    pub fn allow(mut self, capability: Capability) -> Self {
        self.allow.insert(capability);
        self
    }

    /// Builder: forbid `capability`.
    pub fn forbid(mut self, capability: Capability) -> Self {
        self.forbid.insert(capability);
        self
    }

    pub fn is_allowed(&self, capability: Capability) -> bool {
        self.allow.contains(&capability)
    }

    pub fn is_forbidden(&self, capability: Capability) -> bool {
        self.forbid.contains(&capability)
    }
}
