//! Launch-context and confinement settings

use std::path::PathBuf;
use std::time::Duration;

use applaunch_commons::paths::{DEFAULT_SYSTEM_BUS_SOCKET, DEFAULT_X11_SOCKET_DIR};
use applaunch_commons::{EnvLookup, HostPaths};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROXY_DIR_NAME: &str = "bus-proxy";
pub const DEFAULT_UNIT_PREFIX: &str = "applaunch";
pub const DEFAULT_JOB_TIMEOUT_SECS: u64 = 30;

/// `[launch]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Offer bus proxies when a bus can't be passed through directly
    pub proxy: bool,

    /// Overrides `XDG_RUNTIME_DIR`
    pub runtime_dir: Option<PathBuf>,

    /// Directory under the runtime dir holding proxy endpoints
    pub proxy_dir_name: String,

    pub x11_socket_dir: PathBuf,

    /// Used when `DBUS_SYSTEM_BUS_ADDRESS` is unset
    pub system_bus_socket: PathBuf,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            proxy: true,
            runtime_dir: None,
            proxy_dir_name: DEFAULT_PROXY_DIR_NAME.to_string(),
            x11_socket_dir: PathBuf::from(DEFAULT_X11_SOCKET_DIR),
            system_bus_socket: PathBuf::from(DEFAULT_SYSTEM_BUS_SOCKET),
        }
    }
}

impl LaunchConfig {
    /// Host locations for this configuration, falling back to `env` for the
    /// runtime directory.
    pub fn host_paths(&self, env: &dyn EnvLookup) -> HostPaths {
        let paths = match &self.runtime_dir {
            Some(dir) => HostPaths::with_runtime_dir(dir),
            None => HostPaths::from_env(env),
        };
        paths
            .x11_socket_dir(&self.x11_socket_dir)
            .system_bus_socket(&self.system_bus_socket)
    }
}

/// `[confinement]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfinementConfig {
    pub enabled: bool,

    /// Transient scopes are named `<unit_prefix>-<app_id>-<pid>.scope`
    pub unit_prefix: String,

    /// Completion wait bound; 0 waits indefinitely
    pub job_timeout_secs: u64,
}

impl Default for ConfinementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            unit_prefix: DEFAULT_UNIT_PREFIX.to_string(),
            job_timeout_secs: DEFAULT_JOB_TIMEOUT_SECS,
        }
    }
}

impl ConfinementConfig {
    pub fn job_timeout(&self) -> Option<Duration> {
        (self.job_timeout_secs > 0).then(|| Duration::from_secs(self.job_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use applaunch_commons::StaticEnv;

    #[test]
    fn test_runtime_dir_override_wins() {
        let env = StaticEnv::new().with("XDG_RUNTIME_DIR", "/run/user/1000");
        let config = LaunchConfig {
            runtime_dir: Some(PathBuf::from("/tmp/rt")),
            ..LaunchConfig::default()
        };
        assert_eq!(config.host_paths(&env).runtime_dir, PathBuf::from("/tmp/rt"));

        let paths = LaunchConfig::default().host_paths(&env);
        assert_eq!(paths.runtime_dir, PathBuf::from("/run/user/1000"));
        assert_eq!(paths.x11_socket_dir, PathBuf::from("/tmp/.X11-unix"));
    }

    #[test]
    fn test_zero_timeout_waits_indefinitely() {
        let mut config = ConfinementConfig::default();
        assert_eq!(config.job_timeout(), Some(Duration::from_secs(30)));
        config.job_timeout_secs = 0;
        assert_eq!(config.job_timeout(), None);
    }
}
