//! Runtime path resolution for the invoking user.
//!
//! - Runtime directory: `$XDG_RUNTIME_DIR`, falling back to `/run/user/<uid>`
//! - X11 sockets: `/tmp/.X11-unix`
//! - System bus socket: `/var/run/dbus/system_bus_socket`
//! - systemd user manager private socket: `/run/user/<uid>/systemd/private`

use std::path::{Path, PathBuf};

use crate::env::EnvLookup;

/// Default directory holding X11 display sockets.
pub const DEFAULT_X11_SOCKET_DIR: &str = "/tmp/.X11-unix";

/// Well-known location of the system message bus socket.
pub const DEFAULT_SYSTEM_BUS_SOCKET: &str = "/var/run/dbus/system_bus_socket";

/// Get the current user's UID
pub fn current_uid() -> u32 {
    #[cfg(unix)]
    {
        nix::unistd::getuid().as_raw()
    }
    #[cfg(not(unix))]
    {
        0
    }
}

/// Per-user runtime directory.
///
/// Uses `XDG_RUNTIME_DIR` when set, otherwise `/run/user/<uid>`.
pub fn runtime_dir(env: &dyn EnvLookup) -> PathBuf {
    env.non_empty("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("/run/user/{}", current_uid())))
}

/// Private socket of the per-user systemd instance.
pub fn systemd_private_socket(uid: u32) -> PathBuf {
    PathBuf::from(format!("/run/user/{uid}/systemd/private"))
}

/// Host locations probed while resolving resource grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// Per-user runtime directory (wayland, pulseaudio, bus proxies).
    pub runtime_dir: PathBuf,
    /// Directory containing `X<n>` display sockets.
    pub x11_socket_dir: PathBuf,
    /// System bus socket used when `DBUS_SYSTEM_BUS_ADDRESS` is unset.
    pub system_bus_socket: PathBuf,
}

impl HostPaths {
    /// Paths for the invoking user, with the runtime directory taken from `env`.
    pub fn from_env(env: &dyn EnvLookup) -> Self {
        Self::with_runtime_dir(runtime_dir(env))
    }

    /// Default host paths anchored at an explicit runtime directory.
    pub fn with_runtime_dir(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime_dir: runtime_dir.into(),
            x11_socket_dir: PathBuf::from(DEFAULT_X11_SOCKET_DIR),
            system_bus_socket: PathBuf::from(DEFAULT_SYSTEM_BUS_SOCKET),
        }
    }

    /// Builder: override the X11 socket directory.
    pub fn x11_socket_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.x11_socket_dir = dir.into();
        self
    }

    /// Builder: override the system bus socket location.
    pub fn system_bus_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_bus_socket = path.into();
        self
    }

    /// Wayland compositor socket.
    pub fn wayland_socket(&self) -> PathBuf {
        self.runtime_dir.join("wayland-0")
    }

    /// PulseAudio native protocol socket.
    pub fn pulseaudio_socket(&self) -> PathBuf {
        self.runtime_dir.join("pulse").join("native")
    }

    /// X11 socket for display number `display`.
    pub fn x11_socket(&self, display: &str) -> PathBuf {
        self.x11_socket_dir.join(format!("X{display}"))
    }

    /// Directory under the runtime directory named `name`.
    pub fn runtime_subdir(&self, name: impl AsRef<Path>) -> PathBuf {
        self.runtime_dir.join(name)
    }
}
