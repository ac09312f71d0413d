//! Host socket discovery for display and audio capabilities.

use std::path::PathBuf;

use applaunch_commons::{EnvLookup, HostPaths};
use tracing::debug;

use super::grants::Access;

/// Display number from a local `DISPLAY` value (`:0`, `:1.0`).
///
/// Remote displays (`host:0`) and malformed values yield `None`.
pub fn local_display_number(display: &str) -> Option<&str> {
    let rest = display.strip_prefix(':')?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest.get(..end).filter(|digits| !digits.is_empty())
}

fn probe(path: PathBuf) -> Access {
    if path.exists() {
        Access::Socket { path }
    } else {
        debug!(path = %path.display(), "Backing socket missing");
        Access::MissingBackingResource
    }
}

pub(crate) fn discover_x11(env: &dyn EnvLookup, paths: &HostPaths) -> Access {
    let Some(value) = env.non_empty("DISPLAY") else {
        debug!("DISPLAY unset, no X11 socket");
        return Access::MissingBackingResource;
    };
    match local_display_number(&value) {
        Some(number) => probe(paths.x11_socket(number)),
        None => {
            debug!(display = %value, "DISPLAY is not a local display");
            Access::MissingBackingResource
        }
    }
}

pub(crate) fn discover_wayland(paths: &HostPaths) -> Access {
    probe(paths.wayland_socket())
}

pub(crate) fn discover_pulseaudio(paths: &HostPaths) -> Access {
    probe(paths.pulseaudio_socket())
}
