//! Layered configuration for applaunch.
//!
//! Layers, lowest precedence first: `/etc/applaunch/applaunch.toml`, the
//! user's `applaunch/applaunch.toml` under the XDG config directory, an
//! explicit file (`--config` or `APPLAUNCH_CONFIG_PATH`), then runtime
//! `key=value` overrides.

pub mod debug;
pub mod launch;
pub mod loader;

pub use debug::{DebugConfig, TraceLevel};
pub use launch::{ConfinementConfig, LaunchConfig};
pub use loader::{
    ApplaunchConfig, CONFIG_PATH_ENV, ConfigBuilder, ConfigManager, ConfigPaths, parse_override,
};
