use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::debug::DebugConfig;
use crate::launch::{ConfinementConfig, LaunchConfig};

/// Effective applaunch configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplaunchConfig {
    pub launch: LaunchConfig,
    pub confinement: ConfinementConfig,
    pub debug: DebugConfig,
}

impl ApplaunchConfig {
    /// Check values serde can't express.
    pub fn validate(&self) -> Result<()> {
        let dir_name = &self.launch.proxy_dir_name;
        if dir_name.is_empty() {
            bail!("launch.proxy_dir_name must not be empty");
        }
        if dir_name.contains('/') || dir_name == "." || dir_name == ".." {
            bail!("launch.proxy_dir_name must be a single path component, got {dir_name:?}");
        }

        let prefix = &self.confinement.unit_prefix;
        if prefix.is_empty() {
            bail!("confinement.unit_prefix must not be empty");
        }
        if let Some(invalid) = prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            bail!("confinement.unit_prefix contains invalid character {invalid:?}");
        }

        Ok(())
    }
}
