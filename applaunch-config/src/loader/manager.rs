use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::loader::config::ApplaunchConfig;
use crate::loader::layers::{ConfigLayerEntry, ConfigLayerSource, ConfigLayerStack};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "APPLAUNCH_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "applaunch.toml";

/// Locations of the implicit configuration layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub system: Option<PathBuf>,
    pub user: Option<PathBuf>,
}

impl ConfigPaths {
    /// `/etc/applaunch/applaunch.toml` and `<config dir>/applaunch/applaunch.toml`.
    pub fn discover() -> Self {
        let system = cfg!(unix).then(|| PathBuf::from("/etc/applaunch").join(CONFIG_FILE_NAME));
        let user = dirs::config_dir().map(|dir| dir.join("applaunch").join(CONFIG_FILE_NAME));
        Self { system, user }
    }

    /// No implicit layers.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Loads, layers and validates configuration.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub(crate) config: ApplaunchConfig,
    config_path: Option<PathBuf>,
    pub(crate) layer_stack: ConfigLayerStack,
}

impl ConfigManager {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        Self::load_with_paths(&ConfigPaths::discover())
    }

    /// Load the implicit layers at `paths`, plus the file named by
    /// `APPLAUNCH_CONFIG_PATH` when it is set.
    pub fn load_with_paths(paths: &ConfigPaths) -> Result<Self> {
        if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
            let trimmed = config_path.trim();
            if !trimmed.is_empty() {
                return Self::load_from_file_with_paths(trimmed, paths).with_context(|| {
                    format!("Failed to load configuration from {CONFIG_PATH_ENV}={trimmed}")
                });
            }
        }

        let layer_stack = Self::implicit_layers(paths);
        if layer_stack.layers().is_empty() {
            debug!("No configuration files found, using defaults");
        }
        Self::from_layers(layer_stack).context("Configuration failed validation")
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_from_file_with_paths(path, &ConfigPaths::discover())
    }

    /// Load the implicit layers at `paths` with `path` on top.
    ///
    /// Unlike the implicit layers, the explicit file must exist and parse.
    pub fn load_from_file_with_paths(path: impl AsRef<Path>, paths: &ConfigPaths) -> Result<Self> {
        let path = path.as_ref();
        let mut layer_stack = Self::implicit_layers(paths);

        let toml = Self::load_toml_from_file(path)?;
        layer_stack.push(ConfigLayerEntry::new(
            ConfigLayerSource::Explicit {
                file: path.to_path_buf(),
            },
            toml,
        ));

        Self::from_layers(layer_stack).with_context(|| {
            format!(
                "Failed to validate effective config with file: {}",
                path.display()
            )
        })
    }

    fn implicit_layers(paths: &ConfigPaths) -> ConfigLayerStack {
        let mut layer_stack = ConfigLayerStack::default();
        let candidates = [
            paths
                .system
                .clone()
                .map(|file| ConfigLayerSource::System { file }),
            paths.user.clone().map(|file| ConfigLayerSource::User { file }),
        ];

        for source in candidates.into_iter().flatten() {
            let Some(file) = source.file().filter(|file| file.exists()) else {
                continue;
            };
            match Self::load_toml_from_file(file) {
                Ok(toml) => layer_stack.push(ConfigLayerEntry::new(source, toml)),
                Err(err) => warn!("Ignoring configuration layer: {err:#}"),
            }
        }
        layer_stack
    }

    fn from_layers(layer_stack: ConfigLayerStack) -> Result<Self> {
        let config: ApplaunchConfig = layer_stack
            .effective_config()
            .try_into()
            .context("Failed to deserialize effective configuration")?;
        config.validate()?;

        Ok(Self {
            config,
            config_path: layer_stack.last_file().map(Path::to_path_buf),
            layer_stack,
        })
    }

    pub(crate) fn apply_runtime_layer(&mut self, overrides: toml::Table) -> Result<()> {
        self.layer_stack.push(ConfigLayerEntry::new(
            ConfigLayerSource::Runtime,
            toml::Value::Table(overrides),
        ));
        self.config = self
            .layer_stack
            .effective_config()
            .try_into()
            .context("Failed to deserialize effective configuration after runtime overrides")?;
        self.config
            .validate()
            .context("Configuration failed validation after runtime overrides")
    }

    fn load_toml_from_file(path: &Path) -> Result<toml::Value> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let value: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(value)
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ApplaunchConfig {
        &self.config
    }

    /// Highest-precedence file that contributed to the configuration
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn layer_stack(&self) -> &ConfigLayerStack {
        &self.layer_stack
    }

    /// Get the effective TOML configuration
    pub fn effective_config(&self) -> toml::Value {
        self.layer_stack.effective_config()
    }
}
