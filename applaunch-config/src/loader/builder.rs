use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::loader::manager::{ConfigManager, ConfigPaths};

/// Split a `key=value` runtime override.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Invalid override {raw:?}: expected key=value");
    };
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        bail!("Invalid override {raw:?}: empty key segment");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Builder for creating a [`ConfigManager`] with custom overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    paths: Option<ConfigPaths>,
    config_file: Option<PathBuf>,
    cli_overrides: Vec<(String, toml::Value)>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the discovered system/user layer locations.
    pub fn paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Load this file on top of the implicit layers.
    pub fn config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    /// Add a CLI override (e.g., "launch.proxy", false).
    pub fn cli_override(mut self, key: String, value: toml::Value) -> Self {
        self.cli_overrides.push((key, value));
        self
    }

    /// Add multiple CLI overrides from string pairs.
    ///
    /// Values are parsed as TOML. If parsing fails, they are treated as strings.
    pub fn cli_overrides(mut self, overrides: &[(String, String)]) -> Self {
        for (key, value) in overrides {
            self.cli_overrides.push((key.clone(), Self::parse_value(value)));
        }
        self
    }

    pub fn build(self) -> Result<ConfigManager> {
        let paths = self.paths.unwrap_or_else(ConfigPaths::discover);
        let mut manager = match self.config_file {
            Some(config_file) => ConfigManager::load_from_file_with_paths(config_file, &paths)?,
            None => ConfigManager::load_with_paths(&paths)?,
        };

        if !self.cli_overrides.is_empty() {
            let mut runtime_toml = toml::Table::new();
            for (key, value) in self.cli_overrides {
                Self::insert_dotted_key(&mut runtime_toml, &key, value);
            }
            manager.apply_runtime_layer(runtime_toml)?;
        }

        Ok(manager)
    }

    fn parse_value(raw: &str) -> toml::Value {
        toml::from_str::<toml::Table>(&format!("value = {raw}"))
            .ok()
            .and_then(|mut table| table.remove("value"))
            .unwrap_or_else(|| toml::Value::String(raw.to_string()))
    }

    fn insert_dotted_key(table: &mut toml::Table, key: &str, value: toml::Value) {
        let Some((head, rest)) = key.split_once('.') else {
            table.insert(key.to_string(), value);
            return;
        };

        let entry = table
            .entry(head.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if !entry.is_table() {
            *entry = toml::Value::Table(toml::Table::new());
        }
        if let toml::Value::Table(child) = entry {
            Self::insert_dotted_key(child, rest, value);
        }
    }
}
