//! Configuration loading for a CLI invocation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use applaunch_config::{ApplaunchConfig, ConfigBuilder, parse_override};

use crate::cli::args::Cli;

/// Loaded configuration shared by the command handlers.
#[derive(Debug, Clone)]
pub struct StartupContext {
    pub config: ApplaunchConfig,
    /// Explicit configuration file, when one was loaded.
    pub config_path: Option<PathBuf>,
}

impl StartupContext {
    pub fn from_cli_args(args: &Cli) -> Result<Self> {
        let (config_path, overrides) = parse_cli_config_entries(&args.config)?;

        let mut builder = ConfigBuilder::new();
        if let Some(path) = config_path {
            builder = builder.config_file(path);
        }
        if !overrides.is_empty() {
            builder = builder.cli_overrides(&overrides);
        }

        let manager = builder.build().context("Failed to load configuration")?;
        Ok(Self {
            config: manager.config().clone(),
            config_path: manager.config_path().map(PathBuf::from),
        })
    }

    /// Defaults only, for handler tests.
    pub fn with_config(config: ApplaunchConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }
}

/// Split `--config` entries into at most one file path and `key=value`
/// overrides.
fn parse_cli_config_entries(entries: &[String]) -> Result<(Option<PathBuf>, Vec<(String, String)>)> {
    let mut config_path: Option<PathBuf> = None;
    let mut overrides = Vec::new();

    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.contains('=') {
            overrides.push(parse_override(trimmed)?);
        } else if let Some(existing) = &config_path {
            bail!(
                "Only one configuration file may be given (got '{}' and '{trimmed}')",
                existing.display()
            );
        } else {
            config_path = Some(PathBuf::from(trimmed));
        }
    }

    Ok((config_path, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|entry| (*entry).to_string()).collect()
    }

    #[test]
    fn splits_paths_from_overrides() {
        let (path, overrides) = parse_cli_config_entries(&entries(&[
            "custom.toml",
            " confinement.enabled = false ",
            "",
        ]))
        .unwrap();

        assert_eq!(path, Some(PathBuf::from("custom.toml")));
        assert_eq!(
            overrides,
            vec![("confinement.enabled".to_string(), "false".to_string())]
        );
    }

    #[test]
    fn rejects_second_config_file() {
        let err = parse_cli_config_entries(&entries(&["a.toml", "b.toml"])).unwrap_err();
        assert!(err.to_string().contains("b.toml"));
    }

    #[test]
    fn rejects_empty_override_key() {
        assert!(parse_cli_config_entries(&entries(&["=true"])).is_err());
    }
}
