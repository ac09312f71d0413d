//! Debug and tracing configuration

use serde::{Deserialize, Serialize};

/// Trace level for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TraceLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

/// Debug and tracing configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DebugConfig {
    /// Enable structured logging to stderr
    #[serde(default)]
    pub enable_tracing: bool,

    /// Trace level (error, warn, info, debug, trace)
    #[serde(default)]
    pub trace_level: TraceLevel,

    /// Tracing targets to enable, e.g. "applaunch_core::resolver".
    /// Empty enables every target at `trace_level`.
    #[serde(default)]
    pub trace_targets: Vec<String>,
}

impl DebugConfig {
    /// `EnvFilter` directive string for this configuration.
    pub fn filter_directives(&self) -> String {
        if self.trace_targets.is_empty() {
            return self.trace_level.as_str().to_string();
        }
        self.trace_targets
            .iter()
            .map(|target| format!("{target}={}", self.trace_level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_level_parsing() {
        assert_eq!(TraceLevel::parse("error"), Some(TraceLevel::Error));
        assert_eq!(TraceLevel::parse("WARN"), Some(TraceLevel::Warn));
        assert_eq!(TraceLevel::parse(" debug "), Some(TraceLevel::Debug));
        assert_eq!(TraceLevel::parse("verbose"), None);
    }

    #[test]
    fn test_unknown_level_falls_back_to_default() {
        let config: DebugConfig = toml::from_str("trace_level = \"loud\"").unwrap();
        assert_eq!(config.trace_level, TraceLevel::Warn);
    }

    #[test]
    fn test_filter_directives() {
        let mut config = DebugConfig {
            enable_tracing: true,
            trace_level: TraceLevel::Debug,
            trace_targets: Vec::new(),
        };
        assert_eq!(config.filter_directives(), "debug");

        config.trace_targets = vec![
            "applaunch_core::resolver".to_string(),
            "applaunch_core::confinement".to_string(),
        ];
        assert_eq!(
            config.filter_directives(),
            "applaunch_core::resolver=debug,applaunch_core::confinement=debug"
        );
    }
}
