//! Read-only access to permission manifests.
//!
//! A manifest is a set of named sections, each an ordered list of key/value
//! entries. The resolver reads the `Environment` section, the filter compiler
//! reads `Session Bus Policy`, and the launch environment helpers read
//! `Environment Vars`.

use std::path::Path;

use indexmap::IndexMap;

/// Section mapping capability names to booleans.
pub const ENVIRONMENT_SECTION: &str = "Environment";

/// Section mapping bus names (or `name.*` wildcards) to policy verbs.
pub const SESSION_BUS_POLICY_SECTION: &str = "Session Bus Policy";

/// Section mapping environment variable names to values.
pub const ENVIRONMENT_VARS_SECTION: &str = "Environment Vars";

/// Key-value-section store the core reads launch policy from.
pub trait PolicyStore {
    /// Boolean value of `key` in `section`; `false` when missing or not a boolean.
    fn get_bool(&self, section: &str, key: &str) -> bool;

    /// String value of `key` in `section`, if present and textual.
    fn get_str(&self, section: &str, key: &str) -> Option<&str>;

    /// Keys of `section` in declaration order; empty when the section is absent.
    fn keys(&self, section: &str) -> Vec<&str>;
}

/// Error loading a manifest from disk.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// In-memory manifest keeping sections and entries in declaration order.
///
/// Loaded from TOML where each table is a section:
///
/// ```toml
/// [Environment]
/// x11 = true
/// network = false
///
/// ["Session Bus Policy"]
/// "org.freedesktop.Notifications" = "talk"
/// "org.mpris.MediaPlayer2.*" = "own"
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestStore {
    sections: IndexMap<String, IndexMap<String, toml::Value>>,
}

impl ManifestStore {
    /// Empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let sections = toml::from_str(content)?;
        Ok(Self { sections })
    }

    /// Read and parse a manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Builder: set `key` in `section`, appending it if new.
    pub fn with(
        mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<toml::Value>,
    ) -> Self {
        self.set(section, key, value);
        self
    }

    /// Set `key` in `section`, appending it if new.
    pub fn set(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<toml::Value>,
    ) {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Raw value of `key` in `section`.
    pub fn get(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.sections.get(section)?.get(key)
    }
}

impl PolicyStore for ManifestStore {
    fn get_bool(&self, section: &str, key: &str) -> bool {
        match self.get(section, key) {
            Some(toml::Value::Boolean(value)) => *value,
            Some(toml::Value::String(value)) => value.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn get_str(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).and_then(toml::Value::as_str)
    }

    fn keys(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(section)
            .map(|entries| entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[Environment]
x11 = true
network = false
ipc = "true"

["Session Bus Policy"]
"org.freedesktop.Notifications" = "talk"
"org.mpris.MediaPlayer2.*" = "own"
"com.example.Zeta" = "see"
"#;

    #[test]
    fn reads_booleans_leniently() {
        let store = ManifestStore::from_toml_str(MANIFEST).unwrap();
        assert!(store.get_bool(ENVIRONMENT_SECTION, "x11"));
        assert!(!store.get_bool(ENVIRONMENT_SECTION, "network"));
        assert!(store.get_bool(ENVIRONMENT_SECTION, "ipc"));
        assert!(!store.get_bool(ENVIRONMENT_SECTION, "wayland"));
        assert!(!store.get_bool("Missing", "x11"));
    }

    #[test]
    fn preserves_declaration_order() {
        let store = ManifestStore::from_toml_str(MANIFEST).unwrap();
        assert_eq!(
            store.keys(SESSION_BUS_POLICY_SECTION),
            vec![
                "org.freedesktop.Notifications",
                "org.mpris.MediaPlayer2.*",
                "com.example.Zeta",
            ]
        );
        assert_eq!(
            store.get_str(SESSION_BUS_POLICY_SECTION, "com.example.Zeta"),
            Some("see")
        );
        assert!(store.keys("Missing").is_empty());
    }

    #[test]
    fn builder_appends_entries() {
        let store = ManifestStore::new()
            .with(ENVIRONMENT_SECTION, "dri", true)
            .with(SESSION_BUS_POLICY_SECTION, "org.foo.*", "talk");
        assert!(store.get_bool(ENVIRONMENT_SECTION, "dri"));
        assert_eq!(store.get_str(SESSION_BUS_POLICY_SECTION, "org.foo.*"), Some("talk"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestStore::load(dir.path().join("metadata.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
