//! Environment and data directories for the sandboxed process.

use std::path::{Path, PathBuf};

use applaunch_commons::EnvLookup;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::app_id::AppId;
use crate::policy_store::{ENVIRONMENT_VARS_SECTION, PolicyStore};

const DEFAULT_EXPORTS: &[(&str, &str)] = &[
    ("PATH", "/app/bin:/usr/bin"),
    ("LD_LIBRARY_PATH", ""),
    ("_LD_LIBRARY_PATH", "/app/lib"),
    ("XDG_CONFIG_DIRS", "/app/etc/xdg:/etc/xdg"),
    ("XDG_DATA_DIRS", "/app/share:/usr/share"),
    ("GI_TYPELIB_PATH", "/app/lib/girepository-1.0"),
    ("SHELL", "/bin/sh"),
];

const DEVEL_EXPORTS: &[(&str, &str)] = &[
    ("ACLOCAL_PATH", "/app/share/aclocal"),
    ("C_INCLUDE_PATH", "/app/include"),
    ("CPLUS_INCLUDE_PATH", "/app/include"),
    ("LDFLAGS", "-L/app/lib "),
    (
        "PKG_CONFIG_PATH",
        "/app/lib/pkgconfig:/app/share/pkgconfig:/usr/lib/pkgconfig:/usr/share/pkgconfig",
    ),
    ("LC_ALL", "en_US.utf8"),
];

/// Session variables carried over from the host.
const SESSION_VARS: &[&str] = &[
    "GDMSESSION",
    "XDG_CURRENT_DESKTOP",
    "XDG_SESSION_DESKTOP",
    "DESKTOP_SESSION",
    "EMAIL_ADDRESS",
    "HOME",
    "HOSTNAME",
    "LOGNAME",
    "REAL_NAME",
    "TERM",
    "USER",
    "USERNAME",
];

/// Locale variables; developer environments pin `LC_ALL` instead.
const LOCALE_VARS: &[&str] = &[
    "LANG",
    "LANGUAGE",
    "LC_ALL",
    "LC_ADDRESS",
    "LC_COLLATE",
    "LC_CTYPE",
    "LC_IDENTIFICATION",
    "LC_MEASUREMENT",
    "LC_MESSAGES",
    "LC_MONETARY",
    "LC_NAME",
    "LC_NUMERIC",
    "LC_PAPER",
    "LC_TELEPHONE",
    "LC_TIME",
];

const LD_LIBRARY_PATH: &str = "LD_LIBRARY_PATH";
const HELPER_LD_LIBRARY_PATH: &str = "_LD_LIBRARY_PATH";

/// Ordered environment for the launched process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LaunchEnv {
    vars: IndexMap<String, String>,
}

impl LaunchEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn unset(&mut self, key: &str) {
        self.vars.shift_remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// `KEY=VALUE` entries in insertion order.
    pub fn to_envp(&self) -> Vec<String> {
        self.iter().map(|(key, value)| format!("{key}={value}")).collect()
    }
}

/// Baseline environment: default exports, developer exports when `devel`,
/// then session (and, outside developer mode, locale) variables from `env`.
pub fn minimal_env(env: &dyn EnvLookup, devel: bool) -> LaunchEnv {
    let mut launch_env = LaunchEnv::new();
    for (key, value) in DEFAULT_EXPORTS {
        launch_env.set(*key, *value);
    }
    if devel {
        for (key, value) in DEVEL_EXPORTS {
            launch_env.set(*key, *value);
        }
    }

    let locale: &[&str] = if devel { &[] } else { LOCALE_VARS };
    for key in SESSION_VARS.iter().chain(locale) {
        if let Some(value) = env.var(key) {
            launch_env.set(*key, value);
        }
    }
    launch_env
}

/// Overwrite the default exports in `launch_env`.
pub fn apply_env_defaults(launch_env: &mut LaunchEnv) {
    for (key, value) in DEFAULT_EXPORTS {
        launch_env.set(*key, *value);
    }
}

/// Point the XDG base directories at the application's data directory.
pub fn apply_app_dirs(launch_env: &mut LaunchEnv, app_dir: &Path) {
    for (key, child) in [
        ("XDG_DATA_HOME", "data"),
        ("XDG_CONFIG_HOME", "config"),
        ("XDG_CACHE_HOME", "cache"),
    ] {
        launch_env.set(key, app_dir.join(child).display().to_string());
    }
}

/// Apply the manifest's `Environment Vars` section.
///
/// `LD_LIBRARY_PATH` is stored as `_LD_LIBRARY_PATH` so it reaches the
/// application but not the sandbox helper. Entries without a string value
/// unset the variable.
pub fn apply_manifest_env_vars(launch_env: &mut LaunchEnv, store: &dyn PolicyStore) {
    for key in store.keys(ENVIRONMENT_VARS_SECTION) {
        let target = if key == LD_LIBRARY_PATH {
            HELPER_LD_LIBRARY_PATH
        } else {
            key
        };
        match store.get_str(ENVIRONMENT_VARS_SECTION, key) {
            Some(value) => launch_env.set(target, value),
            None => launch_env.unset(target),
        }
    }
}

/// `<home>/.var/app/<app_id>`
pub fn app_data_dir(home: &Path, app_id: &AppId) -> PathBuf {
    home.join(".var").join("app").join(app_id.as_str())
}

/// Create the `data`, `cache` and `config` children of the application's
/// data directory and return the directory.
pub fn ensure_app_data_dir(home: &Path, app_id: &AppId) -> std::io::Result<PathBuf> {
    let dir = app_data_dir(home, app_id);
    for child in ["data", "cache", "config"] {
        std::fs::create_dir_all(dir.join(child))?;
    }
    debug!(dir = %dir.display(), "Application data directory ready");
    Ok(dir)
}
