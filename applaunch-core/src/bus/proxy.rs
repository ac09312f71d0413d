//! Allocation of bus proxy endpoints.

use std::path::{Path, PathBuf};

use applaunch_commons::HostPaths;
use tracing::debug;

use crate::error::ProvisionError;

/// Placeholder that must terminate every endpoint name template.
pub const TEMPLATE_PLACEHOLDER: &str = "XXXXXX";

/// Template for system bus proxy endpoints.
pub const SYSTEM_BUS_TEMPLATE: &str = "system-bus-proxy-XXXXXX";

/// Template for session bus proxy endpoints.
pub const SESSION_BUS_TEMPLATE: &str = "session-bus-proxy-XXXXXX";

/// Creates uniquely named, empty endpoint files for the external bus proxy.
///
/// Files are created with `O_EXCL` and mode `0600` inside a `0700` directory,
/// so concurrent launches can share one directory without coordination.
#[derive(Debug, Clone)]
pub struct ProxySocketProvisioner {
    dir: PathBuf,
}

impl ProxySocketProvisioner {
    /// Provision endpoints inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Provision endpoints inside `<runtime_dir>/<dir_name>`.
    pub fn in_runtime_dir(paths: &HostPaths, dir_name: &str) -> Self {
        Self::new(paths.runtime_subdir(dir_name))
    }

    /// Directory endpoints are created in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a fresh endpoint named after `name_template`.
    ///
    /// The trailing `XXXXXX` of the template is replaced with random
    /// characters. The returned path did not exist before the call.
    pub fn provision(&self, name_template: &str) -> Result<PathBuf, ProvisionError> {
        let prefix = name_template
            .strip_suffix(TEMPLATE_PLACEHOLDER)
            .filter(|prefix| !prefix.contains('/'))
            .ok_or_else(|| ProvisionError::InvalidTemplate(name_template.to_string()))?;

        self.ensure_dir()?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).rand_bytes(TEMPLATE_PLACEHOLDER.len());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            builder.permissions(std::fs::Permissions::from_mode(0o600));
        }

        let endpoint = builder
            .tempfile_in(&self.dir)
            .map_err(|source| ProvisionError::Endpoint {
                dir: self.dir.clone(),
                source,
            })?;
        let (_file, path) = endpoint.keep().map_err(|err| ProvisionError::Endpoint {
            dir: self.dir.clone(),
            source: err.error,
        })?;

        debug!(endpoint = %path.display(), "Provisioned bus proxy endpoint");
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<(), ProvisionError> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt as _;
            builder.mode(0o700);
        }
        match builder.create(&self.dir) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists && self.dir.is_dir() => {
                Ok(())
            }
            Err(source) => Err(ProvisionError::Directory {
                path: self.dir.clone(),
                source,
            }),
        }
    }
}
