//! Launch-context preparation for sandboxed applications.
//!
//! Given an application's manifest and the caller's allow/forbid overlays,
//! [`resolver::AccessPolicyResolver`] decides which host resources the
//! sandbox receives, allocates bus proxy endpoints and compiles the proxy
//! filter. [`confinement::ConfinementRegistrar`] places the launched process
//! into a transient systemd scope.
//!
//! ```no_run
//! use applaunch_commons::{HostPaths, ProcessEnv};
//! use applaunch_core::bus::ProxySocketProvisioner;
//! use applaunch_core::policy_store::ManifestStore;
//! use applaunch_core::resolver::AccessPolicyResolver;
//!
//! let paths = HostPaths::from_env(&ProcessEnv);
//! let provisioner = ProxySocketProvisioner::in_runtime_dir(&paths, "bus-proxy");
//! let resolver = AccessPolicyResolver::new(ProcessEnv, paths).with_proxy(provisioner);
//! let manifest = ManifestStore::load("metadata.toml")?;
//! let context = resolver.resolve("org.gnome.Maps", &manifest, None, &["network"], &["x11"])?;
//! println!("{:?}", context.launcher_args);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod app_id;
pub mod bus;
pub mod capability;
pub mod confinement;
pub mod environ;
pub mod error;
pub mod policy_store;
pub mod resolver;

pub use app_id::AppId;
pub use capability::{Capability, CapabilityOverrides, verify_environment_keys};
pub use confinement::{ConfinementJob, ConfinementRegistrar, RegistrationOutcome};
pub use error::{ProvisionError, RegistrationError, ResolveError};
pub use policy_store::{ManifestStore, PolicyStore};
pub use resolver::{AccessPolicyResolver, LaunchContext};
