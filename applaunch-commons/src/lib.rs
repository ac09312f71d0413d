//! Shared traits and helper types reused across the applaunch crates.
//!
//! Everything that reads ambient process state (environment variables, the
//! current user's runtime directory) goes through the contracts defined here,
//! so the resolver and the launch environment helpers can be exercised with
//! deterministic inputs instead of mutating the real environment.

pub mod env;
pub mod paths;
pub mod reference;

pub use env::{EnvLookup, ProcessEnv};
pub use paths::{HostPaths, current_uid, runtime_dir, systemd_private_socket};
pub use reference::StaticEnv;
