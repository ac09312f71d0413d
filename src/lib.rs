//! applaunch - launch-context preparation for sandboxed applications
//!
//! The binary is a thin front end: [`startup`] loads layered configuration and
//! [`cli`] maps each subcommand onto `applaunch-core`.

pub mod cli;
pub mod startup;

pub use startup::StartupContext;
