//! Error types for launch-context preparation.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that abort access-policy resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A name in the allow or forbid list is not a known capability.
    #[error("unknown capability: {0}")]
    InvalidCapability(String),

    /// The application identity is not a valid well-known bus name.
    #[error("invalid application id: {0}")]
    InvalidAppId(String),

    /// A bus proxy endpoint was required but could not be created.
    #[error("bus proxy provisioning failed: {0}")]
    ProxyProvisioningFailed(#[from] ProvisionError),
}

/// Errors raised while allocating a proxy endpoint.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The name template does not end in the random placeholder.
    #[error("invalid endpoint template {0:?}: expected a trailing XXXXXX")]
    InvalidTemplate(String),

    /// The provisioning directory could not be created.
    #[error("failed to create proxy directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No unique endpoint could be created in the directory.
    #[error("failed to create proxy endpoint in {dir}: {source}")]
    Endpoint {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a confinement registration was abandoned.
///
/// None of these fail a launch; they are logged and surfaced through
/// [`crate::confinement::RegistrationOutcome::Abandoned`]. Only
/// [`RegistrationError::EventLoop`] is returned as an error, because it means
/// the process could not set up its private event loop at all.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The init system's private socket does not exist.
    #[error("init system endpoint {0} is not present")]
    Unavailable(PathBuf),

    /// Opening the RPC connection failed.
    #[error("can't connect to systemd: {0}")]
    Connect(String),

    /// Subscribing to job completion events failed.
    #[error("can't subscribe to job events: {0}")]
    Subscribe(String),

    /// The transient unit request was rejected.
    #[error("can't start transient unit {unit}: {reason}")]
    Submit { unit: String, reason: String },

    /// The event stream ended before the job completed.
    #[error("job event stream closed before {job} completed")]
    EventStreamClosed { job: String },

    /// The job did not complete within the configured bound.
    #[error("job {job} did not complete within {timeout:?}")]
    TimedOut { job: String, timeout: Duration },

    /// The private event loop could not be started.
    #[error("failed to start registration event loop: {0}")]
    EventLoop(#[source] std::io::Error),
}
