//! Placement of launched processes into transient systemd scopes.
//!
//! Registration is best effort: every failure after the event loop is up is
//! logged and reported as [`RegistrationOutcome::Abandoned`].

pub mod job;
pub mod manager;

use std::path::{Path, PathBuf};
use std::time::Duration;

use applaunch_commons::{current_uid, systemd_private_socket};
use futures::StreamExt as _;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

pub use job::{ConfinementJob, JOB_RESULT_DONE, JobRemovedEvent, RegistrationOutcome};
pub use manager::{JobEventStream, SystemdUnitManager, UnitManager};

use crate::app_id::AppId;
use crate::error::RegistrationError;

pub const DEFAULT_UNIT_PREFIX: &str = "applaunch";
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30);

const REGISTRATION_THREAD: &str = "applaunch-confinement";

/// Registers launched processes with the user's systemd instance.
#[derive(Debug, Clone)]
pub struct ConfinementRegistrar {
    endpoint: PathBuf,
    unit_prefix: String,
    timeout: Option<Duration>,
}

impl ConfinementRegistrar {
    pub fn new(endpoint: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
            unit_prefix: DEFAULT_UNIT_PREFIX.to_string(),
            timeout: Some(DEFAULT_JOB_TIMEOUT),
        }
    }

    /// Registrar for `/run/user/<uid>/systemd/private` of the calling user.
    pub fn for_current_user() -> Self {
        Self::new(systemd_private_socket(current_uid()))
    }

    pub fn unit_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.unit_prefix = prefix.into();
        self
    }

    /// Bound on the completion wait; `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    /// `<prefix>-<app_id>-<pid>.scope`
    pub fn unit_name(&self, app_id: &AppId, pid: u32) -> String {
        format!("{}-{app_id}-{pid}.scope", self.unit_prefix)
    }

    /// Place `pid` in a transient scope and block until systemd reports the
    /// job done.
    ///
    /// The RPC runs on a private current-thread runtime owned by a dedicated
    /// thread, so this is safe to call from inside or outside another runtime.
    pub fn register_and_wait(
        &self,
        app_id: &AppId,
        pid: u32,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        if !self.endpoint.exists() {
            debug!("{}", RegistrationError::Unavailable(self.endpoint.clone()));
            return Ok(RegistrationOutcome::Skipped);
        }

        let endpoint = self.endpoint.clone();
        let unit = self.unit_name(app_id, pid);
        let timeout = self.timeout;

        let handle = std::thread::Builder::new()
            .name(REGISTRATION_THREAD.to_string())
            .spawn(move || -> Result<Result<ConfinementJob, RegistrationError>, RegistrationError> {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(RegistrationError::EventLoop)?;
                Ok(runtime.block_on(async move {
                    let manager = SystemdUnitManager::connect(&endpoint).await?;
                    submit_and_wait(&manager, unit, pid, timeout).await
                }))
            })
            .map_err(RegistrationError::EventLoop)?;

        let result = handle.join().map_err(|_| {
            RegistrationError::EventLoop(std::io::Error::other("registration thread panicked"))
        })??;

        Ok(settle(result))
    }

    /// Register through an existing `manager` on the caller's runtime.
    pub async fn register_with(
        &self,
        manager: &dyn UnitManager,
        app_id: &AppId,
        pid: u32,
    ) -> RegistrationOutcome {
        let unit = self.unit_name(app_id, pid);
        settle(submit_and_wait(manager, unit, pid, self.timeout).await)
    }
}

fn settle(result: Result<ConfinementJob, RegistrationError>) -> RegistrationOutcome {
    match result {
        Ok(job) => {
            if job.result() != Some(JOB_RESULT_DONE) {
                warn!(
                    unit = job.unit(),
                    result = job.result().unwrap_or_default(),
                    "Transient scope job did not succeed"
                );
            }
            RegistrationOutcome::Completed(job)
        }
        Err(err) => {
            warn!("{err}");
            RegistrationOutcome::Abandoned(err)
        }
    }
}

async fn submit_and_wait(
    manager: &dyn UnitManager,
    unit: String,
    pid: u32,
    timeout: Option<Duration>,
) -> Result<ConfinementJob, RegistrationError> {
    let mut events = manager.subscribe().await?;
    let token = manager.start_transient_scope(&unit, pid).await?;
    debug!(unit = %unit, job = %token, "Submitted transient scope");

    let mut job = ConfinementJob::new(unit, token.clone());
    let (tx, rx) = oneshot::channel();
    let consumer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if event.job == token {
                let _ = tx.send(event);
                return;
            }
            trace!(job = %event.job, "Ignoring unrelated job");
        }
    });

    let received = match timeout {
        Some(limit) => match tokio::time::timeout(limit, rx).await {
            Ok(received) => received,
            Err(_) => {
                consumer.abort();
                return Err(RegistrationError::TimedOut {
                    job: job.token().to_string(),
                    timeout: limit,
                });
            }
        },
        None => rx.await,
    };

    let event = received.map_err(|_| RegistrationError::EventStreamClosed {
        job: job.token().to_string(),
    })?;
    job.complete(&event);
    info!(unit = job.unit(), result = %event.result, "Process confined");
    Ok(job)
}
