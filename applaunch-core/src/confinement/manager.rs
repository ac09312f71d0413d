//! Init system RPC seam.
//!
//! [`UnitManager`] is what the registrar talks to; [`SystemdUnitManager`]
//! implements it over a peer-to-peer connection to systemd's private socket.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt as _;
use futures::stream::BoxStream;
use tracing::{debug, trace};
use zbus::message::Type as MessageType;
use zbus::zvariant::{OwnedObjectPath, Value};
use zbus::{Connection, MatchRule, Message, MessageStream};

use super::job::JobRemovedEvent;
use crate::error::RegistrationError;

const SYSTEMD_PATH: &str = "/org/freedesktop/systemd1";
const MANAGER_INTERFACE: &str = "org.freedesktop.systemd1.Manager";
const JOB_REMOVED: &str = "JobRemoved";

/// Job mode: fail if a conflicting job is queued.
const JOB_MODE_FAIL: &str = "fail";

/// Stream of job completion notifications.
pub type JobEventStream = BoxStream<'static, JobRemovedEvent>;

/// Operations the registrar needs from the init system.
#[async_trait]
pub trait UnitManager: Send + Sync {
    /// Start delivering `JobRemoved` events.
    ///
    /// Events emitted after this call returns are buffered in the stream.
    async fn subscribe(&self) -> Result<JobEventStream, RegistrationError>;

    /// Submit a transient scope containing `pid`; returns the job object path.
    async fn start_transient_scope(&self, unit: &str, pid: u32)
    -> Result<String, RegistrationError>;
}

/// systemd over its private socket.
#[derive(Debug, Clone)]
pub struct SystemdUnitManager {
    connection: Connection,
}

impl SystemdUnitManager {
    /// Open a peer-to-peer connection to `endpoint`.
    pub async fn connect(endpoint: &Path) -> Result<Self, RegistrationError> {
        let address = format!("unix:path={}", endpoint.display());
        let connection = zbus::connection::Builder::address(address.as_str())
            .map_err(|err| RegistrationError::Connect(err.to_string()))?
            .p2p()
            .build()
            .await
            .map_err(|err| RegistrationError::Connect(err.to_string()))?;
        debug!(endpoint = %endpoint.display(), "Connected to systemd");
        Ok(Self { connection })
    }

    fn job_removed_rule() -> zbus::Result<MatchRule<'static>> {
        Ok(MatchRule::builder()
            .msg_type(MessageType::Signal)
            .interface(MANAGER_INTERFACE)?
            .member(JOB_REMOVED)?
            .build())
    }
}

fn parse_job_removed(message: &Message) -> Option<JobRemovedEvent> {
    let body = message.body();
    match body.deserialize::<(u32, OwnedObjectPath, String, String)>() {
        Ok((id, job, unit, result)) => Some(JobRemovedEvent {
            id,
            job: job.to_string(),
            unit,
            result,
        }),
        Err(err) => {
            trace!("Ignoring malformed JobRemoved signal: {err}");
            None
        }
    }
}

#[async_trait]
impl UnitManager for SystemdUnitManager {
    async fn subscribe(&self) -> Result<JobEventStream, RegistrationError> {
        let rule =
            Self::job_removed_rule().map_err(|err| RegistrationError::Subscribe(err.to_string()))?;
        let stream = MessageStream::for_match_rule(rule, &self.connection, None)
            .await
            .map_err(|err| RegistrationError::Subscribe(err.to_string()))?;

        Ok(stream
            .filter_map(|message| async move { parse_job_removed(&message.ok()?) })
            .boxed())
    }

    async fn start_transient_scope(
        &self,
        unit: &str,
        pid: u32,
    ) -> Result<String, RegistrationError> {
        let submit_error = |reason: String| RegistrationError::Submit {
            unit: unit.to_string(),
            reason,
        };

        let properties: Vec<(&str, Value<'_>)> = vec![("PIDs", Value::new(vec![pid]))];
        let aux = Vec::<(&str, Vec<(&str, Value<'_>)>)>::new();

        let reply = self
            .connection
            .call_method(
                None::<&str>,
                SYSTEMD_PATH,
                Some(MANAGER_INTERFACE),
                "StartTransientUnit",
                &(unit, JOB_MODE_FAIL, properties, aux),
            )
            .await
            .map_err(|err| submit_error(err.to_string()))?;

        let job: OwnedObjectPath = reply
            .body()
            .deserialize()
            .map_err(|err| submit_error(format!("unexpected reply: {err}")))?;
        Ok(job.to_string())
    }
}
