use serde::Serialize;

use crate::error::RegistrationError;

/// Systemd's job result for a successful start.
pub const JOB_RESULT_DONE: &str = "done";

/// A `JobRemoved` notification from the init system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRemovedEvent {
    pub id: u32,
    /// Job object path.
    pub job: String,
    pub unit: String,
    pub result: String,
}

/// A submitted transient scope and the job tracking its creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfinementJob {
    unit: String,
    job: String,
    result: Option<String>,
}

impl ConfinementJob {
    pub(crate) fn new(unit: String, job: String) -> Self {
        Self {
            unit,
            job,
            result: None,
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Job object path returned by the submission.
    pub fn token(&self) -> &str {
        &self.job
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    /// Result string reported by the completion event.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub(crate) fn complete(&mut self, event: &JobRemovedEvent) {
        debug_assert!(self.result.is_none(), "job completed twice");
        debug_assert_eq!(event.job, self.job);
        self.result = Some(event.result.clone());
    }
}

/// Result of a registration attempt.
///
/// Only [`RegistrationOutcome::Completed`] means the process was placed in a
/// scope; the other variants are soft failures that leave the launch intact.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// No init system endpoint for this user.
    Skipped,
    Completed(ConfinementJob),
    Abandoned(RegistrationError),
}

impl RegistrationOutcome {
    pub fn job(&self) -> Option<&ConfinementJob> {
        match self {
            Self::Completed(job) => Some(job),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_records_result_once() {
        let mut job = ConfinementJob::new(
            "applaunch-org.example.App-42.scope".into(),
            "/org/freedesktop/systemd1/job/7".into(),
        );
        assert!(!job.is_completed());

        job.complete(&JobRemovedEvent {
            id: 7,
            job: "/org/freedesktop/systemd1/job/7".into(),
            unit: job.unit().to_string(),
            result: JOB_RESULT_DONE.into(),
        });

        assert!(job.is_completed());
        assert_eq!(job.result(), Some("done"));
        assert!(RegistrationOutcome::Completed(job).is_completed());
        assert!(RegistrationOutcome::Skipped.job().is_none());
    }
}
