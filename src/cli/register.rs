use std::io::Write;

use anyhow::{Context, Result};
use applaunch_core::{AppId, ConfinementRegistrar, RegistrationOutcome};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::args::RegisterArgs;
use crate::startup::StartupContext;

/// Place `--pid` in a transient scope and report how registration ended.
///
/// Only a failure to run the registration at all is an error; an absent or
/// uncooperative init system is reported as a status.
pub fn handle_register_command(
    startup: &StartupContext,
    args: &RegisterArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let app_id = AppId::parse(&args.app_id)?;
    let confinement = &startup.config.confinement;

    let report = if confinement.enabled {
        let registrar = ConfinementRegistrar::for_current_user()
            .unit_prefix(confinement.unit_prefix.clone())
            .timeout(confinement.job_timeout());
        let outcome = registrar
            .register_and_wait(&app_id, args.pid)
            .context("Confinement registration could not run")?;
        outcome_report(&outcome)
    } else {
        info!("Confinement disabled by configuration");
        json!({ "status": "disabled" })
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write_report(&report, out)?;
    }
    Ok(())
}

fn outcome_report(outcome: &RegistrationOutcome) -> Value {
    match outcome {
        RegistrationOutcome::Skipped => json!({ "status": "skipped" }),
        RegistrationOutcome::Completed(job) => json!({
            "status": "completed",
            "unit": job.unit(),
            "job": job.token(),
            "result": job.result(),
        }),
        RegistrationOutcome::Abandoned(err) => {
            warn!("Confinement registration abandoned: {err}");
            json!({ "status": "abandoned", "error": err.to_string() })
        }
    }
}

fn write_report(report: &Value, out: &mut dyn Write) -> Result<()> {
    let field = |name: &str| report.get(name).and_then(Value::as_str);
    write!(out, "{}", field("status").unwrap_or("unknown"))?;
    if let Some(unit) = field("unit") {
        write!(out, " {unit}")?;
    }
    if let Some(result) = field("result") {
        write!(out, " ({result})")?;
    }
    if let Some(error) = field("error") {
        write!(out, ": {error}")?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use applaunch_core::RegistrationError;
    use std::path::PathBuf;

    #[test]
    fn reports_skipped_and_abandoned_outcomes() {
        assert_eq!(
            outcome_report(&RegistrationOutcome::Skipped),
            json!({ "status": "skipped" })
        );

        let abandoned = RegistrationOutcome::Abandoned(RegistrationError::Unavailable(
            PathBuf::from("/run/user/1000/systemd/private"),
        ));
        let report = outcome_report(&abandoned);
        assert_eq!(report["status"], "abandoned");

        let mut rendered = Vec::new();
        write_report(&report, &mut rendered).unwrap();
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "abandoned: init system endpoint /run/user/1000/systemd/private is not present\n"
        );
    }
}
