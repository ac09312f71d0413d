use std::io::Write;

use anyhow::Result;
use applaunch_core::verify_environment_keys;

use super::args::VerifyArgs;

pub fn handle_verify_command(args: &VerifyArgs, out: &mut dyn Write) -> Result<()> {
    verify_environment_keys(args.capabilities.as_slice())?;
    writeln!(out, "ok: {}", args.capabilities.join(", "))?;
    Ok(())
}
