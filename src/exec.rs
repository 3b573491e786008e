use std::process::{Command, ExitStatus, Output, Stdio};

use tracing::debug;

use crate::error::{AppError, Result};

/// Runs a command with captured output.
///
/// # Arguments
/// * `program` - Executable name
/// * `args` - Arguments passed verbatim
pub fn run_captured(program: &str, args: &[&str]) -> Result<Output> {
    debug!(program, ?args, "running command");
    Ok(Command::new(program).args(args).output()?)
}

/// Runs a command with captured output, failing on a non-zero exit.
///
/// Returns stdout on success.
pub fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = run_captured(program, args)?;
    if !output.status.success() {
        return Err(command_error(program, &output)?);
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Runs a command attached to the terminal and returns its exit status
pub fn run_attached(program: &str, args: &[&str]) -> Result<ExitStatus> {
    debug!(program, ?args, "running interactive command");
    Ok(Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?)
}

/// Runs a command attached to the terminal, failing on a non-zero exit
pub fn run_inherited(program: &str, args: &[&str]) -> Result<()> {
    let status = run_attached(program, args)?;
    if !status.success() {
        return Err(AppError::Command(format!("{program} exited with {status}")));
    }
    Ok(())
}

/// Builds the error for a failed command from its stderr, stdout or name
fn command_error(program: &str, output: &Output) -> Result<AppError> {
    let stderr = String::from_utf8(output.stderr.clone())?;
    let stdout = String::from_utf8(output.stdout.clone())?;
    let message = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{program} failed"));
    Ok(AppError::Command(message))
}
