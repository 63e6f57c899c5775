//! Fabric pattern execution.
//!
//! Shells out to the `fabric` CLI, feeding input text on stdin and reading
//! the pattern output from stdout. Everything here is blocking on purpose:
//! pattern runs happen on fan-out worker threads, not on the async runtime.

use crate::error::{GleanError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

/// Run a Fabric pattern (e.g. `summarize`, `extract_wisdom`) over `input`.
pub fn run_pattern(pattern: &str, input: &str) -> Result<String> {
    debug!("running fabric pattern {pattern}");
    pipe_through(Command::new("fabric").arg("-p").arg(pattern), input)
}

/// Feed `input` to a command's stdin and return its trimmed stdout.
///
/// A missing binary maps to [`GleanError::ToolNotFound`]; a non-zero exit
/// maps to [`GleanError::ToolFailed`] with the captured stderr.
pub fn pipe_through(command: &mut Command, input: &str) -> Result<String> {
    let name = command.get_program().to_string_lossy().to_string();

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GleanError::ToolNotFound(name.clone()),
            _ => GleanError::ToolFailed(format!("{name}: {e}")),
        })?;

    // stdin must be dropped before wait, or the child blocks reading it.
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }

    let output = child.wait_with_output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GleanError::ToolFailed(format!("{name}: {}", stderr.trim())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipe_through_echoes_input() {
        let out = pipe_through(&mut Command::new("cat"), "hello glean\n").unwrap();
        assert_eq!(out, "hello glean");
    }

    #[test]
    fn test_pipe_through_missing_tool() {
        let err = pipe_through(&mut Command::new("definitely-not-a-real-tool"), "x").unwrap_err();
        assert!(matches!(err, GleanError::ToolNotFound(_)));
    }

    #[test]
    fn test_pipe_through_failure_captures_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo broken >&2; exit 3");
        let err = pipe_through(&mut cmd, "").unwrap_err();
        match err {
            GleanError::ToolFailed(message) => {
                assert!(message.contains("sh"));
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
