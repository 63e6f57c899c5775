//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools are available before starting operations
//! that would otherwise fail midway.

use crate::error::{GleanError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Wisdom extraction needs yt-dlp for the video and fabric for patterns.
    Wisdom,
    /// Clipboard analysis needs fabric.
    Clip,
    /// Filter generation needs jq to validate the result.
    JqFilter,
    /// YouTube utilities need yt-dlp.
    Youtube,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Wisdom => {
            check_tool("yt-dlp")?;
            check_tool("fabric")?;
        }
        Operation::Clip => {
            check_tool("fabric")?;
        }
        Operation::JqFilter => {
            check_tool("jq")?;
        }
        Operation::Youtube => {
            check_tool("yt-dlp")?;
        }
    }
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(GleanError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GleanError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(GleanError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_reports_name() {
        let err = check_tool("definitely-not-a-real-tool").unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tool"));
    }
}
