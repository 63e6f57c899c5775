//! Shell history inspection and trimming.
//!
//! Supports the bash, zsh, and fish history formats. Zsh extended history
//! lines look like `: 1707123456:0;command`; fish uses a YAML-ish
//! `- cmd: command` / `"cmd": "command"` layout. Bash is one command per
//! line.

use crate::error::{GleanError, Result};
use regex::Regex;
use std::path::PathBuf;

/// Shells with a known history file location and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Parse a shell name, e.g. from `--shell` or `$SHELL`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "bash" => Some(Shell::Bash),
            "zsh" => Some(Shell::Zsh),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    /// Detect the current shell from the `SHELL` environment variable.
    pub fn detect() -> Option<Self> {
        let shell = std::env::var("SHELL").ok()?;
        let name = shell.rsplit('/').next()?;
        Self::parse(name)
    }

    /// History file path for this shell.
    pub fn history_file(self) -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GleanError::History("could not determine home directory".into()))?;
        Ok(match self {
            Shell::Bash => home.join(".bash_history"),
            Shell::Zsh => home.join(".zsh_history"),
            Shell::Fish => home.join(".local/share/fish/fish_history"),
        })
    }
}

/// Infer the history format from a file path. Unknown paths are treated as
/// plain line-per-command history.
pub fn format_for_path(path: &std::path::Path) -> Shell {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.ends_with("zsh_history") {
        Shell::Zsh
    } else if name.ends_with("fish_history") {
        Shell::Fish
    } else {
        Shell::Bash
    }
}

/// Read the most recent command from a history file.
pub fn last_command(path: &std::path::Path) -> Result<String> {
    if !path.exists() {
        return Err(GleanError::History(format!(
            "history file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(GleanError::History("history is empty".into()));
    }

    let command = match format_for_path(path) {
        Shell::Zsh => {
            let re = Regex::new(r";\s*(.+)$").unwrap();
            content
                .lines()
                .rev()
                .find_map(|line| re.captures(line))
                .map(|c| c[1].trim().to_string())
        }
        Shell::Fish => {
            let re = Regex::new(r#""?cmd"?\s*:\s*"?(.+?)"?\s*,?\s*$"#).unwrap();
            content
                .lines()
                .rev()
                .filter(|line| line.contains("cmd"))
                .find_map(|line| re.captures(line))
                .map(|c| c[1].trim().to_string())
        }
        Shell::Bash => content
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string()),
    };

    command.ok_or_else(|| GleanError::History("no commands found in history".into()))
}

/// Remove the most recent entry from a history file.
///
/// For bash and zsh this drops the last non-empty line; for fish it drops
/// the whole last entry block (the `cmd` line plus its attribute lines).
pub fn remove_last_command(path: &std::path::Path) -> Result<()> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(GleanError::History("history is empty".into()));
    }

    let mut lines: Vec<&str> = content.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    match format_for_path(path) {
        Shell::Fish => {
            // Drop trailing attribute lines, then the entry start itself.
            let start = lines
                .iter()
                .rposition(|l| l.contains("cmd"))
                .ok_or_else(|| GleanError::History("no commands to remove".into()))?;
            // Entries may open with a brace line before the cmd line.
            let entry_start = if start > 0 && lines[start - 1].trim() == "{" {
                start - 1
            } else {
                start
            };
            lines.truncate(entry_start);
        }
        Shell::Bash | Shell::Zsh => {
            if lines.pop().is_none() {
                return Err(GleanError::History("no commands to remove".into()));
            }
        }
    }

    let mut output = lines.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    std::fs::write(path, output)?;
    Ok(())
}
