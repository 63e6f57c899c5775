//! Forget command - remove the most recent command from shell history.

use crate::cli::Output;
use crate::error::GleanError;
use crate::history::{self, Shell};
use anyhow::Result;
use std::io::Write;

/// Run the forget command.
pub fn run_forget(yes: bool, shell: Option<String>) -> Result<()> {
    let shell = match shell {
        Some(name) => Shell::parse(&name).ok_or_else(|| {
            GleanError::InvalidInput(format!("unknown shell '{name}'; expected bash, zsh, or fish"))
        })?,
        None => Shell::detect().ok_or_else(|| {
            GleanError::History("could not detect shell from $SHELL; use --shell".into())
        })?,
    };

    let history_file = shell.history_file()?;
    let command = history::last_command(&history_file)?;

    println!("Last command: {command}");

    if !yes && !confirm("Remove this command?")? {
        Output::info("Operation cancelled.");
        return Ok(());
    }

    history::remove_last_command(&history_file)?;
    Output::success("Command removed from history.");
    Ok(())
}

/// Ask a yes/no question on the terminal, defaulting to no.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
