//! Config command - show, edit, and locate the configuration file.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::error::{GleanError, Result};
use std::process::Command;

pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(&settings),
        ConfigAction::Set { key, value } => set_config(key, value),
        ConfigAction::Edit => edit_config(),
        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
            Ok(())
        }
    }
}

fn show_config(settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings)
        .map_err(|e| GleanError::Config(format!("failed to serialize settings: {e}")))?;

    Output::header("Current configuration");
    println!();
    println!("{}", rendered);
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    // TODO: support dotted-path updates (e.g. ollama.model) once the
    // settings layout stabilizes.
    Output::warning(&format!(
        "Setting values from the command line is not yet implemented (tried {} = {}).",
        key, value
    ));
    Output::info(&format!(
        "Edit the file directly: {}",
        Settings::default_config_path().display()
    ));
    Ok(())
}

fn edit_config() -> Result<()> {
    let config_path = Settings::default_config_path();

    if !config_path.exists() {
        Output::info("Config file does not exist, creating with defaults...");
        Settings::default().save()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| GleanError::Config(format!("failed to launch {}: {}", editor, e)))?;

    if !status.success() {
        return Err(GleanError::Config(format!("{} exited with an error", editor)));
    }

    Output::success("Configuration updated.");
    Ok(())
}
