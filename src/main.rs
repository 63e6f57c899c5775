//! Glean CLI entry point.

use anyhow::Result;
use clap::Parser;
use glean::cli::{commands, Cli, Commands};
use glean::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("glean={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Execute command
    match cli.command {
        Commands::Wisdom {
            url,
            no_ollama,
            no_audio,
            output,
        } => {
            commands::run_wisdom(&url, no_ollama, no_audio, output, settings).await?;
        }

        Commands::Clip { title, no_audio } => {
            commands::run_clip(title, no_audio, settings).await?;
        }

        Commands::Jq {
            query,
            file,
            output,
        } => {
            commands::run_jq(&query, file, output, settings).await?;
        }

        Commands::Forget { yes, shell } => {
            commands::run_forget(yes, shell)?;
        }

        Commands::Yt { action } => {
            commands::run_yt(&action, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
