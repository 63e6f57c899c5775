//! CLI module for glean.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_size, Output};

use clap::{Parser, Subcommand};

/// Glean - extract the useful parts
///
/// A CLI toolbox that pulls summaries, insights, and references out of
/// YouTube videos and clipboard text, generates jq filters from plain
/// English, and keeps your shell history tidy.
#[derive(Parser, Debug)]
#[command(name = "glean")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract summary, insights, and references from a YouTube video
    Wisdom {
        /// YouTube video URL or ID
        url: String,

        /// Disable Ollama-based enhancements
        #[arg(long)]
        no_ollama: bool,

        /// Skip audio summary generation
        #[arg(long)]
        no_audio: bool,

        /// Output markdown file (defaults to the desktop)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Analyze clipboard text with summary, insights, and link extraction
    Clip {
        /// Title for the analysis (defaults to the first line of the text)
        #[arg(short, long)]
        title: Option<String>,

        /// Skip audio summary generation
        #[arg(long)]
        no_audio: bool,
    },

    /// Generate a jq filter from a natural-language description
    Jq {
        /// What the filter should do, in plain English
        query: String,

        /// JSON input file (reads stdin if omitted)
        #[arg(short, long)]
        file: Option<String>,

        /// Output markdown file for the filter documentation
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Remove the most recent command from shell history
    Forget {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Shell to target (bash, zsh, fish); auto-detected if omitted
        #[arg(short, long)]
        shell: Option<String>,
    },

    /// YouTube utilities: transcripts, metadata, downloads, artifacts
    Yt {
        #[command(subcommand)]
        action: YtAction,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum YtAction {
    /// Fetch the transcript of a video
    Transcript {
        /// YouTube video URL or ID
        url: String,

        /// Print as JSON with video metadata
        #[arg(long)]
        json: bool,

        /// Don't cache the transcript in the artifact store
        #[arg(long)]
        no_save: bool,
    },

    /// Show video metadata as JSON
    Info {
        /// YouTube video URL or ID
        url: String,
    },

    /// Download a video (or audio only) into the artifact store
    Download {
        /// YouTube video URL or ID
        url: String,

        /// Download audio only, as MP3
        #[arg(short, long)]
        audio: bool,
    },

    /// List cached artifacts
    List {
        /// Category (transcripts, audio, downloads, temp, all)
        #[arg(default_value = "all")]
        category: String,
    },

    /// Remove cached artifacts older than a cutoff
    Cleanup {
        /// Category (transcripts, audio, downloads, temp, all)
        category: String,

        /// Maximum age to keep, e.g. 7d, 24h, 30m
        #[arg(long)]
        max_age: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "ollama.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
