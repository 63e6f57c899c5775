//! Error types for glean.

use thiserror::Error;

/// Library-level error type for glean operations.
#[derive(Error, Debug)]
pub enum GleanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video source error: {0}")]
    VideoSource(String),

    #[error("No transcript available: {0}")]
    TranscriptUnavailable(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Ollama error: {0}")]
    Ollama(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Text-to-speech failed: {0}")]
    Speech(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Shell history error: {0}")]
    History(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for glean operations.
pub type Result<T> = std::result::Result<T, GleanError>;
