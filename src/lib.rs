//! Glean - extract the useful parts
//!
//! A CLI toolbox that pulls structure out of messy inputs: YouTube videos
//! become wisdom documents, clipboard text becomes an analysis, plain
//! English becomes a tested jq filter, and shell history loses the command
//! you wish you hadn't typed.
//!
//! # Overview
//!
//! Glean allows you to:
//! - Extract summaries, insights, and references from YouTube videos
//! - Analyze whatever text is on the clipboard
//! - Generate and test jq filters from natural-language descriptions
//! - Remove the most recent command from bash, zsh, or fish history
//! - Cache and manage transcripts, audio, and downloads
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `progress` - Live spinner display and parallel task fan-out
//! - `youtube` - Video metadata, transcripts, and downloads
//! - `fabric` - Running fabric patterns over text
//! - `ollama` - Local Ollama server client
//! - `openai` - Text enhancement and speech synthesis
//! - `artifacts` - Cached artifact storage
//! - `history` - Shell history manipulation
//!
//! # Example
//!
//! ```rust,no_run
//! use glean::progress::{run_parallel, ProgressTracker, SpinnerStyle, Task};
//!
//! let tracker = ProgressTracker::new();
//! let tasks = vec![
//!     Task::new("count", || Ok(1 + 1)),
//!     Task::new("more", || Ok(2 + 2)),
//! ];
//! let results = run_parallel(&tracker, SpinnerStyle::Dots, tasks);
//! assert_eq!(results, vec![Some(2), Some(4)]);
//! ```

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod error;
pub mod fabric;
pub mod history;
pub mod ollama;
pub mod openai;
pub mod progress;
pub mod youtube;

pub use error::{GleanError, Result};
