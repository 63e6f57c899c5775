//! Configuration module for glean.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ClipPrompts, JqPrompts, Prompts, WisdomPrompts};
pub use settings::{
    FabricSettings, GeneralSettings, OllamaSettings, OpenAiSettings, PromptSettings, Settings,
    TtsSettings,
};
