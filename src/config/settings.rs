//! Configuration settings for glean.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub ollama: OllamaSettings,
    pub openai: OpenAiSettings,
    pub tts: TtsSettings,
    pub fabric: FabricSettings,
    pub prompts: PromptSettings,
}
/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for cached artifacts (transcripts, audio, downloads).
    pub artifacts_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            artifacts_dir: "~/.config/glean/artifacts".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Local Ollama server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    /// Ollama server address.
    pub host: String,
    /// Default model for analysis tasks.
    pub model: String,
    /// Model for code-oriented tasks like jq filter generation.
    pub code_model: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            code_model: "codellama".to_string(),
        }
    }
}

/// OpenAI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// Whether to enhance extracted text with OpenAI when a key is present.
    pub enabled: bool,
    /// Chat model for text enhancement.
    pub model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Generate audio summaries.
    pub enabled: bool,
    /// Voice name (alloy, echo, fable, onyx, nova, shimmer).
    pub voice: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            voice: "nova".to_string(),
        }
    }
}

/// Fabric pattern runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricSettings {
    /// Pattern used for summaries.
    pub summary_pattern: String,
    /// Pattern used for insight extraction.
    pub wisdom_pattern: String,
    /// Pattern used for reference extraction.
    pub references_pattern: String,
}

impl Default for FabricSettings {
    fn default() -> Self {
        Self {
            summary_pattern: "summarize".to_string(),
            wisdom_pattern: "extract_wisdom".to_string(),
            references_pattern: "extract_references".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}
impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        if let Ok(model) = std::env::var("OLLAMA_DEFAULT_MODEL") {
            if !model.is_empty() {
                settings.ollama.model = model;
            }
        }

        Ok(settings)
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GleanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("glean")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded artifacts directory path.
    pub fn artifacts_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.artifacts_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ollama.host, "http://localhost:11434");
        assert_eq!(settings.fabric.summary_pattern, "summarize");
        assert!(settings.tts.enabled);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.ollama.model = "mistral".to_string();
        settings.tts.enabled = false;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.ollama.model, "mistral");
        assert!(!loaded.tts.enabled);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ollama]\nmodel = \"phi\"\n").unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.ollama.model, "phi");
        assert_eq!(loaded.ollama.host, "http://localhost:11434");
        assert_eq!(loaded.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = PathBuf::from("/nonexistent/glean/config.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.general.log_level, "info");
    }
}
