//! Blocking client for a local Ollama server.
//!
//! Uses the blocking reqwest client because generation happens inside
//! fan-out worker threads. The async runtime never sees these calls.

use crate::error::{GleanError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for the local Ollama HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    host: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a client for `host` using `model` for generation.
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            host: host.into(),
            model: model.into(),
            client,
        })
    }

    /// Probe whether the Ollama server is reachable.
    ///
    /// Uses a short timeout independent of the generation timeout so a
    /// missing server fails fast rather than hanging a whole batch.
    pub fn is_available(&self) -> bool {
        let probe = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(2))
            .build();
        let Ok(probe) = probe else { return false };

        match probe.get(format!("{}/api/tags", self.host)).send() {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("ollama not reachable at {}: {e}", self.host);
                false
            }
        }
    }

    /// List model names known to the server.
    pub fn list_models(&self) -> Result<Vec<String>> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.host))
            .send()?
            .error_for_status()
            .map_err(|e| GleanError::Ollama(format!("listing models: {e}")))?;

        let tags: TagsResponse = resp.json()?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Generate a completion for `prompt` with the configured model.
    pub fn generate(&self, prompt: &str) -> Result<String> {
        debug!("generating with ollama model {}", self.model);

        let resp = self
            .client
            .post(format!("{}/api/generate", self.host))
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(GleanError::Ollama(format!(
                "generate returned {status}: {}",
                body.trim()
            )));
        }

        let body: GenerateResponse = resp.json()?;
        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_host_is_not_available() {
        // Port 9 (discard) is a safe dead endpoint.
        let client = OllamaClient::new("http://127.0.0.1:9", "llama2").unwrap();
        assert!(!client.is_available());
    }

    #[test]
    fn test_generate_request_shape() {
        let req = GenerateRequest {
            model: "codellama",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "codellama");
        assert_eq!(json["stream"], false);
    }
}
