//! OpenAI client configuration and helpers.

use crate::error::{GleanError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateSpeechRequestArgs, SpeechModel, Voice,
};
use async_openai::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for OpenAI API requests (5 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI client with configured timeout.
///
/// Uses a 5-minute timeout by default to prevent hung API calls.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}

/// Whether an OpenAI API key is present in the environment.
pub fn has_api_key() -> bool {
    std::env::var("OPENAI_API_KEY").map_or(false, |k| !k.is_empty())
}

/// Run a prompt through a chat completion and return the response text.
pub async fn enhance_text(
    client: &Client<OpenAIConfig>,
    model: &str,
    prompt: &str,
) -> Result<String> {
    debug!("running chat completion with {model}");

    let messages: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content("You are a helpful assistant that enhances and refines text.")
            .build()
            .map_err(|e| GleanError::OpenAI(e.to_string()))?
            .into(),
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| GleanError::OpenAI(e.to_string()))?
            .into(),
    ];

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(0.7)
        .build()
        .map_err(|e| GleanError::OpenAI(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| GleanError::OpenAI(format!("chat completion failed: {e}")))?;

    response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .map(|content| content.trim().to_string())
        .ok_or_else(|| GleanError::OpenAI("empty response from model".into()))
}

/// Synthesize speech from text, writing MP3 bytes to `output`.
pub async fn synthesize_speech(
    client: &Client<OpenAIConfig>,
    text: &str,
    voice: &str,
    output: &std::path::Path,
) -> Result<()> {
    let request = CreateSpeechRequestArgs::default()
        .model(SpeechModel::Tts1)
        .voice(parse_voice(voice)?)
        .input(text)
        .build()
        .map_err(|e| GleanError::Speech(e.to_string()))?;

    let response = client
        .audio()
        .speech(request)
        .await
        .map_err(|e| GleanError::Speech(format!("speech synthesis failed: {e}")))?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, &response.bytes)?;
    debug!("wrote {} bytes of audio to {}", response.bytes.len(), output.display());
    Ok(())
}

fn parse_voice(name: &str) -> Result<Voice> {
    match name.to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => Err(GleanError::InvalidInput(format!(
            "unknown voice '{other}'; expected one of alloy, echo, fable, onyx, nova, shimmer"
        ))),
    }
}
