//! Clip command - analyze clipboard text with parallel pattern extraction.

use crate::artifacts::{desktop_path, unique_path};
use crate::cli::{preflight, Output};
use crate::config::{Prompts, Settings};
use crate::error::GleanError;
use crate::fabric;
use crate::openai;
use crate::progress::{run_parallel, ProgressTracker, SpinnerStyle, Task};
use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Maximum length of a title derived from clipboard text.
const AUTO_TITLE_LEN: usize = 50;

/// Run the clip command.
#[instrument(skip(settings))]
pub async fn run_clip(title: Option<String>, no_audio: bool, settings: Settings) -> Result<()> {
    preflight::check(preflight::Operation::Clip)?;

    let text = read_clipboard()?;
    if text.trim().is_empty() {
        Output::warning("Clipboard is empty.");
        return Ok(());
    }

    let title = title.unwrap_or_else(|| auto_title(&text));
    Output::header(&format!("Analyzing: {title}"));

    let tasks: Vec<Task<String>> = [
        ("Generating summary", settings.fabric.summary_pattern.clone()),
        ("Extracting insights", settings.fabric.wisdom_pattern.clone()),
        ("Extracting links", "extract_links".to_string()),
    ]
    .into_iter()
    .map(|(label, pattern)| {
        let text = text.clone();
        Task::new(label, move || fabric::run_pattern(&pattern, &text))
    })
    .collect();

    let mut results = tokio::task::spawn_blocking(move || {
        let tracker = ProgressTracker::new();
        run_parallel(&tracker, SpinnerStyle::Dots, tasks)
    })
    .await?
    .into_iter();

    let mut summary = results.next().flatten();
    let wisdom = results.next().flatten();
    let links = results.next().flatten();

    if settings.openai.enabled && openai::has_api_key() {
        if let Some(text) = summary.take() {
            let prompts = Prompts::load(
                settings.prompts.custom_dir.as_deref(),
                Some(&settings.prompts.variables),
            )?;
            let spinner = Output::spinner("Enhancing summary with OpenAI...");
            let client = openai::create_client();
            let vars = HashMap::from([("text".to_string(), text.clone())]);
            let prompt = prompts.render_with_custom(&prompts.clip.enhance, &vars);
            summary = match openai::enhance_text(&client, &settings.openai.model, &prompt).await {
                Ok(enhanced) => Some(enhanced),
                Err(e) => {
                    debug!("enhancement failed, keeping original summary: {e}");
                    Some(text)
                }
            };
            spinner.finish_and_clear();
        }
    }

    let mut audio_file = None;
    if !no_audio && settings.tts.enabled && openai::has_api_key() {
        if let Some(summary) = &summary {
            let spinner = Output::spinner("Generating audio summary...");
            let filename = format!("{}-analysis.mp3", title.replace(' ', "_"));
            let path = desktop_path(&filename);
            let client = openai::create_client();
            match openai::synthesize_speech(&client, summary, &settings.tts.voice, &path).await {
                Ok(()) => audio_file = Some(filename),
                Err(e) => Output::warning(&format!("Audio summary failed: {e}")),
            }
            spinner.finish_and_clear();
        }
    }

    let markdown = render_markdown(
        &title,
        summary.as_deref(),
        wisdom.as_deref(),
        links.as_deref(),
        audio_file.as_deref(),
    );

    let output_path = unique_path(&desktop_path(&format!(
        "{}-analysis.md",
        title.replace(' ', "_")
    )));
    std::fs::write(&output_path, markdown)?;

    info!("clipboard analysis written to {}", output_path.display());
    Output::success(&format!("Analysis saved to {}", output_path.display()));
    Ok(())
}

/// Read text from the system clipboard.
fn read_clipboard() -> crate::error::Result<String> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| GleanError::Clipboard(e.to_string()))?;
    match clipboard.get_text() {
        Ok(text) => Ok(text),
        // An empty or non-text clipboard is not a failure.
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(GleanError::Clipboard(e.to_string())),
    }
}

/// Derive a title from the first line of the text.
fn auto_title(text: &str) -> String {
    let first_line = text.trim().lines().next().unwrap_or("");
    if first_line.is_empty() {
        return "ClipboardContent".to_string();
    }
    first_line.chars().take(AUTO_TITLE_LEN).collect()
}

fn render_markdown(
    title: &str,
    summary: Option<&str>,
    wisdom: Option<&str>,
    links: Option<&str>,
    audio_file: Option<&str>,
) -> String {
    let audio_section = match audio_file {
        Some(file) => format!("[Listen here]({file})"),
        None => "No audio summary".to_string(),
    };

    format!(
        "# Analysis of: {title}\n\n\
         ## Summary\n{}\n\n\
         ## Key Wisdom\n{}\n\n\
         ## Links/References\n{}\n\n\
         ## Audio Summary\n{audio_section}\n",
        summary.unwrap_or("No summary"),
        wisdom.unwrap_or("No wisdom"),
        links.unwrap_or("No links"),
    )
}
