//! Wisdom command - extract summary, insights, and references from a video.

use crate::artifacts::{desktop_path, unique_path, ArtifactStore};
use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::fabric;
use crate::ollama::OllamaClient;
use crate::progress::{run_parallel, ProgressTracker, SpinnerStyle, Task};
use crate::youtube::{self, VideoMetadata};
use crate::{config::Prompts, openai};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Run the wisdom command.
#[instrument(skip(settings, output))]
pub async fn run_wisdom(
    url: &str,
    no_ollama: bool,
    no_audio: bool,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(preflight::Operation::Wisdom)?;

    Output::header("YouTube Wisdom");

    let store = ArtifactStore::open(settings.artifacts_dir())?;
    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    // Metadata and transcript are sequential; everything downstream fans out.
    let spinner = Output::spinner("Fetching video metadata...");
    let metadata = youtube::fetch_metadata(url).await?;
    spinner.finish_and_clear();
    Output::info(&format!("Processing: {} by {}", metadata.title, metadata.author));

    let transcript = fetch_transcript_cached(url, &metadata, &store).await?;

    let ollama = OllamaClient::new(&settings.ollama.host, &settings.ollama.model)?;
    let use_ollama = !no_ollama && ollama.is_available();
    if !no_ollama && !use_ollama {
        Output::warning(&format!(
            "Ollama not reachable at {}; skipping AI link analysis and frontmatter",
            settings.ollama.host
        ));
    }

    let mut analysis = analyze(
        &settings,
        &prompts,
        &metadata,
        transcript,
        use_ollama.then(|| ollama),
    )
    .await?;

    let mut wisdom = analysis.wisdom.take();
    if settings.openai.enabled && openai::has_api_key() {
        if let Some(text) = wisdom.take() {
            let spinner = Output::spinner("Enhancing insights with OpenAI...");
            let client = openai::create_client();
            let vars = HashMap::from([("text".to_string(), text.clone())]);
            let prompt = prompts.render_with_custom(&prompts.wisdom.enhance, &vars);
            wisdom = match openai::enhance_text(&client, &settings.openai.model, &prompt).await {
                Ok(enhanced) => Some(enhanced),
                Err(e) => {
                    debug!("enhancement failed, keeping original insights: {e}");
                    Some(text)
                }
            };
            spinner.finish_and_clear();
        }
    }

    // Audio summary via TTS, best effort.
    let mut audio_file = None;
    if !no_audio && settings.tts.enabled && openai::has_api_key() {
        if let Some(summary) = &analysis.summary {
            let spinner = Output::spinner("Generating audio summary...");
            let filename = format!("{}-summary.mp3", metadata.filename_prefix());
            let path = desktop_path(&filename);
            let client = openai::create_client();
            match openai::synthesize_speech(&client, summary, &settings.tts.voice, &path).await {
                Ok(()) => audio_file = Some(filename),
                Err(e) => Output::warning(&format!("Audio summary failed: {e}")),
            }
            spinner.finish_and_clear();
        }
    }

    let markdown = render_markdown(&metadata, &analysis, wisdom.as_deref(), audio_file.as_deref());

    let output_path = match output {
        Some(path) => PathBuf::from(path),
        None => unique_path(&desktop_path(&format!("{}.md", metadata.filename_prefix()))),
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, markdown)?;

    info!("wisdom document written to {}", output_path.display());
    Output::success(&format!("Output: {}", output_path.display()));
    if audio_file.is_some() {
        Output::list_item("Audio summary generated");
    }
    if use_ollama {
        Output::list_item("Ollama AI analysis applied");
    }

    Ok(())
}

/// Results of the parallel analysis stage. Each part is None when its task
/// failed or was skipped; the document degrades to placeholders.
struct Analysis {
    summary: Option<String>,
    wisdom: Option<String>,
    references: Option<String>,
    ollama_links: Option<String>,
    frontmatter: Option<String>,
}

/// Fan out the fabric patterns and optional Ollama analyses over the
/// transcript. Runs on a blocking thread pool slot since every task is
/// subprocess- or blocking-HTTP-bound.
async fn analyze(
    settings: &Settings,
    prompts: &Prompts,
    metadata: &VideoMetadata,
    transcript: String,
    ollama: Option<OllamaClient>,
) -> Result<Analysis> {
    let mut tasks: Vec<Task<String>> = vec![
        {
            let transcript = transcript.clone();
            let pattern = settings.fabric.summary_pattern.clone();
            Task::new("Generating summary", move || {
                fabric::run_pattern(&pattern, &transcript)
            })
        },
        {
            let transcript = transcript.clone();
            let pattern = settings.fabric.wisdom_pattern.clone();
            Task::new("Extracting insights", move || {
                fabric::run_pattern(&pattern, &transcript)
            })
        },
        {
            let transcript = transcript.clone();
            let pattern = settings.fabric.references_pattern.clone();
            Task::new("Finding references", move || {
                fabric::run_pattern(&pattern, &transcript)
            })
        },
    ];

    let with_ollama = ollama.is_some();
    if let Some(client) = ollama {
        let link_vars = HashMap::from([
            ("text".to_string(), transcript.clone()),
            ("video_url".to_string(), metadata.url()),
            ("description".to_string(), metadata.description.clone()),
        ]);
        let link_prompt = prompts.render_with_custom(&prompts.wisdom.link_extraction, &link_vars);

        let fm_vars = HashMap::from([
            ("title".to_string(), metadata.title.clone()),
            ("author".to_string(), metadata.author.clone()),
            ("video_url".to_string(), metadata.url()),
            (
                "duration".to_string(),
                youtube::format_duration(metadata.duration_seconds as i64),
            ),
            ("views".to_string(), metadata.view_count.to_string()),
            (
                "upload_date".to_string(),
                youtube::format_upload_date(&metadata.upload_date),
            ),
            ("description".to_string(), metadata.description.clone()),
        ]);
        let fm_prompt = prompts.render_with_custom(&prompts.wisdom.frontmatter, &fm_vars);

        let link_client = client.clone();
        tasks.push(Task::new("Analyzing links with Ollama", move || {
            link_client.generate(&link_prompt)
        }));
        tasks.push(Task::new("Generating frontmatter", move || {
            client.generate(&fm_prompt)
        }));
    }

    let mut results = tokio::task::spawn_blocking(move || {
        let tracker = ProgressTracker::new();
        run_parallel(&tracker, SpinnerStyle::Dots, tasks)
    })
    .await?
    .into_iter();

    Ok(Analysis {
        summary: results.next().flatten(),
        wisdom: results.next().flatten(),
        references: results.next().flatten(),
        ollama_links: with_ollama.then(|| results.next().flatten()).flatten(),
        frontmatter: with_ollama.then(|| results.next().flatten()).flatten(),
    })
}

/// Fetch the transcript, serving from the artifact store when cached.
async fn fetch_transcript_cached(
    url: &str,
    metadata: &VideoMetadata,
    store: &ArtifactStore,
) -> Result<String> {
    let cache_name = format!("{}.txt", metadata.id);

    if let Some(cached) = store.load("transcripts", &cache_name) {
        debug!("using cached transcript for {}", metadata.id);
        return Ok(cached);
    }

    let spinner = Output::spinner("Downloading transcript...");
    let transcript = youtube::fetch_transcript(url).await?;
    spinner.finish_and_clear();

    store.save("transcripts", &cache_name, &transcript)?;
    Ok(transcript)
}

fn render_markdown(
    metadata: &VideoMetadata,
    analysis: &Analysis,
    wisdom: Option<&str>,
    audio_file: Option<&str>,
) -> String {
    let frontmatter = analysis.frontmatter.clone().unwrap_or_else(|| {
        format!(
            "---\ntitle: \"{}\"\nauthor: \"{}\"\n---",
            metadata.title, metadata.author
        )
    });

    let audio_section = match audio_file {
        Some(file) => format!("[Listen to summary]({file})"),
        None => "Audio summary not available".to_string(),
    };

    format!(
        "{frontmatter}\n\n\
         # {title}\n\n\
         ## Video Information\n\
         - **Author:** {author}\n\
         - **Video ID:** [{id}]({url})\n\
         - **Duration:** {duration}\n\
         - **Views:** {views}\n\
         - **Upload Date:** {upload_date}\n\n\
         ## Summary\n{summary}\n\n\
         ## Key Insights\n{wisdom}\n\n\
         ## Referenced Links and Resources\n\n\
         ### AI-Enhanced Link Analysis\n{ollama_links}\n\n\
         ### Pattern-Matched References\n{references}\n\n\
         ## Audio Summary\n{audio_section}\n\n\
         ## Original Description\n```\n{description}\n```\n",
        title = metadata.title,
        author = metadata.author,
        id = metadata.id,
        url = metadata.url(),
        duration = youtube::format_duration(metadata.duration_seconds as i64),
        views = metadata.view_count,
        upload_date = youtube::format_upload_date(&metadata.upload_date),
        summary = analysis.summary.as_deref().unwrap_or("No summary available"),
        wisdom = wisdom.unwrap_or("No insights extracted"),
        ollama_links = analysis
            .ollama_links
            .as_deref()
            .unwrap_or("No AI-enhanced link analysis available"),
        references = analysis
            .references
            .as_deref()
            .unwrap_or("No pattern-matched references found"),
        description = metadata.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            id: "dQw4w9WgXcQ".into(),
            title: "Test Video".into(),
            author: "Tester".into(),
            duration_seconds: 3661,
            view_count: 1234,
            upload_date: "20240101".into(),
            description: "about things".into(),
        }
    }

    #[test]
    fn test_render_markdown_full() {
        let analysis = Analysis {
            summary: Some("the summary".into()),
            wisdom: Some("ignored, replaced".into()),
            references: Some("- a link".into()),
            ollama_links: Some("## Direct Links".into()),
            frontmatter: Some("---\ntitle: \"Test Video\"\n---".into()),
        };

        let md = render_markdown(&metadata(), &analysis, Some("sharp insight"), Some("out.mp3"));
        assert!(md.starts_with("---\ntitle: \"Test Video\"\n---"));
        assert!(md.contains("## Summary\nthe summary"));
        assert!(md.contains("## Key Insights\nsharp insight"));
        assert!(md.contains("01:01:01"));
        assert!(md.contains("2024-01-01"));
        assert!(md.contains("[Listen to summary](out.mp3)"));
    }

    #[test]
    fn test_insights_taken_out_of_analysis_before_render() {
        // The enhancement step takes the insights out of the analysis and
        // hands the (possibly rewritten) text back to the renderer.
        let mut analysis = Analysis {
            summary: Some("the summary".into()),
            wisdom: Some("raw insights".into()),
            references: None,
            ollama_links: None,
            frontmatter: None,
        };

        let wisdom = analysis.wisdom.take();
        assert!(analysis.wisdom.is_none());

        let md = render_markdown(&metadata(), &analysis, wisdom.as_deref(), None);
        assert!(md.contains("## Key Insights\nraw insights"));
        assert!(md.contains("## Summary\nthe summary"));
    }

    #[test]
    fn test_render_markdown_degrades_to_placeholders() {
        let analysis = Analysis {
            summary: None,
            wisdom: None,
            references: None,
            ollama_links: None,
            frontmatter: None,
        };

        let md = render_markdown(&metadata(), &analysis, None, None);
        // Fallback frontmatter from metadata.
        assert!(md.starts_with("---\ntitle: \"Test Video\""));
        assert!(md.contains("No summary available"));
        assert!(md.contains("No insights extracted"));
        assert!(md.contains("Audio summary not available"));
    }
}
