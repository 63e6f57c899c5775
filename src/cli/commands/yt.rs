//! Yt command - transcript, metadata, download, and artifact utilities.

use crate::artifacts::{parse_max_age, ArtifactStore, CATEGORIES};
use crate::cli::{format_size, preflight, Output, YtAction};
use crate::config::Settings;
use crate::error::GleanError;
use crate::youtube;
use anyhow::Result;
use serde_json::json;
use tracing::{info, instrument};

/// Run the yt command.
#[instrument(skip(settings))]
pub async fn run_yt(action: &YtAction, settings: Settings) -> Result<()> {
    let store = ArtifactStore::open(settings.artifacts_dir())?;

    match action {
        YtAction::Transcript { url, json: as_json, no_save } => {
            preflight::check(preflight::Operation::Youtube)?;
            run_transcript(url, *as_json, !*no_save, &store).await
        }
        YtAction::Info { url } => {
            preflight::check(preflight::Operation::Youtube)?;
            run_info(url).await
        }
        YtAction::Download { url, audio } => {
            preflight::check(preflight::Operation::Youtube)?;
            run_download(url, *audio, &store).await
        }
        YtAction::List { category } => run_list(category, &store),
        YtAction::Cleanup { category, max_age } => run_cleanup(category, max_age, &store),
    }
}

async fn run_transcript(
    url: &str,
    as_json: bool,
    save: bool,
    store: &ArtifactStore,
) -> Result<()> {
    let spinner = Output::spinner("Fetching video metadata...");
    let metadata = youtube::fetch_metadata(url).await?;
    spinner.finish_and_clear();

    Output::info(&format!("Processing: {}", metadata.title));
    Output::kv("author", &metadata.author);
    Output::kv(
        "duration",
        &youtube::format_duration(metadata.duration_seconds as i64),
    );

    let cache_name = format!("{}.txt", metadata.id);
    let transcript = match store.load("transcripts", &cache_name) {
        Some(cached) => cached,
        None => {
            let spinner = Output::spinner("Downloading transcript...");
            let transcript = youtube::fetch_transcript(url).await?;
            spinner.finish_and_clear();
            transcript
        }
    };

    if as_json {
        let doc = json!({
            "video_id": metadata.id,
            "title": metadata.title,
            "transcript": transcript,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{transcript}");
    }

    if save {
        let path = store.save("transcripts", &cache_name, &transcript)?;
        Output::info(&format!("Transcript saved: {}", path.display()));
    }

    Ok(())
}

async fn run_info(url: &str) -> Result<()> {
    let spinner = Output::spinner("Fetching video metadata...");
    let metadata = youtube::fetch_metadata(url).await?;
    spinner.finish_and_clear();

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

async fn run_download(url: &str, audio_only: bool, store: &ArtifactStore) -> Result<()> {
    let spinner = Output::spinner("Fetching video metadata...");
    let metadata = youtube::fetch_metadata(url).await?;
    spinner.finish_and_clear();

    let ext = if audio_only { "mp3" } else { "mp4" };
    let filename = format!("{}.{ext}", metadata.filename_prefix());
    let output_path = store.path("downloads", &filename);

    Output::info(&format!("Downloading: {}", metadata.title));
    let spinner = Output::spinner("Downloading media...");
    youtube::download_media(url, &output_path, audio_only).await?;
    spinner.finish_and_clear();

    let size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
    info!("downloaded {} ({})", output_path.display(), format_size(size));
    Output::success(&format!("Download complete: {}", output_path.display()));
    Output::kv("size", &format_size(size));
    Ok(())
}

fn run_list(category: &str, store: &ArtifactStore) -> Result<()> {
    for cat in resolve_categories(category)? {
        Output::header(cat);

        let dir = store.base_dir().join(cat);
        let mut entries: Vec<_> = match std::fs::read_dir(&dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).collect(),
            Err(_) => Vec::new(),
        };
        entries.sort_by_key(|e| e.file_name());

        if entries.is_empty() {
            println!("  No files found");
            continue;
        }

        for entry in entries {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            Output::list_item(&format!(
                "{} ({})",
                entry.file_name().to_string_lossy(),
                format_size(size)
            ));
        }
    }
    Ok(())
}

fn run_cleanup(category: &str, max_age: &str, store: &ArtifactStore) -> Result<()> {
    let seconds = parse_max_age(max_age).ok_or_else(|| {
        GleanError::InvalidInput(format!(
            "invalid max age '{max_age}'; expected e.g. 7d, 24h, 30m"
        ))
    })?;

    let mut total = 0;
    for cat in resolve_categories(category)? {
        let removed = store.cleanup(Some(cat), seconds)?;
        if removed > 0 {
            Output::info(&format!("{cat}: removed {removed} file(s)"));
        }
        total += removed;
    }

    Output::success(&format!("Removed {total} file(s)"));
    Ok(())
}

fn resolve_categories(category: &str) -> Result<Vec<&'static str>> {
    if category == "all" {
        return Ok(CATEGORIES.to_vec());
    }
    CATEGORIES
        .iter()
        .find(|c| **c == category)
        .map(|c| vec![*c])
        .ok_or_else(|| {
            GleanError::InvalidInput(format!(
                "unknown category '{category}'; expected one of {} or all",
                CATEGORIES.join(", ")
            ))
            .into()
        })
}
