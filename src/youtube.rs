//! YouTube metadata, transcripts, and downloads via yt-dlp.

use crate::artifacts::sanitize_filename;
use crate::error::{GleanError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Metadata for a single video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub duration_seconds: u32,
    pub view_count: u64,
    pub upload_date: String,
    pub description: String,
}

impl VideoMetadata {
    pub fn url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.id)
    }

    /// Standard filename prefix: video ID plus sanitized title.
    pub fn filename_prefix(&self) -> String {
        format!("{}-{}", self.id, sanitize_filename(&self.title))
    }
}

/// Extract a video ID from a YouTube URL or a bare 11-character ID.
pub fn extract_video_id(input: &str) -> Option<String> {
    // Matches various YouTube URL formats and bare video IDs
    let re = Regex::new(
        r"(?x)
        (?:
            (?:https?://)?
            (?:www\.)?
            (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
            ([a-zA-Z0-9_-]{11})
        )
        |
        ^([a-zA-Z0-9_-]{11})$
    ",
    )
    .expect("Invalid regex");

    let caps = re.captures(input.trim())?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Fetch video metadata with yt-dlp.
pub async fn fetch_metadata(url: &str) -> Result<VideoMetadata> {
    let video_id = extract_video_id(url)
        .ok_or_else(|| GleanError::InvalidInput(format!("Invalid YouTube URL or ID: {url}")))?;
    let canonical = format!("https://www.youtube.com/watch?v={video_id}");

    let json = dump_json(&["--dump-json", "--no-download", "--no-warnings", &canonical]).await?;

    Ok(VideoMetadata {
        id: video_id,
        title: json["title"].as_str().unwrap_or("Untitled").to_string(),
        author: json["uploader"]
            .as_str()
            .or_else(|| json["channel"].as_str())
            .unwrap_or("Unknown")
            .to_string(),
        duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u32,
        view_count: json["view_count"].as_u64().unwrap_or(0),
        upload_date: json["upload_date"].as_str().unwrap_or("").to_string(),
        description: json["description"].as_str().unwrap_or("").to_string(),
    })
}

/// Fetch the auto-generated English transcript as plain text.
///
/// Asks yt-dlp for the caption track listing, downloads the VTT track, and
/// strips cue timing to leave readable text.
pub async fn fetch_transcript(url: &str) -> Result<String> {
    let json = dump_json(&[
        "--write-auto-subs",
        "--skip-download",
        "--sub-lang",
        "en",
        "--dump-json",
        "--no-warnings",
        url,
    ])
    .await?;

    let tracks = json["automatic_captions"]["en"]
        .as_array()
        .or_else(|| json["subtitles"]["en"].as_array())
        .ok_or_else(|| GleanError::TranscriptUnavailable("no English captions".into()))?;

    let track_url = tracks
        .iter()
        .find(|t| t["ext"].as_str() == Some("vtt"))
        .or_else(|| tracks.first())
        .and_then(|t| t["url"].as_str())
        .ok_or_else(|| GleanError::TranscriptUnavailable("no usable caption track".into()))?;

    debug!("downloading caption track");
    let raw = reqwest::get(track_url).await?.error_for_status()?.text().await?;

    Ok(vtt_to_text(&raw))
}

/// Download a video (or audio-only) into `output_path` with yt-dlp.
pub async fn download_media(url: &str, output_path: &Path, audio_only: bool) -> Result<()> {
    info!("downloading {} to {}", url, output_path.display());

    let mut cmd = Command::new("yt-dlp");
    if audio_only {
        cmd.arg("-x").arg("--audio-format").arg("mp3");
    } else {
        cmd.arg("-f").arg("bestvideo[ext=mp4]+bestaudio/best[ext=mp4]/best");
    }
    cmd.arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg("-o")
        .arg(output_path)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GleanError::ToolNotFound("yt-dlp".into())
        } else {
            GleanError::Download(format!("yt-dlp execution failed: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GleanError::Download(format!("yt-dlp failed: {stderr}")));
    }

    Ok(())
}

/// Run yt-dlp and parse its single-JSON-object stdout.
async fn dump_json(args: &[&str]) -> Result<serde_json::Value> {
    let output = Command::new("yt-dlp")
        .args(args)
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GleanError::ToolNotFound("yt-dlp".into())
            } else {
                GleanError::VideoSource(format!("Failed to run yt-dlp: {e}"))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GleanError::VideoSource(format!("yt-dlp failed: {stderr}")));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .map_err(|e| GleanError::VideoSource(format!("Failed to parse yt-dlp output: {e}")))
}

/// Strip WebVTT headers, cue timings, and markup, leaving plain text with
/// consecutive duplicate lines collapsed (auto captions repeat lines across
/// overlapping cues).
pub fn vtt_to_text(vtt: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").expect("Invalid regex");
    let mut lines: Vec<String> = Vec::new();

    for line in vtt.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("WEBVTT")
            || line.starts_with("Kind:")
            || line.starts_with("Language:")
            || line.starts_with("NOTE")
            || line.contains("-->")
        {
            continue;
        }

        let text = tag_re.replace_all(line, "").trim().to_string();
        if text.is_empty() {
            continue;
        }
        if lines.last().map(String::as_str) != Some(text.as_str()) {
            lines.push(text);
        }
    }

    lines.join("\n")
}

/// Format seconds as HH:MM:SS. Negative input clamps to zero.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Reformat a yt-dlp upload date (YYYYMMDD) as YYYY-MM-DD, passing invalid
/// input through unchanged.
pub fn format_upload_date(date: &str) -> String {
    chrono::NaiveDate::parse_from_str(date, "%Y%m%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_filename_prefix() {
        let meta = VideoMetadata {
            id: "dQw4w9WgXcQ".into(),
            title: "My Video: part 1".into(),
            author: "Someone".into(),
            duration_seconds: 60,
            view_count: 100,
            upload_date: "20240101".into(),
            description: String::new(),
        };
        assert_eq!(meta.filename_prefix(), "dQw4w9WgXcQ-My_Video_part_1");
    }

    #[test]
    fn test_vtt_to_text() {
        let vtt = "\
WEBVTT
Kind: captions
Language: en

00:00:00.000 --> 00:00:02.000
hello <c>world</c>

00:00:02.000 --> 00:00:04.000
hello world

00:00:04.000 --> 00:00:06.000
second line
";
        assert_eq!(vtt_to_text(vtt), "hello world\nsecond line");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(61), "00:01:01");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(86399), "23:59:59");
        assert_eq!(format_duration(86400), "24:00:00");
        assert_eq!(format_duration(-1), "00:00:00");
    }

    #[test]
    fn test_format_upload_date() {
        assert_eq!(format_upload_date("20240101"), "2024-01-01");
        assert_eq!(format_upload_date("invalid"), "invalid");
        assert_eq!(format_upload_date(""), "");
    }
}
