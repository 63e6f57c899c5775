//! Local artifact storage and filesystem helpers.
//!
//! Intermediate outputs (cached transcripts, generated audio, downloads) live
//! under a per-user artifacts directory so repeated runs against the same
//! video or clipboard content skip the expensive fetch.

use crate::error::{GleanError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Artifact categories, each mapping to a subdirectory of the store.
pub const CATEGORIES: &[&str] = &["transcripts", "audio", "downloads", "temp"];

/// File-backed cache of intermediate outputs.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_dir: PathBuf,
}

impl ArtifactStore {
    /// Open (creating if needed) a store rooted at `base_dir`.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        for category in CATEGORIES {
            std::fs::create_dir_all(base_dir.join(category))?;
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Full path for an artifact; the filename is sanitized so callers can
    /// pass titles and other untrusted strings directly.
    pub fn path(&self, category: &str, filename: &str) -> PathBuf {
        self.base_dir.join(category).join(sanitize_filename(filename))
    }

    /// Write a text artifact, returning its path.
    pub fn save(&self, category: &str, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(category, filename);
        std::fs::write(&path, content)
            .map_err(|e| GleanError::Artifact(format!("writing {}: {e}", path.display())))?;
        debug!("saved artifact {}", path.display());
        Ok(path)
    }

    /// Write a binary artifact, returning its path.
    pub fn save_bytes(&self, category: &str, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path(category, filename);
        std::fs::write(&path, content)
            .map_err(|e| GleanError::Artifact(format!("writing {}: {e}", path.display())))?;
        Ok(path)
    }

    /// Read a text artifact if present. Missing files are a cache miss, not
    /// an error.
    pub fn load(&self, category: &str, filename: &str) -> Option<String> {
        let path = self.path(category, filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("failed to read artifact {}: {e}", path.display());
                None
            }
        }
    }

    /// Delete artifacts older than `max_age_seconds` in the given category,
    /// or across all categories if none is given. Returns the number removed.
    pub fn cleanup(&self, category: Option<&str>, max_age_seconds: u64) -> Result<usize> {
        let categories: Vec<&str> = match category {
            Some(c) => vec![c],
            None => CATEGORIES.to_vec(),
        };

        let now = SystemTime::now();
        let mut removed = 0;

        for cat in categories {
            let dir = self.base_dir.join(cat);
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            for entry in entries {
                let entry = entry?;
                let modified = entry.metadata()?.modified()?;
                let age = now.duration_since(modified).unwrap_or_default();
                if age.as_secs() > max_age_seconds {
                    if let Err(e) = std::fs::remove_file(entry.path()) {
                        warn!("failed to remove {}: {e}", entry.path().display());
                    } else {
                        removed += 1;
                    }
                }
            }
        }

        Ok(removed)
    }
}

/// Make a string safe to use as a filename on any platform.
///
/// Spaces become underscores, path separators and other reserved characters
/// are dropped, leading and trailing dots are stripped, and the result is
/// capped at 255 characters.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .take(255)
        .collect();

    cleaned.trim_matches(|c| c == '.' || c == ' ').to_string()
}

/// Append `_1`, `_2`, ... before the extension until the path is unused.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    let mut counter = 1;
    loop {
        let candidate = match ext {
            Some(ext) => parent.join(format!("{stem}_{counter}.{ext}")),
            None => parent.join(format!("{stem}_{counter}")),
        };
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Path for a report on the user's desktop, falling back to the home
/// directory when no Desktop folder exists.
pub fn desktop_path(filename: &str) -> PathBuf {
    let dir = dirs::desktop_dir()
        .filter(|d| d.is_dir())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(sanitize_filename(filename))
}

/// Parse a duration like `7d`, `24h`, `60m`, or `30s` into seconds.
pub fn parse_max_age(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.len() < 2 {
        return None;
    }

    let (value, unit) = input.split_at(input.len() - 1);
    let value: u64 = value.parse().ok()?;

    let multiplier = match unit {
        "d" => 24 * 60 * 60,
        "h" => 60 * 60,
        "m" => 60,
        "s" => 1,
        _ => return None,
    };

    Some(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("hello world"), "hello_world");
        assert_eq!(sanitize_filename("file/with\\invalid:chars"), "filewithinvalidchars");
        assert_eq!(sanitize_filename("..hidden"), "hidden");
        assert_eq!(sanitize_filename("file.txt"), "file.txt");
        assert_eq!(sanitize_filename("file?.txt"), "file.txt");
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename(&"a".repeat(300)), "a".repeat(255));
    }

    #[test]
    fn test_parse_max_age() {
        assert_eq!(parse_max_age("7d"), Some(7 * 24 * 60 * 60));
        assert_eq!(parse_max_age("24h"), Some(24 * 60 * 60));
        assert_eq!(parse_max_age("60m"), Some(60 * 60));
        assert_eq!(parse_max_age("30s"), Some(30));
        assert_eq!(parse_max_age("0d"), Some(0));
        assert_eq!(parse_max_age("invalid"), None);
        assert_eq!(parse_max_age("10x"), None);
        assert_eq!(parse_max_age(""), None);
    }

    #[test]
    fn test_unique_path_appends_counter() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");

        assert_eq!(unique_path(&path), path);

        std::fs::write(&path, "content").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("test_1.txt"));

        std::fs::write(dir.path().join("test_1.txt"), "content").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("test_2.txt"));
    }

    #[test]
    fn test_store_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();

        let path = store.save("transcripts", "abc123.txt", "transcript text").unwrap();
        assert!(path.ends_with("transcripts/abc123.txt"));
        assert_eq!(store.load("transcripts", "abc123.txt").unwrap(), "transcript text");
    }

    #[test]
    fn test_store_load_miss_is_none() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(store.load("transcripts", "nope.txt").is_none());
    }

    #[test]
    fn test_store_sanitizes_filenames() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();

        let path = store.path("downloads", "unsafe/../../file.txt");
        assert!(!path.to_string_lossy().contains("../"));
        assert!(path.starts_with(dir.path().join("downloads")));
    }

    #[test]
    fn test_cleanup_removes_only_old_files() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        store.save("temp", "fresh.txt", "x").unwrap();

        // Everything was just created, so a 1-hour cutoff removes nothing.
        let removed = store.cleanup(Some("temp"), 3600).unwrap();
        assert_eq!(removed, 0);
        assert!(store.load("temp", "fresh.txt").is_some());

        // A zero-second cutoff removes it.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let removed = store.cleanup(Some("temp"), 0).unwrap();
        assert_eq!(removed, 1);
        assert!(store.load("temp", "fresh.txt").is_none());
    }
}
