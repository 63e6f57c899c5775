//! Jq command - generate and document jq filters from natural language.

use crate::artifacts::{desktop_path, unique_path};
use crate::cli::{preflight, Output};
use crate::config::{Prompts, Settings};
use crate::error::{GleanError, Result as GleanResult};
use crate::fabric::pipe_through;
use crate::ollama::OllamaClient;
use crate::progress::{ProgressTracker, SpinnerStyle};
use anyhow::Result;
use chrono::Local;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use tracing::{info, instrument};

/// Run the jq command.
#[instrument(skip(settings, output))]
pub async fn run_jq(
    query: &str,
    file: Option<String>,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(preflight::Operation::JqFilter)?;

    if query.trim().is_empty() {
        return Err(GleanError::InvalidInput("query must not be empty".into()).into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let query_owned = query.to_string();
    let source = file.clone().unwrap_or_else(|| "stdin".to_string());

    // The whole pipeline is blocking: stdin, Ollama generation, and the jq
    // subprocess all run off the async runtime.
    let (filter, json_input, result) = tokio::task::spawn_blocking(move || {
        let tracker = ProgressTracker::new();

        let json_input = tracker.track("Reading JSON input", SpinnerStyle::Dots, || {
            read_json_input(file.as_deref())
        })?;

        let client = OllamaClient::new(&settings.ollama.host, &settings.ollama.code_model)?;
        if !client.is_available() {
            return Err(GleanError::Ollama(format!(
                "Ollama not reachable at {}; start it with: ollama serve",
                settings.ollama.host
            )));
        }

        let filter = tracker.track("Generating jq filter", SpinnerStyle::Pulse, || {
            generate_filter(&client, &prompts, &json_input, &query_owned)
        })?;

        let result = tracker.track("Testing jq filter", SpinnerStyle::Bar, || {
            apply_filter(&json_input, &filter)
        })?;

        Ok::<_, GleanError>((filter, json_input, result))
    })
    .await??;

    let markdown = render_markdown(query, &filter, &json_input, &result, &source);

    let output_path = match output {
        Some(path) => PathBuf::from(path),
        None => {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            unique_path(&desktop_path(&format!("jq_filter_{stamp}.md")))
        }
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, markdown)?;

    info!("jq filter documented at {}", output_path.display());
    Output::success("Filter generated successfully!");
    Output::kv("jq filter", &filter);
    Output::kv("documentation", &output_path.display().to_string());
    Ok(())
}

/// Read and validate JSON from a file or stdin.
fn read_json_input(file: Option<&str>) -> GleanResult<String> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    serde_json::from_str::<serde_json::Value>(&content)
        .map_err(|e| GleanError::InvalidInput(format!("invalid JSON input: {e}")))?;
    Ok(content)
}

/// Ask the model for a filter and strip any stray backticks from the reply.
fn generate_filter(
    client: &OllamaClient,
    prompts: &Prompts,
    json_input: &str,
    query: &str,
) -> GleanResult<String> {
    let vars = HashMap::from([
        ("json".to_string(), json_input.to_string()),
        ("query".to_string(), query.to_string()),
    ]);
    let prompt = prompts.render_with_custom(&prompts.jq.generate, &vars);

    let response = client.generate(&prompt)?;
    let filter = clean_filter_response(&response);
    if filter.is_empty() {
        return Err(GleanError::Ollama("model returned an empty filter".into()));
    }
    Ok(filter)
}

/// Strip the wrappers models like to add around the filter: code fences,
/// backticks, quotes, and a "jq filter:" echo of the prompt.
fn clean_filter_response(response: &str) -> String {
    let mut text = response.trim();

    if let Some(stripped) = text.strip_prefix("```") {
        // Drop the fence language tag line, if any.
        text = stripped
            .split_once('\n')
            .map(|(_, rest)| rest)
            .unwrap_or(stripped);
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }

    const ECHO: &str = "jq filter:";
    if text.get(..ECHO.len()).is_some_and(|p| p.eq_ignore_ascii_case(ECHO)) {
        text = &text[ECHO.len()..];
    }

    text.trim()
        .trim_matches('`')
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}

/// Run the filter through jq to validate it and capture the output.
fn apply_filter(json_input: &str, filter: &str) -> GleanResult<String> {
    pipe_through(Command::new("jq").arg(filter), json_input)
}

fn render_markdown(
    query: &str,
    filter: &str,
    input_json: &str,
    output_json: &str,
    source: &str,
) -> String {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        "# jq Filter Documentation\n\
         Generated on: {now}\n\n\
         ## Query\n> {query}\n\n\
         ## Source\nInput from: `{source}`\n\n\
         ## jq Filter\n```jq\n{filter}\n```\n\n\
         ## Input Data (sample)\n```json\n{input_json}\n```\n\n\
         ## Output\n```json\n{output_json}\n```\n\n\
         ## Usage Examples\n\
         1. Using a file:\n   ```bash\n   jq '{filter}' input.json\n   ```\n\n\
         2. Using pipeline:\n   ```bash\n   cat input.json | jq '{filter}'\n   ```\n\n\
         3. With compact output:\n   ```bash\n   jq -c '{filter}' input.json\n   ```\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{"users": [{"name": "Alice", "age": 28}, {"name": "Bob", "age": 22}]}"#;

    #[test]
    fn test_read_json_input_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let content = read_json_input(Some(path.to_str().unwrap())).unwrap();
        assert!(content.contains("Alice"));
    }

    #[test]
    fn test_read_json_input_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();

        let err = read_json_input(Some(path.to_str().unwrap())).unwrap_err();
        assert!(matches!(err, GleanError::InvalidInput(_)));
    }

    #[test]
    fn test_clean_filter_response() {
        assert_eq!(clean_filter_response(".users[].name"), ".users[].name");
        assert_eq!(clean_filter_response("`.users[].name`"), ".users[].name");
        assert_eq!(clean_filter_response("\".users[].name\""), ".users[].name");
        assert_eq!(
            clean_filter_response("```jq\n.users[].name\n```"),
            ".users[].name"
        );
        assert_eq!(
            clean_filter_response("jq filter: .users[].name"),
            ".users[].name"
        );
        assert_eq!(clean_filter_response("   "), "");
    }

    #[test]
    fn test_apply_filter_valid() {
        let result = apply_filter(SAMPLE, ".users[].name").unwrap();
        assert!(result.contains("Alice"));
        assert!(result.contains("Bob"));
    }

    #[test]
    fn test_apply_filter_select() {
        let result = apply_filter(SAMPLE, ".users[] | select(.age > 25) | .name").unwrap();
        assert!(result.contains("Alice"));
        assert!(!result.contains("Bob"));
    }

    #[test]
    fn test_apply_filter_invalid_syntax() {
        assert!(apply_filter(SAMPLE, "invalid[filter").is_err());
        assert!(apply_filter(SAMPLE, "]broken[syntax").is_err());
    }

    #[test]
    fn test_render_markdown_contents() {
        let md = render_markdown(
            "get all user names",
            ".users[].name",
            SAMPLE,
            "\"Alice\"\n\"Bob\"",
            "data.json",
        );
        assert!(md.contains("# jq Filter Documentation"));
        assert!(md.contains("get all user names"));
        assert!(md.contains("```jq\n.users[].name\n```"));
        assert!(md.contains("`data.json`"));
    }
}
