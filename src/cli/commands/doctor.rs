//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::ollama::OllamaClient;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Glean Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool("yt-dlp", install_hint_ytdlp()),
        check_tool("fabric", "Install from: https://github.com/danielmiessler/fabric"),
        check_tool("jq", install_hint_jq()),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("AI Services").bold());
    let api_check = check_openai_api_key();
    api_check.print();
    checks.push(api_check);

    let ollama_check = check_ollama(settings);
    ollama_check.print();
    checks.push(ollama_check);

    println!();

    println!("{}", style("Directories and Configuration").bold());
    let artifacts_check = check_artifacts_dir(settings);
    artifacts_check.print();
    checks.push(artifacts_check);

    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Some commands will not work until they are fixed.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Glean is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check if OpenAI API key is configured. Optional, so missing is a warning.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if !key.is_empty() => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        _ => CheckResult::warning(
            "OPENAI_API_KEY",
            "not set",
            "Text enhancement and audio summaries are disabled without it",
        ),
    }
}

/// Check if the Ollama server is reachable. Optional, so down is a warning.
fn check_ollama(settings: &Settings) -> CheckResult {
    let client = match OllamaClient::new(&settings.ollama.host, &settings.ollama.model) {
        Ok(client) => client,
        Err(e) => {
            return CheckResult::warning(
                "Ollama",
                &format!("client error: {e}"),
                "Check the [ollama] section of your config",
            );
        }
    };

    if !client.is_available() {
        return CheckResult::warning(
            "Ollama",
            &format!("not reachable at {}", settings.ollama.host),
            "Start it with: ollama serve",
        );
    }

    match client.list_models() {
        Ok(models) if models.iter().any(|m| m.starts_with(&settings.ollama.model)) => {
            CheckResult::ok("Ollama", &format!("running, model {} available", settings.ollama.model))
        }
        Ok(_) => CheckResult::warning(
            "Ollama",
            &format!("running, but model {} is not pulled", settings.ollama.model),
            &format!("Pull it with: ollama pull {}", settings.ollama.model),
        ),
        Err(e) => CheckResult::warning(
            "Ollama",
            &format!("error listing models: {e}"),
            "Check that the server is healthy: curl <host>/api/tags",
        ),
    }
}

/// Check the artifacts directory.
fn check_artifacts_dir(settings: &Settings) -> CheckResult {
    let dir = settings.artifacts_dir();
    if dir.exists() {
        CheckResult::ok("Artifacts directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Artifacts directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: glean config edit",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for jq.
fn install_hint_jq() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install jq"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install jq (or your package manager)"
    } else {
        "Install from: https://jqlang.github.io/jq/"
    }
}
