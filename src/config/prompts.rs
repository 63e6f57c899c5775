//! Prompt templates for glean.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub wisdom: WisdomPrompts,
    pub jq: JqPrompts,
    pub clip: ClipPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}
/// Prompts for video wisdom extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WisdomPrompts {
    /// Extracts links and resources from a transcript.
    pub link_extraction: String,
    /// Generates YAML frontmatter from video metadata.
    pub frontmatter: String,
    /// Refines extracted insights.
    pub enhance: String,
}

impl Default for WisdomPrompts {
    fn default() -> Self {
        Self {
            link_extraction: r#"Please analyze the following text and extract all relevant links and resources mentioned.
Include both explicit URLs and references to resources (like books, tools, websites, etc.).
For each link or resource, provide a brief description of what it is.

Also consider these additional sources:
Video URL: {{video_url}}
Video Description: {{description}}

Format the output as a markdown list with categories.
Example:
## Direct Links
- [Example.com](https://example.com) - Main website discussed
- [GitHub Repo](https://github.com/example) - Source code repository

## Mentioned Resources
- "Clean Code" by Robert Martin - Book recommended for software design
- Visual Studio Code - Recommended IDE for development

Text to analyze:
{{text}}"#
                .to_string(),

            frontmatter: r#"Generate YAML frontmatter for a markdown document about a YouTube video.
Use the following information to create comprehensive, well-organized frontmatter.

Title: {{title}}
Author: {{author}}
Video URL: {{video_url}}
Duration: {{duration}}
Views: {{views}}
Upload Date: {{upload_date}}
Description: {{description}}

The frontmatter should include:
- Basic video metadata (title, author, url, etc.)
- Topics/tags extracted from the content
- Type of content (tutorial, review, discussion, etc.)
- Skill level (beginner, intermediate, advanced)
- Key technologies or concepts mentioned
- Estimated reading time

Format as YAML between triple dashes (---).
Example:
---
title: "Example Video"
author: "John Doe"
type: "tutorial"
skill_level: "intermediate"
topics: ["python", "web development"]
---

PLEASE ONLY RETURN VALID FRONTMATTER YAML, TERMINATED BY triple dashes at the start AND end. Don't forget the --- at the end!"#
                .to_string(),

            enhance: "Enhance and refine this text:\n\n{{text}}".to_string(),
        }
    }
}

/// Prompts for jq filter generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JqPrompts {
    pub generate: String,
}

impl Default for JqPrompts {
    fn default() -> Self {
        Self {
            generate: r#"Given this JSON content:
```json
{{json}}
```

Generate a jq filter to: {{query}}

Here are some example transformations:
1. Get all names: .[]?.name
2. Extract emails: [.[].email]
3. Count items by type: group_by(.type) | map({key: .[0].type, count: length})
4. Filter and transform: map(select(.age > 25) | {name, city})
5. Calculate averages: [.[].value] | add / length
6. Complex grouping: group_by(.category) | map({category: .[0].category, items: map(.name)})

Requirements:
1. Return ONLY the jq filter, nothing else
2. The filter must be valid jq syntax
3. Do not include backticks or quotes around the filter
4. Keep the filter as simple as possible while meeting the requirements
5. Handle potential null values safely

jq filter:"#
                .to_string(),
        }
    }
}

/// Prompts for clipboard analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipPrompts {
    /// Refines the clipboard summary before TTS.
    pub enhance: String,
}

impl Default for ClipPrompts {
    fn default() -> Self {
        Self {
            enhance: "Enhance and refine this text:\n\n{{text}}".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let wisdom_path = custom_path.join("wisdom.toml");
            if wisdom_path.exists() {
                let content = std::fs::read_to_string(&wisdom_path)?;
                prompts.wisdom = toml::from_str(&content)?;
            }

            let jq_path = custom_path.join("jq.toml");
            if jq_path.exists() {
                let content = std::fs::read_to_string(&jq_path)?;
                prompts.jq = toml::from_str(&content)?;
            }

            let clip_path = custom_path.join("clip.toml");
            if clip_path.exists() {
                let content = std::fs::read_to_string(&clip_path)?;
                prompts.clip = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.wisdom.link_extraction.contains("{{video_url}}"));
        assert!(prompts.jq.generate.contains("{{query}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_dir_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("jq.toml"),
            "generate = \"custom filter prompt {{query}}\"\n",
        )
        .unwrap();

        let prompts =
            Prompts::load(Some(dir.path().to_str().unwrap()), None).unwrap();
        assert_eq!(prompts.jq.generate, "custom filter prompt {{query}}");
        // Untouched sections keep their defaults.
        assert!(prompts.wisdom.frontmatter.contains("YAML"));
    }
}
