//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::config::PromptsConfig;
use crate::error::BedtimeError;

/// Context for the `generate` template
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContext<'a> {
    pub category: &'a str,
    pub guidance: &'a str,
    pub request: &'a str,
}

/// Context for the `evaluate` template
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateContext<'a> {
    pub request: &'a str,
    pub story: &'a str,
}

/// Context for the `revise` template
#[derive(Debug, Clone, Serialize)]
pub struct ReviseContext<'a> {
    pub request: &'a str,
    pub story: &'a str,
    /// Pretty-printed evaluation record
    pub evaluation: &'a str,
    pub feedback: Option<&'a str>,
}

/// Prompt loader with override directories and embedded fallback
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    config_dir: Option<PathBuf>,
    project_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader
    ///
    /// * `config_dir` - explicit override directory from config
    /// * `base` - directory whose `.bedtime/prompts/` is checked next
    pub fn new(config_dir: Option<PathBuf>, base: impl AsRef<Path>) -> Self {
        let project_dir = base.as_ref().join(".bedtime").join("prompts");
        let project_dir_exists = project_dir.exists();
        debug!(?config_dir, ?project_dir, %project_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Self::handlebars(),
            config_dir,
            project_dir: if project_dir_exists { Some(project_dir) } else { None },
        }
    }

    /// Create a loader from the `prompts` config section, relative to the working directory
    pub fn from_config(config: &PromptsConfig) -> Self {
        debug!(?config, "PromptLoader::from_config: called");
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(config.dir.clone(), base)
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::handlebars(),
            config_dir: None,
            project_dir: None,
        }
    }

    fn handlebars() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Stories are plain text; escaping would mangle quotes and apostrophes
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Configured override directory: `{dir}/{name}.pmt`
    /// 2. Project override: `.bedtime/prompts/{name}.pmt`
    /// 3. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String, BedtimeError> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in [&self.config_dir, &self.project_dir].into_iter().flatten() {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| BedtimeError::Prompt(format!("Failed to read prompt {}: {}", path.display(), e)));
            }
            debug!(?path, "PromptLoader::load_template: not found in override directory");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: using embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(BedtimeError::Prompt(format!("Prompt template not found: {}", name)))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String, BedtimeError> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| BedtimeError::Prompt(format!("Failed to render template {}: {}", template_name, e)))
    }

    /// Load a system prompt; these take no variables
    pub fn system_prompt(&self, name: &str) -> Result<String, BedtimeError> {
        debug!(%name, "PromptLoader::system_prompt: called");
        self.load_template(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_generate() {
        let loader = PromptLoader::embedded_only();
        let rendered = loader
            .render(
                "generate",
                &GenerateContext {
                    category: "adventure",
                    guidance: "Keep it low-stakes.",
                    request: "A dragon who can't fly",
                },
            )
            .unwrap();

        assert!(rendered.contains("Request category: adventure"));
        assert!(rendered.contains("Keep it low-stakes."));
        assert!(rendered.contains("A dragon who can't fly"));
    }

    #[test]
    fn test_render_does_not_html_escape() {
        let loader = PromptLoader::embedded_only();
        let rendered = loader
            .render(
                "evaluate",
                &EvaluateContext {
                    request: "Tom & Jerry's \"big\" <nap>",
                    story: "It's late.",
                },
            )
            .unwrap();

        assert!(rendered.contains("Tom & Jerry's \"big\" <nap>"));
        assert!(rendered.contains("It's late."));
    }

    #[test]
    fn test_render_revise_feedback_section_is_conditional() {
        let loader = PromptLoader::embedded_only();
        let without = loader
            .render(
                "revise",
                &ReviseContext {
                    request: "a cat",
                    story: "The cat slept.",
                    evaluation: "{\"overall_score\": 6}",
                    feedback: None,
                },
            )
            .unwrap();
        assert!(without.contains("{\"overall_score\": 6}"));
        assert!(!without.contains("feedback from the user"));

        let with = loader
            .render(
                "revise",
                &ReviseContext {
                    request: "a cat",
                    story: "The cat slept.",
                    evaluation: "{}",
                    feedback: Some("make it funnier"),
                },
            )
            .unwrap();
        assert!(with.contains("feedback from the user"));
        assert!(with.contains("make it funnier"));
    }

    #[test]
    fn test_config_dir_overrides_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("storyteller.pmt"), "Custom storyteller").unwrap();

        let base = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(Some(dir.path().to_path_buf()), base.path());

        assert_eq!(loader.system_prompt("storyteller").unwrap(), "Custom storyteller");
        // Templates absent from the override dir still come from the binary
        assert!(loader.system_prompt("judge").unwrap().contains("overall_score"));
    }

    #[test]
    fn test_project_dir_override() {
        let base = tempfile::tempdir().unwrap();
        let project = base.path().join(".bedtime").join("prompts");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("evaluate.pmt"), "Judge {{story}} for {{request}}").unwrap();

        let loader = PromptLoader::new(None, base.path());
        let rendered = loader
            .render(
                "evaluate",
                &EvaluateContext {
                    request: "a fox",
                    story: "The fox yawned.",
                },
            )
            .unwrap();
        assert_eq!(rendered, "Judge The fox yawned. for a fox");
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let err = loader.load_template("nonexistent-template").unwrap_err();
        assert!(matches!(err, BedtimeError::Prompt(_)));
    }

    #[test]
    fn test_bad_template_is_prompt_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("generate.pmt"), "{{#if category}} unclosed").unwrap();
        let base = tempfile::tempdir().unwrap();
        let loader = PromptLoader::new(Some(dir.path().to_path_buf()), base.path());

        let result = loader.render(
            "generate",
            &GenerateContext {
                category: "general",
                guidance: "",
                request: "",
            },
        );
        assert!(matches!(result, Err(BedtimeError::Prompt(_))));
    }
}
