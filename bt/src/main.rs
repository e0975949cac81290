//! Bedtime - story generator with a judge in the loop
//!
//! CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use bedtime::cli::{Cli, Command, OutputFormat};
use bedtime::config::Config;
use bedtime::error::BedtimeError;
use bedtime::domain::{StoryDraft, StoryRequest};
use bedtime::llm::create_client;
use bedtime::prompts::PromptLoader;
use bedtime::r#loop::{StoryLoop, StoryOutcome};
use bedtime::repl::{ConsoleReporter, read_line, render_story, render_summary};
use bedtime::story::{Judge, classify, is_acceptable};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bedtime")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Log to file; the terminal belongs to the story
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("bedtime.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env next to where bt is run
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "Bedtime loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        Some(Command::Tell {
            request,
            feedback,
            no_feedback,
            threshold,
            max_revisions,
            format,
        }) => {
            let config = config.with_overrides(threshold, max_revisions);
            let feedback = if no_feedback { FeedbackMode::Skip } else { FeedbackMode::from(feedback) };
            cmd_tell(&config, request, feedback, format).await
        }
        Some(Command::Classify { request }) => cmd_classify(&request),
        Some(Command::Judge { request, file, format }) => cmd_judge(&config, &request, &file, format).await,
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// How to get the optional user feedback
enum FeedbackMode {
    Prompt,
    Given(String),
    Skip,
}

impl From<Option<String>> for FeedbackMode {
    fn from(feedback: Option<String>) -> Self {
        match feedback {
            Some(text) => FeedbackMode::Given(text),
            None => FeedbackMode::Prompt,
        }
    }
}

/// Run the full pipeline for one request
async fn cmd_tell(
    config: &Config,
    request: Option<String>,
    feedback: FeedbackMode,
    format: OutputFormat,
) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = Arc::new(PromptLoader::from_config(&config.prompts));

    let text_output = format == OutputFormat::Text;

    let request_text = match request {
        Some(text) => text,
        None => {
            println!("{}", "=== Bedtime Story Generator ===".bright_cyan().bold());
            println!("Describe the kind of bedtime story you want.");
            read_line("Story request: ")?.ok_or_else(|| eyre::eyre!("No story request given"))?
        }
    };
    let request = StoryRequest::new(request_text);
    info!(category = %classify(request.as_str()), "Starting story loop");

    let mut story = StoryLoop::new(request, llm, prompts, config.story.clone());
    if text_output {
        story = story.with_observer(Box::new(ConsoleReporter));
        println!();
        println!("{}", "Generating initial story draft...".dimmed());
        println!();
    }

    let mut outcome = story.run().await.map_err(with_hint)?;
    if text_output {
        print_outcome("FINAL STORY AFTER AUTOMATED LOOP", &outcome);
    }

    let feedback = match feedback {
        FeedbackMode::Skip => None,
        FeedbackMode::Given(text) => Some(text),
        // Prompting would corrupt machine-readable output
        FeedbackMode::Prompt if !text_output => None,
        FeedbackMode::Prompt => {
            println!("----------------------------------------");
            println!("Would you like to request any changes to the story?");
            println!("For example: 'make it shorter', 'more funny', 'more engaging'.");
            read_line("Enter feedback or press Enter to keep the story as is: ")?
        }
    };

    match feedback {
        Some(text) => match story.apply_feedback(&text).await.map_err(with_hint)? {
            Some(updated) => {
                outcome = updated;
                if text_output {
                    print_outcome("UPDATED STORY AFTER YOUR FEEDBACK", &outcome);
                }
            }
            None => print_kept(text_output),
        },
        None => print_kept(text_output),
    }

    if !text_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Ok(())
}

/// Attach the user-facing hint, if any, to a pipeline error
fn with_hint(err: BedtimeError) -> eyre::Report {
    match err.hint() {
        Some(hint) => eyre::Report::new(err).wrap_err(hint),
        None => eyre::Report::new(err),
    }
}

fn print_kept(text_output: bool) {
    if text_output {
        println!();
        println!("No additional feedback provided. Story kept as-is.");
    }
}

fn print_outcome(title: &str, outcome: &StoryOutcome) {
    println!();
    println!("{}", render_story(title, &outcome.story));
    println!(
        "{}",
        format!(
            "Termination: {} after {} judging(s) and {} revision(s)",
            outcome.termination, outcome.judgings, outcome.revisions
        )
        .dimmed()
    );
    println!("{}", render_summary(&outcome.evaluation));
}

/// Show the category for a request; makes no model call
fn cmd_classify(request: &str) -> Result<()> {
    let category = classify(request);
    println!("{}", category.label().bright_green().bold());
    println!("{}", category.guidance());
    Ok(())
}

/// Judge an existing story once
async fn cmd_judge(config: &Config, request: &str, file: &Path, format: OutputFormat) -> Result<()> {
    let text = fs::read_to_string(file).context(format!("Failed to read story from {}", file.display()))?;

    config.validate().context("Invalid configuration")?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = Arc::new(PromptLoader::from_config(&config.prompts));

    let request = StoryRequest::new(request);
    let judge = Judge::new(llm, prompts, config.story.judging);
    let evaluation = judge
        .evaluate(&request, &StoryDraft::generated(text))
        .await
        .map_err(with_hint)?;
    let acceptable = is_acceptable(&evaluation, config.story.acceptance_threshold);

    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "request": request,
                "acceptable": acceptable,
                "threshold": config.story.acceptance_threshold,
                "evaluation": evaluation,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            println!("{}", render_summary(&evaluation));
            if acceptable {
                println!("{}", "Good enough for bedtime.".green().bold());
            } else {
                println!(
                    "{}",
                    format!("Below the acceptance threshold of {}.", config.story.acceptance_threshold)
                        .yellow()
                        .bold()
                );
            }
        }
    }
    Ok(())
}
