//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bedtime - draft, judge and revise children's bedtime stories
#[derive(Parser)]
#[command(
    name = "bt",
    about = "Generate a bedtime story, have it judged, and revise it until it is good enough",
    version,
    after_help = "Logs are written to: ~/.local/share/bedtime/logs/bedtime.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Write a story: draft, judge, revise, then optionally apply your feedback
    Tell {
        /// What the story should be about (prompted for when omitted)
        request: Option<String>,

        /// Feedback to apply after the automated loop, without prompting
        #[arg(long, conflicts_with = "no_feedback")]
        feedback: Option<String>,

        /// Skip the feedback prompt
        #[arg(long)]
        no_feedback: bool,

        /// Minimum overall score (1-10) to accept a draft
        #[arg(short, long)]
        threshold: Option<i64>,

        /// Maximum automated revisions
        #[arg(short = 'r', long)]
        max_revisions: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show which category a request falls into (no model call)
    Classify {
        /// The story request
        request: String,
    },

    /// Judge an existing story file once
    Judge {
        /// The request the story was written for
        #[arg(short, long)]
        request: String,

        /// File containing the story text
        file: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
