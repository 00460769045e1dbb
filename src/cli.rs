//! CLI interface for the candidate ranker

use crate::config::OutputFormat;
use crate::profile::ProfileDraft;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "candidate-ranker")]
#[command(about = "AI-assisted resume screening and candidate ranking")]
#[command(long_about = "Extract text from PDF/DOCX resumes, score each one against a job profile with an LLM, and rank the candidates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score and rank resumes against a job profile
    Rank {
        /// Resume files (PDF, DOCX)
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Output format: console, json, markdown, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show strengths, missing skills and summary per candidate
        #[arg(short, long)]
        detailed: bool,

        /// API key (defaults to the environment variable named in the config)
        #[arg(long)]
        api_key: Option<String>,

        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Number of documents scored at the same time
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct ProfileArgs {
    /// TOML file with title, must_haves, nice_to_haves and description
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Job title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Must-have requirements
    #[arg(long)]
    pub must_haves: Option<String>,

    /// Nice-to-have requirements
    #[arg(long)]
    pub nice_to_haves: Option<String>,

    /// Detailed role description
    #[arg(long)]
    pub description: Option<String>,
}

impl ProfileArgs {
    /// Flag values as a draft, to be laid over the profile file.
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            title: self.title.clone(),
            must_haves: self.must_haves.clone(),
            nice_to_haves: self.nice_to_haves.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html",
            format
        )),
    }
}
