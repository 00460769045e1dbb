//! candidate-ranker: score resumes against a job profile and rank the candidates

use candidate_ranker::cli::{self, Cli, Commands, ConfigAction, ProfileArgs};
use candidate_ranker::config::{ApiKey, Config};
use candidate_ranker::error::{RankerError, Result};
use candidate_ranker::input::{DocumentExtractor, InputManager};
use candidate_ranker::llm::{OpenAiBackend, ScoringClient};
use candidate_ranker::output::formatter::{save_report_to_file, suggest_filename};
use candidate_ranker::output::{RankingReport, ReportGenerator};
use candidate_ranker::processing::CandidatePipeline;
use candidate_ranker::profile::{JobProfile, ProfileDraft};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Rank {
            resumes,
            profile,
            output,
            save,
            detailed,
            api_key,
            model,
            concurrency,
        } => {
            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(RankerError::InvalidInput)?,
                None => config.output.format,
            };
            if let Some(model) = model {
                config.llm.model = model;
            }
            if let Some(concurrency) = concurrency {
                config.pipeline.concurrency = concurrency;
            }
            config.validate()?;

            // Everything that can stop a run is checked before any document is touched.
            let job = resolve_profile(&profile)?;
            let api_key = ApiKey::resolve(api_key.as_deref(), &config.llm.api_key_env)?;
            let loaded = InputManager::new().load_documents(&resumes).await?;

            info!(
                "Ranking {} resumes for '{}' with {}",
                loaded.blobs.len(),
                job.title(),
                config.llm.model
            );

            let backend = OpenAiBackend::new(&config.llm, api_key)?;
            let scorer = ScoringClient::new(Arc::new(backend)).with_temperature(config.llm.temperature);

            let progress = ProgressBar::new(loaded.blobs.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let pipeline = CandidatePipeline::new(Arc::new(DocumentExtractor), scorer)
                .with_config(&config.pipeline)
                .with_progress(progress.clone());

            let started = Instant::now();
            let outcome = pipeline.run(&job, &loaded.blobs).await;
            progress.finish_and_clear();

            let report = RankingReport::build(
                &job,
                outcome,
                loaded.unreadable,
                pipeline.model_name(),
                started.elapsed().as_millis() as u64,
            );

            let use_colors = config.output.color_output && save.is_none();
            let generator = ReportGenerator::with_options(use_colors, detailed || config.output.detailed);
            let content = generator.generate_report(&report, &output_format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&output_format, job.title(), true))
                    } else {
                        path
                    };
                    save_report_to_file(&content, &path)?;
                    println!("✅ Report saved to {}", path.display());
                }
                None => println!("{}", content),
            }

            println!(
                "🎯 Scored {} of {} documents ({} skipped)",
                report.processed_count(),
                report.metadata.total_documents,
                report.skipped_count()
            );
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("API base: {}", config.llm.api_base);
                println!("Model: {}", config.llm.model);
                println!("Temperature: {:.2}", config.llm.temperature);
                println!("Request timeout: {}s", config.llm.timeout_secs);
                println!("Max retries: {}", config.llm.max_retries);
                println!("API key variable: {}", config.llm.api_key_env);
                println!("\nPipeline:");
                println!("  Minimum text length: {} characters", config.pipeline.min_text_chars);
                println!("  Concurrency: {}", config.pipeline.concurrency);
                println!("\nOutput: {:?} (detailed: {})", config.output.format, config.output.detailed);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(&config_path)?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

fn resolve_profile(args: &ProfileArgs) -> Result<JobProfile> {
    let base = match &args.profile {
        Some(path) => ProfileDraft::from_toml_file(path)?,
        None => ProfileDraft::default(),
    };
    base.overlay(args.to_draft()).into_profile()
}
