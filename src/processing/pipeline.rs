//! Candidate pipeline: extraction, prompting and scoring for every uploaded
//! document, with failures isolated per document.

use crate::config::{PipelineConfig, DEFAULT_MIN_TEXT_CHARS};
use crate::input::text_extractor::{DocumentBlob, ExtractionResult, TextExtractor};
use crate::llm::prompts::PromptBuilder;
use crate::llm::scoring::{CandidateRecord, ScoringClient};
use crate::profile::JobProfile;
use indicatif::ProgressBar;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A document that produced no record, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub filename: String,
    pub reason: String,
}

impl SkippedDocument {
    pub fn new(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Scored(CandidateRecord),
    Skipped(SkippedDocument),
}

/// Result of one run, before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub records: Vec<CandidateRecord>,
    pub skipped: Vec<SkippedDocument>,
}

impl PipelineOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    fn push(&mut self, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Scored(record) => self.records.push(record),
            DocumentOutcome::Skipped(skipped) => self.skipped.push(skipped),
        }
    }
}

#[derive(Clone)]
pub struct CandidatePipeline {
    extractor: Arc<dyn TextExtractor>,
    prompts: PromptBuilder,
    scorer: ScoringClient,
    min_text_chars: usize,
    concurrency: usize,
    progress: Option<ProgressBar>,
}

impl CandidatePipeline {
    pub fn new(extractor: Arc<dyn TextExtractor>, scorer: ScoringClient) -> Self {
        Self {
            extractor,
            prompts: PromptBuilder::default(),
            scorer,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            concurrency: 1,
            progress: None,
        }
    }

    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.min_text_chars = config.min_text_chars;
        self.concurrency = config.concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process every blob. Never fails: per-document errors become skip entries.
    ///
    /// Sequential mode keeps `records` in completion order; concurrent mode
    /// re-imposes input order on both lists once all tasks finish.
    pub async fn run(&self, job: &JobProfile, blobs: &[DocumentBlob]) -> PipelineOutcome {
        let outcome = if self.concurrency <= 1 || blobs.len() <= 1 {
            self.run_sequential(job, blobs).await
        } else {
            self.run_concurrent(job, blobs).await
        };

        info!(
            "Pipeline finished: {} scored, {} skipped of {} documents",
            outcome.records.len(),
            outcome.skipped.len(),
            blobs.len()
        );
        outcome
    }

    async fn run_sequential(&self, job: &JobProfile, blobs: &[DocumentBlob]) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();
        for blob in blobs {
            outcome.push(self.process(job, blob).await);
        }
        outcome
    }

    async fn run_concurrent(&self, job: &JobProfile, blobs: &[DocumentBlob]) -> PipelineOutcome {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, blob) in blobs.iter().cloned().enumerate() {
            let pipeline = self.clone();
            let job = job.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, pipeline.process(&job, &blob).await)
            });
        }

        let mut slots: Vec<Option<DocumentOutcome>> = (0..blobs.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("Document task aborted: {}", e),
            }
        }

        let mut outcome = PipelineOutcome::default();
        for (slot, blob) in slots.into_iter().zip(blobs) {
            outcome.push(slot.unwrap_or_else(|| {
                DocumentOutcome::Skipped(SkippedDocument::new(
                    blob.name.clone(),
                    "processing task aborted unexpectedly",
                ))
            }));
        }
        outcome
    }

    /// Extract, check length, prompt and score a single document.
    pub async fn process(&self, job: &JobProfile, blob: &DocumentBlob) -> DocumentOutcome {
        debug!("Processing {} ({:?})", blob.name, blob.media_type);
        if let Some(progress) = &self.progress {
            progress.set_message(blob.name.clone());
        }

        // PDF and ZIP parsing is CPU-bound; keep it off the async workers.
        let extractor = self.extractor.clone();
        let owned = blob.clone();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract(&owned)).await;

        let outcome = match extracted {
            Err(e) => self.skip(blob, format!("text extraction failed: {}", e)),
            Ok(ExtractionResult::Error(e)) => self.skip(blob, e.reason),
            Ok(ExtractionResult::Text(text)) => {
                let length = text.trim().chars().count();
                if length < self.min_text_chars {
                    self.skip(
                        blob,
                        format!(
                            "no usable text extracted ({} characters, minimum {})",
                            length, self.min_text_chars
                        ),
                    )
                } else {
                    let prompts = self.prompts.build(job, &text);
                    match self.scorer.score(&prompts.system, &prompts.user).await {
                        Ok(scored) => {
                            debug!("Scored {}: {}", blob.name, scored.match_score);
                            DocumentOutcome::Scored(scored.with_source(blob.name.clone()))
                        }
                        Err(e) => self.skip(blob, e.to_string()),
                    }
                }
            }
        };

        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        outcome
    }

    fn skip(&self, blob: &DocumentBlob, reason: String) -> DocumentOutcome {
        warn!("Skipping {}: {}", blob.name, reason);
        DocumentOutcome::Skipped(SkippedDocument::new(blob.name.clone(), reason))
    }

    pub fn model_name(&self) -> &str {
        self.scorer.model_name()
    }
}
