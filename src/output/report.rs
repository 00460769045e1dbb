//! Report structure handed to the formatters

use crate::llm::scoring::CandidateRecord;
use crate::processing::pipeline::{PipelineOutcome, SkippedDocument};
use crate::processing::ranking::{RankedResultSet, RankingAggregator};
use crate::profile::JobProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything a presentation layer needs from one ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingReport {
    pub job_title: String,
    pub ranked: RankedResultSet,
    pub skipped: Vec<SkippedDocument>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub model_used: String,
    pub total_documents: usize,
    pub version: String,
}

/// Qualitative band for a 0-100 match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Strong,
    Moderate,
    Weak,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Excellent,
            75..=89 => ScoreBand::Strong,
            60..=74 => ScoreBand::Moderate,
            40..=59 => ScoreBand::Weak,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "EXCELLENT",
            ScoreBand::Strong => "STRONG",
            ScoreBand::Moderate => "MODERATE",
            ScoreBand::Weak => "WEAK",
            ScoreBand::Poor => "POOR",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "score-excellent",
            ScoreBand::Strong => "score-good",
            ScoreBand::Moderate => "score-fair",
            ScoreBand::Weak | ScoreBand::Poor => "score-poor",
        }
    }
}

impl RankingReport {
    /// Rank the pipeline output and attach run metadata. Skips from the input
    /// layer (unreadable files) come first, followed by pipeline skips.
    pub fn build(
        job: &JobProfile,
        outcome: PipelineOutcome,
        input_skips: Vec<SkippedDocument>,
        model_used: &str,
        processing_time_ms: u64,
    ) -> Self {
        let total_documents = outcome.total() + input_skips.len();
        let mut skipped = input_skips;
        skipped.extend(outcome.skipped);

        Self {
            job_title: job.title().to_string(),
            ranked: RankingAggregator::rank(outcome.records),
            skipped,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                processing_time_ms,
                model_used: model_used.to_string(),
                total_documents,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn processed_count(&self) -> usize {
        self.ranked.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True when every document failed; callers render an explicit "no results" state.
    pub fn has_no_results(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        self.ranked.as_slice()
    }
}
