//! Document-to-score processing
//! Per-document pipeline and ranking of the results

pub mod pipeline;
pub mod ranking;

pub use pipeline::{CandidatePipeline, DocumentOutcome, PipelineOutcome, SkippedDocument};
pub use ranking::{RankedResultSet, RankingAggregator};
