//! LLM integration module

pub mod client;
pub mod prompts;
pub mod scoring;

pub use client::{CompletionBackend, CompletionRequest, OpenAiBackend, TransportError};
pub use prompts::{PromptBuilder, PromptPair};
pub use scoring::{CandidateRecord, ScoredCandidate, ScoringClient, ScoringError};
