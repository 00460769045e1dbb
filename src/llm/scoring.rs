//! Candidate scoring: one completion call per document and strict validation
//! of the returned JSON.

use crate::config::DEFAULT_TEMPERATURE;
use crate::llm::client::{CompletionBackend, CompletionRequest};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const UNKNOWN_CANDIDATE: &str = "Unknown";
pub const MAX_MATCH_SCORE: u8 = 100;
const SNIPPET_CHARS: usize = 200;

/// Validated model output for one document, before the filename is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_name: String,
    pub match_score: u8,
    pub strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
}

impl ScoredCandidate {
    pub fn with_source(self, source_filename: impl Into<String>) -> CandidateRecord {
        CandidateRecord {
            candidate_name: self.candidate_name,
            match_score: self.match_score,
            strengths: self.strengths,
            missing_skills: self.missing_skills,
            summary: self.summary,
            source_filename: source_filename.into(),
        }
    }
}

/// The validated result of scoring one document against a job profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_name: String,
    pub match_score: u8,
    pub strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
    /// Taken from the uploaded document, never from the model.
    pub source_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("invalid response from model: {reason}")]
    InvalidResponse { reason: String, snippet: String },

    #[error("scoring request failed: {0}")]
    TransportFailure(String),
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    #[serde(default)]
    candidate_name: Option<String>,
    match_score: Value,
    strengths: Vec<String>,
    missing_skills: Vec<String>,
    summary: String,
}

#[derive(Clone)]
pub struct ScoringClient {
    backend: Arc<dyn CompletionBackend>,
    temperature: f32,
}

impl ScoringClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    pub async fn score(&self, system_prompt: &str, user_prompt: &str) -> Result<ScoredCandidate, ScoringError> {
        let request = CompletionRequest {
            system: system_prompt,
            user: user_prompt,
            json_response: true,
            temperature: self.temperature,
        };

        debug!(
            "Requesting score from {} (prompt {} chars)",
            self.backend.model_name(),
            system_prompt.len() + user_prompt.len()
        );

        let raw = self
            .backend
            .complete(&request)
            .await
            .map_err(|e| ScoringError::TransportFailure(e.to_string()))?;

        parse_assessment(&raw).inspect_err(|e| {
            if let ScoringError::InvalidResponse { reason, snippet } = e {
                warn!("Rejected model response ({}): {}", reason, snippet);
            }
        })
    }
}

/// Parse and validate the raw completion text.
///
/// `candidate_name` may be missing, null or blank and falls back to "Unknown".
/// Every other field is required with its exact type. `match_score` must be an
/// integer in 0..=100; nothing is clamped or coerced.
pub fn parse_assessment(raw: &str) -> Result<ScoredCandidate, ScoringError> {
    let invalid = |reason: String| ScoringError::InvalidResponse {
        reason,
        snippet: snippet(raw),
    };

    let body = strip_json_fences(raw);
    let assessment: RawAssessment =
        serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;

    let match_score = validate_score(&assessment.match_score).map_err(invalid)?;

    let candidate_name = assessment
        .candidate_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string());

    Ok(ScoredCandidate {
        candidate_name,
        match_score,
        strengths: assessment.strengths,
        missing_skills: assessment.missing_skills,
        summary: assessment.summary,
    })
}

fn validate_score(value: &Value) -> Result<u8, String> {
    let score = match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("match_score must be an integer, got {}", n))?,
        other => return Err(format!("match_score must be an integer, got {}", other)),
    };

    u8::try_from(score)
        .ok()
        .filter(|s| *s <= MAX_MATCH_SCORE)
        .ok_or_else(|| format!("match_score {} is outside 0..=100", score))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

fn snippet(raw: &str) -> String {
    let mut snippet: String = raw.chars().take(SNIPPET_CHARS).collect();
    if raw.chars().count() > SNIPPET_CHARS {
        snippet.push_str("...");
    }
    snippet
}
