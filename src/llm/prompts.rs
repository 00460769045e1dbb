//! Prompt construction for candidate scoring

use crate::profile::JobProfile;
use serde::{Deserialize, Serialize};

/// The two messages sent to the completion endpoint for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds the system/user prompt pair. Pure: identical inputs give identical bytes.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn build(&self, job: &JobProfile, text: &str) -> PromptPair {
        // Single pass so that braces or markers inside user input are never re-substituted.
        let user = format!(
            "JOB PROFILE AND REQUIREMENTS:\n\
             Job title: {title}\n\
             Must-have skills: {must_haves}\n\
             Nice-to-have skills: {nice_to_haves}\n\
             Detailed description: {description}\n\
             \n\
             CANDIDATE RESUME TEXT:\n\
             {text}\n\
             \n\
             Analyze the candidate and return the JSON object.",
            title = job.title(),
            must_haves = job.must_haves(),
            nice_to_haves = job.nice_to_haves(),
            description = job.description(),
            text = text,
        );

        PromptPair {
            system: self.system_prompt.clone(),
            user,
        }
    }
}

const SYSTEM_PROMPT: &str = r#"You are an experienced senior recruiting specialist with many years of hiring experience.
Your goal is an objective evaluation of a candidate based on their resume and the job profile provided.

Respond with a single JSON object containing exactly these fields:
{
    "candidate_name": "Full name of the candidate, or \"Unknown\"",
    "match_score": integer from 0 to 100,
    "strengths": ["strength 1", "strength 2"],
    "missing_skills": ["missing skill 1", "missing skill 2"],
    "summary": "A short written opinion summarizing the candidate profile."
}
Return raw JSON only. Do not wrap it in code fences or markup and do not add any prose."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_profile() -> JobProfile {
        JobProfile::new("Backend Engineer", "Go, SQL", "Kubernetes", "Payments platform team").unwrap()
    }

    #[test]
    fn test_system_prompt_fixes_schema() {
        let prompts = PromptBuilder::default().build(&backend_profile(), "resume");
        for field in ["candidate_name", "match_score", "strengths", "missing_skills", "summary"] {
            assert!(prompts.system.contains(field), "missing field {}", field);
        }
        assert!(prompts.system.contains("recruiting specialist"));
        assert!(prompts.system.contains("code fences"));
    }

    #[test]
    fn test_user_prompt_order() {
        let prompts = PromptBuilder::default().build(&backend_profile(), "5 years Go experience");
        let user = &prompts.user;

        let positions: Vec<usize> = [
            "Backend Engineer",
            "Go, SQL",
            "Kubernetes",
            "Payments platform team",
            "5 years Go experience",
        ]
        .iter()
        .map(|needle| user.find(needle).unwrap())
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_build_is_deterministic_and_verbatim() {
        let builder = PromptBuilder::default();
        let profile = JobProfile::new("Engineer {text}", "Rust", "", "").unwrap();
        let text = "Line one\n  {title} literal braces\n";

        let first = builder.build(&profile, text);
        let second = builder.build(&profile, text);

        assert_eq!(first, second);
        assert!(first.user.contains("Job title: Engineer {text}\n"));
        assert!(first.user.contains(text));
    }
}
