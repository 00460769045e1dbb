//! Job profile: the role every candidate is scored against

use crate::error::{RankerError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable description of the role for one ranking run.
///
/// Fields are kept verbatim; only emptiness of `title` and `must_haves` is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobProfile {
    title: String,
    must_haves: String,
    nice_to_haves: String,
    description: String,
}

impl JobProfile {
    pub fn new(
        title: impl Into<String>,
        must_haves: impl Into<String>,
        nice_to_haves: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let title = title.into();
        let must_haves = must_haves.into();

        if title.trim().is_empty() {
            return Err(RankerError::Precondition("Job title is required".to_string()));
        }
        if must_haves.trim().is_empty() {
            return Err(RankerError::Precondition(
                "Must-have requirements are required".to_string(),
            ));
        }

        Ok(Self {
            title,
            must_haves,
            nice_to_haves: nice_to_haves.into(),
            description: description.into(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn must_haves(&self) -> &str {
        &self.must_haves
    }

    pub fn nice_to_haves(&self) -> &str {
        &self.nice_to_haves
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Partially filled profile as read from a TOML file or command-line flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    pub title: Option<String>,
    pub must_haves: Option<String>,
    pub nice_to_haves: Option<String>,
    pub description: Option<String>,
}

impl ProfileDraft {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job profile '{}'", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse job profile '{}'", path.display()))
    }

    /// Fields set in `other` win over fields set here.
    pub fn overlay(self, other: ProfileDraft) -> Self {
        Self {
            title: other.title.or(self.title),
            must_haves: other.must_haves.or(self.must_haves),
            nice_to_haves: other.nice_to_haves.or(self.nice_to_haves),
            description: other.description.or(self.description),
        }
    }

    pub fn into_profile(self) -> Result<JobProfile> {
        JobProfile::new(
            self.title.unwrap_or_default(),
            self.must_haves.unwrap_or_default(),
            self.nice_to_haves.unwrap_or_default(),
            self.description.unwrap_or_default(),
        )
    }
}
