//! Candidate ranker library
//!
//! Document-to-score pipeline: extract text from PDF/DOCX resumes, build a
//! scoring prompt from a job profile, validate the model's JSON verdict and
//! rank the resulting candidate records.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod processing;
pub mod profile;

pub use config::Config;
pub use error::{RankerError, Result};
