//! Input manager: turns file paths into document blobs for the pipeline

use crate::error::{RankerError, Result};
use crate::input::file_detector::MediaType;
use crate::input::text_extractor::DocumentBlob;
use crate::processing::pipeline::SkippedDocument;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Documents read from disk, plus the paths that could not be read at all.
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub blobs: Vec<DocumentBlob>,
    pub unreadable: Vec<SkippedDocument>,
}

pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read every path in order. An empty path list is a precondition failure;
    /// a single unreadable file is only reported.
    pub async fn load_documents(&self, paths: &[PathBuf]) -> Result<LoadedDocuments> {
        if paths.is_empty() {
            return Err(RankerError::Precondition(
                "No resume files were provided".to_string(),
            ));
        }

        let mut loaded = LoadedDocuments::default();
        for path in paths {
            match self.load_document(path).await {
                Ok(blob) => loaded.blobs.push(blob),
                Err(e) => {
                    warn!("Could not read {}: {}", path.display(), e);
                    loaded
                        .unreadable
                        .push(SkippedDocument::new(display_name(path), e.to_string()));
                }
            }
        }

        info!(
            "Loaded {} of {} resume files",
            loaded.blobs.len(),
            paths.len()
        );
        Ok(loaded)
    }

    pub async fn load_document(&self, path: &Path) -> Result<DocumentBlob> {
        if !path.is_file() {
            return Err(RankerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let media_type = MediaType::from_path(path);
        let bytes = fs::read(path).await?;
        Ok(DocumentBlob::new(display_name(path), bytes, media_type))
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
