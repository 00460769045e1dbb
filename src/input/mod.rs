//! Input processing module
//! Handles media type detection, text extraction, and reading files into blobs

pub mod file_detector;
pub mod text_extractor;
pub mod manager;

pub use file_detector::MediaType;
pub use manager::InputManager;
pub use text_extractor::{DocumentBlob, DocumentExtractor, ExtractionError, ExtractionResult, TextExtractor};
