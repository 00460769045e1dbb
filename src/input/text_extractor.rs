//! Text extraction from uploaded resume documents

use crate::input::file_detector::MediaType;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// A named binary payload with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlob {
    pub name: String,
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
}

impl DocumentBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            name: name.into(),
            bytes,
            media_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ExtractionError {
    pub reason: String,
}

impl ExtractionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Text(String),
    Error(ExtractionError),
}

impl ExtractionResult {
    fn failed(reason: impl Into<String>) -> Self {
        ExtractionResult::Error(ExtractionError::new(reason))
    }
}

/// Byte-to-text transform. Implementations report every failure as
/// `ExtractionResult::Error` and never panic past this boundary.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, blob: &DocumentBlob) -> ExtractionResult;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, blob: &DocumentBlob) -> ExtractionResult {
        // pdf-extract panics on some malformed inputs
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&blob.bytes)
        }));

        match pages {
            Ok(Ok(pages)) if pages.is_empty() => {
                ExtractionResult::failed(format!("PDF '{}' has no readable pages", blob.name))
            }
            Ok(Ok(pages)) => {
                debug!("Extracted {} pages from PDF '{}'", pages.len(), blob.name);
                ExtractionResult::Text(pages.concat())
            }
            Ok(Err(e)) => ExtractionResult::failed(format!(
                "Failed to extract text from PDF '{}': {}",
                blob.name, e
            )),
            Err(_) => ExtractionResult::failed(format!(
                "Failed to extract text from PDF '{}': corrupt document",
                blob.name
            )),
        }
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, blob: &DocumentBlob) -> ExtractionResult {
        let xml = match self.read_document_xml(&blob.bytes) {
            Ok(xml) => xml,
            Err(reason) => {
                return ExtractionResult::failed(format!(
                    "Failed to read DOCX '{}': {}",
                    blob.name, reason
                ))
            }
        };

        match self.paragraphs(&xml) {
            Ok(paragraphs) => {
                debug!("Extracted {} paragraphs from DOCX '{}'", paragraphs.len(), blob.name);
                ExtractionResult::Text(paragraphs.join("\n"))
            }
            Err(reason) => ExtractionResult::failed(format!(
                "Failed to parse DOCX '{}': {}",
                blob.name, reason
            )),
        }
    }
}

impl DocxExtractor {
    fn read_document_xml(&self, bytes: &[u8]) -> Result<String, String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| format!("not a valid DOCX container ({})", e))?;
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|_| "missing word/document.xml".to_string())?;

        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|e| format!("unreadable word/document.xml ({})", e))?;
        Ok(xml)
    }

    /// Text of every paragraph in document order. Empty paragraphs stay as
    /// empty strings so they come out as blank lines.
    fn paragraphs(&self, xml: &str) -> Result<Vec<String>, String> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut open: Vec<String> = Vec::new();
        let mut in_text_run = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"p" => open.push(String::new()),
                    b"t" => in_text_run = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"p" => paragraphs.push(String::new()),
                    b"tab" => push_to_open(&mut open, "\t"),
                    b"br" | b"cr" => push_to_open(&mut open, "\n"),
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"p" => {
                        if let Some(paragraph) = open.pop() {
                            paragraphs.push(paragraph);
                        }
                    }
                    b"t" => in_text_run = false,
                    _ => {}
                },
                Ok(Event::Text(text)) if in_text_run => {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    push_to_open(&mut open, &text);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "malformed XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    ))
                }
                _ => {}
            }
        }

        Ok(paragraphs)
    }
}

fn push_to_open(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}

/// Routes a blob to the extractor for its declared media type.
#[derive(Default)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, blob: &DocumentBlob) -> ExtractionResult {
        match blob.media_type {
            MediaType::Pdf => PdfExtractor.extract(blob),
            MediaType::Docx => DocxExtractor.extract(blob),
            MediaType::Unsupported => ExtractionResult::failed("unsupported format"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_paragraphs_joined_with_newlines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t xml:space=\"preserve\">Go &amp; SQL, </w:t></w:r><w:r><w:t>5 years</w:t></w:r></w:p>",
        );
        let blob = DocumentBlob::new("jane.docx", bytes, MediaType::Docx);

        assert_eq!(
            DocumentExtractor.extract(&blob),
            ExtractionResult::Text("Jane Doe\n\nGo & SQL, 5 years".to_string())
        );
    }

    #[test]
    fn test_docx_tabs_and_breaks() {
        let bytes = docx_with_body("<w:p><w:r><w:t>Skills</w:t><w:tab/><w:t>Rust</w:t><w:br/><w:t>Go</w:t></w:r></w:p>");
        let blob = DocumentBlob::new("tabs.docx", bytes, MediaType::Docx);

        assert_eq!(
            DocxExtractor.extract(&blob),
            ExtractionResult::Text("Skills\tRust\nGo".to_string())
        );
    }

    #[test]
    fn test_docx_not_a_zip() {
        let blob = DocumentBlob::new("broken.docx", b"definitely not a zip".to_vec(), MediaType::Docx);
        match DocumentExtractor.extract(&blob) {
            ExtractionResult::Error(e) => assert!(e.reason.contains("broken.docx")),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_docx_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let blob = DocumentBlob::new("empty.docx", bytes, MediaType::Docx);
        match DocumentExtractor.extract(&blob) {
            ExtractionResult::Error(e) => assert!(e.reason.contains("word/document.xml")),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_pdf_is_reported_not_raised() {
        let blob = DocumentBlob::new("scan.pdf", b"%PDF-1.4 garbage".to_vec(), MediaType::Pdf);
        assert!(matches!(DocumentExtractor.extract(&blob), ExtractionResult::Error(_)));
    }

    #[test]
    fn test_unsupported_is_not_parsed() {
        let blob = DocumentBlob::new("notes.txt", b"plain text resume".to_vec(), MediaType::Unsupported);
        assert_eq!(
            DocumentExtractor.extract(&blob),
            ExtractionResult::Error(ExtractionError::new("unsupported format"))
        );
    }
}
