//! Integration tests for the candidate ranker

use async_trait::async_trait;
use candidate_ranker::input::{DocumentBlob, DocumentExtractor, ExtractionError, ExtractionResult, MediaType, TextExtractor};
use candidate_ranker::llm::scoring::parse_assessment;
use candidate_ranker::llm::{CompletionBackend, CompletionRequest, PromptBuilder, ScoringClient, TransportError};
use candidate_ranker::output::{RankingReport, ReportGenerator};
use candidate_ranker::config::OutputFormat;
use candidate_ranker::processing::{CandidatePipeline, RankingAggregator};
use candidate_ranker::profile::JobProfile;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns canned replies keyed by a marker found in the user prompt.
struct ScriptedBackend {
    replies: HashMap<&'static str, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new(replies: &[(&'static str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.user.to_string());
        self.replies
            .iter()
            .find(|(marker, _)| request.user.contains(*marker))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| TransportError::Api {
                status: 500,
                message: "no scripted reply".to_string(),
            })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Stands in for a PDF/DOCX backend: the blob bytes are the extracted text.
struct FixtureExtractor;

impl TextExtractor for FixtureExtractor {
    fn extract(&self, blob: &DocumentBlob) -> ExtractionResult {
        if blob.bytes.starts_with(b"CORRUPT") {
            return ExtractionResult::Error(ExtractionError::new("Failed to extract text from PDF: corrupt document"));
        }
        match blob.media_type {
            MediaType::Unsupported => ExtractionResult::Error(ExtractionError::new("unsupported format")),
            _ => ExtractionResult::Text(String::from_utf8_lossy(&blob.bytes).to_string()),
        }
    }
}

fn assessment(name: &str, score: u8) -> String {
    format!(
        r#"{{"candidate_name":"{}","match_score":{},"strengths":["Go"],"missing_skills":["Kafka"],"summary":"Reviewed."}}"#,
        name, score
    )
}

fn backend_job() -> JobProfile {
    JobProfile::new("Backend Engineer", "Go, SQL", "", "").unwrap()
}

fn pipeline(backend: Arc<ScriptedBackend>) -> CandidatePipeline {
    CandidatePipeline::new(Arc::new(FixtureExtractor), ScoringClient::new(backend))
}

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_single_pdf_scenario() {
    let backend = ScriptedBackend::new(&[("5 years Go experience", assessment("Jane Doe", 82).as_str())]);
    let blob = DocumentBlob::new(
        "jane.pdf",
        b"5 years Go experience, strong SQL.".to_vec(),
        MediaType::Pdf,
    );

    let outcome = pipeline(backend.clone()).run(&backend_job(), &[blob]).await;
    let ranked = RankingAggregator::rank(outcome.records);

    assert_eq!(ranked.len(), 1);
    let top = ranked.top().unwrap();
    assert_eq!(top.match_score, 82);
    assert_eq!(top.candidate_name, "Jane Doe");
    assert_eq!(top.source_filename, "jane.pdf");
    assert!(outcome.skipped.is_empty());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_one_success_one_extraction_failure() {
    let backend = ScriptedBackend::new(&[("Senior Go developer", assessment("Ann", 90).as_str())]);
    let blobs = vec![
        DocumentBlob::new("ann.pdf", b"Senior Go developer with SQL".to_vec(), MediaType::Pdf),
        DocumentBlob::new("broken.pdf", b"CORRUPT bytes".to_vec(), MediaType::Pdf),
    ];

    let outcome = pipeline(backend.clone()).run(&backend_job(), &blobs).await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].filename, "broken.pdf");
    assert!(outcome.skipped[0].reason.contains("corrupt"));

    let ranked = RankingAggregator::rank(outcome.records);
    assert_eq!(ranked.top().unwrap().match_score, 90);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_empty_upload_makes_no_network_call() {
    let backend = ScriptedBackend::new(&[]);
    let outcome = pipeline(backend.clone()).run(&backend_job(), &[]).await;

    assert!(outcome.records.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_malformed_responses_become_skips() {
    let backend = ScriptedBackend::new(&[
        ("resume-a", "{not json"),
        ("resume-b", r#"{"candidate_name":"B","match_score":"high","strengths":[],"missing_skills":[],"summary":""}"#),
        ("resume-c", r#"{"candidate_name":"C","match_score":105,"strengths":[],"missing_skills":[],"summary":""}"#),
        ("resume-d", assessment("D", 64).as_str()),
    ]);
    let blobs: Vec<_> = ["a", "b", "c", "d"]
        .iter()
        .map(|id| DocumentBlob::new(format!("{}.docx", id), format!("resume-{} long enough", id).into_bytes(), MediaType::Docx))
        .collect();

    let outcome = pipeline(backend.clone()).run(&backend_job(), &blobs).await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].candidate_name, "D");
    let skipped: Vec<_> = outcome.skipped.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(skipped, vec!["a.docx", "b.docx", "c.docx"]);
    assert!(outcome.skipped.iter().all(|s| s.reason.starts_with("invalid response")));
    assert_eq!(backend.calls(), 4);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let backend = ScriptedBackend::new(&[
        ("alpha", assessment("Alpha", 70).as_str()),
        ("beta", assessment("Beta", 70).as_str()),
        ("gamma", assessment("Gamma", 95).as_str()),
    ]);
    let blobs: Vec<_> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|id| DocumentBlob::new(format!("{}.pdf", id), format!("{} candidate resume", id).into_bytes(), MediaType::Pdf))
        .collect();
    let pipeline = pipeline(backend);

    let first = RankingAggregator::rank(pipeline.run(&backend_job(), &blobs).await.records);
    let second = RankingAggregator::rank(pipeline.run(&backend_job(), &blobs).await.records);

    assert_eq!(first, second);
    let names: Vec<_> = first.iter().map(|r| r.candidate_name.as_str()).collect();
    assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
}

#[tokio::test]
async fn test_prompt_round_trip_through_parser() {
    let job = JobProfile::new("Data Engineer", "Python, Airflow", "dbt", "Analytics platform").unwrap();
    let text = "Maria Lopez, 6 years of Python and Airflow pipelines.";
    let prompts = PromptBuilder::default().build(&job, text);

    let reply = r#"{"candidate_name":"Maria Lopez","match_score":77,"strengths":["Python","Airflow"],"missing_skills":["dbt"],"summary":"Good pipeline experience."}"#;
    let backend = ScriptedBackend::new(&[("Maria Lopez", reply)]);
    let scorer = ScoringClient::new(backend.clone());

    let scored = scorer.score(&prompts.system, &prompts.user).await.unwrap();
    assert_eq!(scored, parse_assessment(reply).unwrap());

    let seen = backend.prompts.lock().unwrap();
    assert_eq!(seen[0], prompts.user);
}

#[tokio::test]
async fn test_real_docx_extraction_through_pipeline() {
    let backend = ScriptedBackend::new(&[("Tomasz Nowak", assessment("Tomasz Nowak", 68).as_str())]);
    let blobs = vec![
        DocumentBlob::new("tomasz.docx", docx(&["Tomasz Nowak", "", "Go, PostgreSQL, gRPC"]), MediaType::Docx),
        DocumentBlob::new("empty.docx", docx(&["", "CV"]), MediaType::Docx),
        DocumentBlob::new("photo.png", vec![0x89, 0x50, 0x4e, 0x47], MediaType::Unsupported),
    ];

    let pipeline = CandidatePipeline::new(Arc::new(DocumentExtractor), ScoringClient::new(backend.clone()));
    let outcome = pipeline.run(&backend_job(), &blobs).await;

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].source_filename, "tomasz.docx");
    assert!(backend.prompts.lock().unwrap()[0].contains("Tomasz Nowak\n\nGo, PostgreSQL, gRPC"));

    let reasons: Vec<_> = outcome.skipped.iter().map(|s| s.reason.as_str()).collect();
    assert!(reasons[0].contains("no usable text"));
    assert_eq!(reasons[1], "unsupported format");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_all_failed_report_shows_no_results() {
    let backend = ScriptedBackend::new(&[]);
    let blobs = vec![DocumentBlob::new("x.pdf", b"CORRUPT".to_vec(), MediaType::Pdf)];

    let outcome = pipeline(backend).run(&backend_job(), &blobs).await;
    let report = RankingReport::build(&backend_job(), outcome, vec![], "scripted", 5);

    assert!(report.has_no_results());
    assert_eq!(report.skipped_count(), 1);

    let rendered = ReportGenerator::with_options(false, false)
        .generate_report(&report, &OutputFormat::Markdown)
        .unwrap();
    assert!(rendered.contains("No results"));
    assert!(rendered.contains("x.pdf"));
}
