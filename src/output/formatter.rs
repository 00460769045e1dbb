//! Output formatters: console, JSON, Markdown and HTML renderings of a ranking report

use crate::config::OutputFormat;
use crate::error::{RankerError, Result};
use crate::llm::scoring::CandidateRecord;
use crate::output::report::{RankingReport, ScoreBand};
use askama::Template;
use colored::{Color, Colorize};
use regex::Regex;
use std::path::Path;

/// Trait for formatting ranking reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console table with optional colors and detail cards
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

/// Report generator that coordinates different formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Candidate Ranking: {{ job_title }}</title>
    {% if include_styles %}
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #333; max-width: 960px; margin: 0 auto; padding: 20px; background: #f8f9fa; }
        .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        h1 { color: #007acc; border-bottom: 3px solid #007acc; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { text-align: left; padding: 8px; border-bottom: 1px solid #e9ecef; }
        .score-badge { display: inline-block; padding: 2px 10px; border-radius: 12px; font-weight: bold; color: white; }
        .score-excellent { background: #28a745; }
        .score-good { background: #17a2b8; }
        .score-fair { background: #ffc107; color: #000; }
        .score-poor { background: #dc3545; }
        details { margin: 10px 0; padding: 10px; background: #f8f9fa; border-left: 4px solid #007acc; }
        .skipped { color: #6c757d; }
    </style>
    {% endif %}
</head>
<body>
<div class="container">
    <h1>Candidate Ranking: {{ job_title }}</h1>
    <p>Generated {{ generated_at }} &middot; {{ processed }} scored &middot; {{ skipped_count }} skipped &middot; model {{ model }}</p>
    {% if has_results %}
    <table>
        <thead><tr><th>#</th><th>Candidate</th><th>Match</th><th>Source file</th></tr></thead>
        <tbody>
        {% for c in candidates %}
            <tr><td>{{ c.rank }}</td><td>{{ c.name }}</td><td><span class="score-badge {{ c.score_class }}">{{ c.score }}%</span></td><td>{{ c.file }}</td></tr>
        {% endfor %}
        </tbody>
    </table>
    {% for c in candidates %}
    <details>
        <summary>{{ c.score }}% - {{ c.name }} ({{ c.file }})</summary>
        <p><strong>Summary:</strong> {{ c.summary }}</p>
        <p><strong>Strengths:</strong></p>
        <ul>{% for s in c.strengths %}<li>{{ s }}</li>{% endfor %}</ul>
        <p><strong>Missing skills / risks:</strong></p>
        <ul>{% for m in c.missing_skills %}<li>{{ m }}</li>{% endfor %}</ul>
    </details>
    {% endfor %}
    {% else %}
    <p><strong>No results.</strong> None of the uploaded documents could be scored.</p>
    {% endif %}
    {% if has_skipped %}
    <h2>Skipped documents</h2>
    <ul class="skipped">
    {% for s in skipped %}<li>{{ s.filename }}: {{ s.reason }}</li>{% endfor %}
    </ul>
    {% endif %}
    <p class="skipped">candidate-ranker v{{ version }}</p>
</div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    job_title: String,
    generated_at: String,
    processed: usize,
    skipped_count: usize,
    model: String,
    has_results: bool,
    candidates: Vec<HtmlCandidate>,
    has_skipped: bool,
    skipped: Vec<HtmlSkipped>,
    version: String,
}

#[derive(Debug, Clone)]
struct HtmlSkipped {
    filename: String,
    reason: String,
}

#[derive(Debug, Clone)]
struct HtmlCandidate {
    rank: usize,
    name: String,
    score: u8,
    score_class: &'static str,
    file: String,
    summary: String,
    strengths: Vec<String>,
    missing_skills: Vec<String>,
}

fn timestamp(report: &RankingReport) -> String {
    report
        .metadata
        .generated_at
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let band = ScoreBand::from_score(score);
        let color = match band {
            ScoreBand::Excellent => Color::Green,
            ScoreBand::Strong => Color::BrightGreen,
            ScoreBand::Moderate => Color::Yellow,
            ScoreBand::Weak => Color::Red,
            ScoreBand::Poor => Color::BrightRed,
        };

        if self.use_colors {
            format!("[{}]", band.label().color(color).bold())
        } else {
            format!("[{}]", band.label())
        }
    }

    fn format_candidate_card(&self, rank: usize, candidate: &CandidateRecord) -> String {
        let mut output = String::new();
        output.push_str(&self.format_header(
            &format!(
                "{}. {}% - {} ({})",
                rank, candidate.match_score, candidate.candidate_name, candidate.source_filename
            ),
            3,
        ));
        output.push_str(&format!("Summary: {}\n", candidate.summary));

        if !candidate.strengths.is_empty() {
            output.push_str(&self.colorize("✅ Strengths:\n", Color::Green));
            for strength in &candidate.strengths {
                output.push_str(&format!("  • {}\n", strength));
            }
        }

        if !candidate.missing_skills.is_empty() {
            output.push_str(&self.colorize("❌ Missing skills / risks:\n", Color::Red));
            for missing in &candidate.missing_skills {
                output.push_str(&format!("  • {}\n", missing));
            }
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("📊 CANDIDATE RANKING: {}", report.job_title), 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms | Model: {}\n",
            timestamp(report),
            report.metadata.processing_time_ms,
            report.metadata.model_used
        ));
        output.push_str(&format!(
            "Documents: {} | Scored: {} | Skipped: {}\n",
            report.metadata.total_documents,
            report.processed_count(),
            report.skipped_count()
        ));

        if report.has_no_results() {
            output.push_str(&self.format_header("No results", 2));
            output.push_str(&self.colorize(
                "None of the uploaded documents could be scored.\n",
                Color::Yellow,
            ));
        } else {
            output.push_str(&self.format_header("Ranking", 2));
            output.push_str(&format!(
                "{:>3}  {:<30} {:>6}  {:<11} {}\n",
                "#", "Candidate", "Match", "", "Source file"
            ));
            for (index, candidate) in report.candidates().iter().enumerate() {
                output.push_str(&format!(
                    "{:>3}  {:<30} {:>5}%  {:<11} {}\n",
                    index + 1,
                    truncate_chars(&candidate.candidate_name, 30),
                    candidate.match_score,
                    self.format_score_badge(candidate.match_score),
                    candidate.source_filename
                ));
            }

            if self.detailed {
                output.push_str(&self.format_header("Candidate details", 2));
                for (index, candidate) in report.candidates().iter().enumerate() {
                    output.push_str(&self.format_candidate_card(index + 1, candidate));
                }
            }
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("⚠️  Skipped documents", 2));
            for skipped in &report.skipped {
                output.push_str(&format!(
                    "  • {}: {}\n",
                    self.colorize(&skipped.filename, Color::Yellow),
                    skipped.reason
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# 📊 Candidate Ranking: {}\n\n", report.job_title));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms | **Model:** `{}`\n\n",
                timestamp(report),
                report.metadata.processing_time_ms,
                report.metadata.model_used
            ));
        }

        output.push_str(&format!(
            "**Scored:** {} | **Skipped:** {}\n\n",
            report.processed_count(),
            report.skipped_count()
        ));

        if report.has_no_results() {
            output.push_str("## No results\n\nNone of the uploaded documents could be scored.\n\n");
        } else {
            output.push_str("## Ranking\n\n");
            output.push_str("| # | Candidate | Match % | Source file |\n");
            output.push_str("|---|-----------|---------|-------------|\n");
            for (index, candidate) in report.candidates().iter().enumerate() {
                output.push_str(&format!(
                    "| {} | {} | {} | `{}` |\n",
                    index + 1,
                    Self::escape_cell(&candidate.candidate_name),
                    candidate.match_score,
                    Self::escape_cell(&candidate.source_filename)
                ));
            }
            output.push('\n');

            output.push_str("## Details\n\n");
            for candidate in report.candidates() {
                output.push_str(&format!(
                    "### {}% - {} ({})\n\n",
                    candidate.match_score, candidate.candidate_name, candidate.source_filename
                ));
                output.push_str(&format!("**Summary:** {}\n\n", candidate.summary));
                if !candidate.strengths.is_empty() {
                    output.push_str("**✅ Strengths**\n\n");
                    for strength in &candidate.strengths {
                        output.push_str(&format!("- {}\n", strength));
                    }
                    output.push('\n');
                }
                if !candidate.missing_skills.is_empty() {
                    output.push_str("**❌ Missing skills / risks**\n\n");
                    for missing in &candidate.missing_skills {
                        output.push_str(&format!("- {}\n", missing));
                    }
                    output.push('\n');
                }
            }
        }

        if !report.skipped.is_empty() {
            output.push_str("## ⚠️ Skipped documents\n\n");
            for skipped in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", skipped.filename, skipped.reason));
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &RankingReport) -> HtmlTemplate {
        let candidates = report
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, c)| HtmlCandidate {
                rank: index + 1,
                name: c.candidate_name.clone(),
                score: c.match_score,
                score_class: ScoreBand::from_score(c.match_score).css_class(),
                file: c.source_filename.clone(),
                summary: c.summary.clone(),
                strengths: c.strengths.clone(),
                missing_skills: c.missing_skills.clone(),
            })
            .collect();

        HtmlTemplate {
            include_styles: self.include_styles,
            job_title: report.job_title.clone(),
            generated_at: timestamp(report),
            processed: report.processed_count(),
            skipped_count: report.skipped_count(),
            model: report.metadata.model_used.clone(),
            has_results: !report.has_no_results(),
            candidates,
            has_skipped: !report.skipped.is_empty(),
            skipped: report
                .skipped
                .iter()
                .map(|s| HtmlSkipped {
                    filename: s.filename.clone(),
                    reason: s.reason.clone(),
                })
                .collect(),
            version: report.metadata.version.clone(),
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| RankerError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            html_formatter: HtmlFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &RankingReport, format: &OutputFormat) -> Result<String> {
        self.formatter_for(*format)?.format_report(report)
    }

    /// The formatter that declares support for `format`.
    pub fn formatter_for(&self, format: OutputFormat) -> Result<&dyn OutputFormatter> {
        let formatters: [&dyn OutputFormatter; 4] = [
            &self.console_formatter,
            &self.json_formatter,
            &self.markdown_formatter,
            &self.html_formatter,
        ];
        formatters
            .into_iter()
            .find(|formatter| formatter.supports_format() == format)
            .ok_or_else(|| RankerError::OutputFormatting(format!("no formatter for {:?}", format)))
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

// Utility functions for saving reports
pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, job_title: &str, timestamp: bool) -> String {
    let lowered = job_title.to_lowercase();
    let slug = Regex::new(r"[^a-z0-9]+")
        .map(|re| re.replace_all(&lowered, "-").trim_matches('-').to_string())
        .unwrap_or_default();
    let base_name = if slug.is_empty() { "candidates".to_string() } else { slug };

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_ranking{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_ranking{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_ranking{}.md", base_name, timestamp_suffix),
        OutputFormat::Html => format!("{}_ranking{}.html", base_name, timestamp_suffix),
    }
}
