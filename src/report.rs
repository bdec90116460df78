//! Per-file coverage calculation and output formatting.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::aggregate::Coverage;
use crate::error::Result;
use crate::grammar::StatementGrammar;
use crate::model::{CoverageResult, FileCoverage, StatementLineSet};

/// Which sections of the text report to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Annotated source listing.
    pub show_code: bool,
    /// Per-file summary ratio.
    pub show_total: bool,
    /// Reserved for function-level output. Currently has no effect.
    pub show_func: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_code: true,
            show_total: true,
            show_func: true,
        }
    }
}

/// Everything needed to render one file.
pub struct FileReport<'a> {
    pub file: &'a FileCoverage,
    /// Source text split into lines, terminators removed.
    pub source: Vec<String>,
    pub statements: StatementLineSet,
    pub result: CoverageResult,
}

impl<'a> FileReport<'a> {
    /// Read and parse the source behind `file` and compute its coverage.
    pub fn analyze(file: &'a FileCoverage, grammar: &dyn StatementGrammar) -> Result<Self> {
        let bytes = std::fs::read(&file.path)?;
        let text = String::from_utf8_lossy(&bytes);
        let statements = grammar.statement_lines(&file.path, &text)?;
        let result = CoverageResult::compute(file, &statements);
        Ok(Self {
            file,
            source: text.lines().map(str::to_string).collect(),
            statements,
            result,
        })
    }
}

/// Outcome of analyzing a single selected file.
pub enum FileOutcome<'a> {
    Ready(FileReport<'a>),
    Failed {
        file: &'a FileCoverage,
        error: String,
    },
}

impl<'a> FileOutcome<'a> {
    pub fn file(&self) -> &'a FileCoverage {
        match self {
            FileOutcome::Ready(report) => report.file,
            FileOutcome::Failed { file, .. } => *file,
        }
    }

    pub fn path(&self) -> &'a Path {
        &self.file().path
    }
}

/// Coverage for every selected file, ready to be formatted.
pub struct CoverageReport<'a> {
    /// Source-attributed records merged from the profile.
    pub total_points: usize,
    /// Distinct source files in the profile, before filtering.
    pub total_files: usize,
    pub files: Vec<FileOutcome<'a>>,
}

impl CoverageReport<'_> {
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Analyze every file in `coverage` matching `filter`. A file that cannot be
/// read or parsed is recorded as failed and does not stop the others.
pub fn build_report<'a>(
    coverage: &'a Coverage,
    filter: Option<&'a str>,
    grammar: &dyn StatementGrammar,
) -> CoverageReport<'a> {
    let files = coverage
        .select(filter)
        .map(|file| match FileReport::analyze(file, grammar) {
            Ok(report) => FileOutcome::Ready(report),
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "skipping file");
                FileOutcome::Failed {
                    file,
                    error: e.to_string(),
                }
            }
        })
        .collect();

    CoverageReport {
        total_points: coverage.points,
        total_files: coverage.files.len(),
        files,
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    fn format(&self, report: &CoverageReport<'_>) -> String;
}

/// gcov-style console output.
pub struct TextFormatter {
    pub options: ReportOptions,
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &CoverageReport<'_>) -> String {
        let mut out = String::new();
        writeln!(
            out,
            "total points = {}, files = {}",
            report.total_points, report.total_files
        )
        .unwrap();

        for outcome in &report.files {
            writeln!(out, "coverage of {}:", outcome.path().display()).unwrap();
            match outcome {
                FileOutcome::Failed { error, .. } => {
                    writeln!(out, "{error}").unwrap();
                }
                FileOutcome::Ready(file) => {
                    if self.options.show_code {
                        out.push_str(&format_listing(file));
                    }
                    if self.options.show_total {
                        out.push_str(&format_summary(&file.file.path, &file.result));
                    }
                }
            }
        }
        out
    }
}

/// Number of decimal digits in `n`, at least 1.
fn digits(mut n: u64) -> usize {
    let mut width = 1;
    while n >= 10 {
        n /= 10;
        width += 1;
    }
    width
}

/// Every source line prefixed by its hit count, or blank when the profiler
/// never recorded it. A recorded zero prints as `0`.
pub fn format_listing(report: &FileReport<'_>) -> String {
    let width = digits(report.file.max_count());
    let mut out = String::new();
    for (index, line) in report.source.iter().enumerate() {
        let count = u32::try_from(index + 1)
            .ok()
            .and_then(|n| report.file.lines.get(&n));
        match count {
            Some(count) => writeln!(out, "{count:<width$} {line}").unwrap(),
            None => writeln!(out, "{:<width$} {line}", "").unwrap(),
        }
    }
    out
}

pub fn format_summary(path: &Path, result: &CoverageResult) -> String {
    let path = path.display();
    let covered = result.covered;
    let total = result.executable;
    let pct = result.percentage();
    if result.has_executable_lines() {
        format!("{path} total coverage {pct}% {covered}/{total}\n")
    } else {
        format!("{path} total coverage {pct}% {covered}/{total} (no executable lines)\n")
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    total_points: usize,
    total_files: usize,
    files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    name: &'a str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    covered: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    executable: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    percentage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lines: Option<&'a BTreeMap<u32, u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Machine-readable summary. Listing toggles do not apply.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &CoverageReport<'_>) -> String {
        let files = report
            .files
            .iter()
            .map(|outcome| match outcome {
                FileOutcome::Ready(file) => JsonFile {
                    name: &file.file.name,
                    path: file.file.path.display().to_string(),
                    covered: Some(file.result.covered),
                    executable: Some(file.result.executable),
                    percentage: Some(file.result.percentage()),
                    lines: Some(&file.file.lines),
                    error: None,
                },
                FileOutcome::Failed { file, error } => JsonFile {
                    name: &file.name,
                    path: file.path.display().to_string(),
                    covered: None,
                    executable: None,
                    percentage: None,
                    lines: Some(&file.lines),
                    error: Some(error.as_str()),
                },
            })
            .collect();

        let doc = JsonReport {
            total_points: report.total_points,
            total_files: report.total_files,
            files,
        };
        // Plain structs of strings and integers always serialize.
        let mut out = serde_json::to_string_pretty(&doc).unwrap_or_default();
        out.push('\n');
        out
    }
}
