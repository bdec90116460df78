//! In-memory representation of decoded profile data. The decoder produces
//! `ProfileRecord`s, the aggregator folds them into `FileCoverage`s and the
//! reporter derives a `CoverageResult` per file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Lines the grammar considers to host an executable statement.
pub type StatementLineSet = BTreeSet<u32>;

/// Integer coverage percentage, returning 0 when there is nothing to cover.
#[must_use]
pub fn percentage(covered: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (covered * 100 / total) as u32
    }
}

/// A single decoded entry from the binary profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Source path as written in the tag, before resolution.
    pub source: String,
    pub line: u32,
    pub count: u64,
}

/// Accumulated hit counts for one canonical source file.
#[derive(Debug, Clone)]
pub struct FileCoverage {
    /// File name without extension, used for display and filtering.
    pub name: String,
    /// Absolute, filesystem-resolved path. Identity key for merging.
    pub path: PathBuf,
    pub lines: BTreeMap<u32, u64>,
}

impl FileCoverage {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            lines: BTreeMap::new(),
        }
    }

    /// Add `count` hits to `line`. Repeated lines accumulate.
    pub fn record(&mut self, line: u32, count: u64) {
        let entry = self.lines.entry(line).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Largest recorded hit count, or 0 when nothing was recorded.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.lines.values().copied().max().unwrap_or(0)
    }
}

/// Covered vs. executable line figures for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageResult {
    pub covered: usize,
    pub executable: usize,
}

impl CoverageResult {
    /// A line is covered when the profiler recorded it (any count, including
    /// zero) and the grammar places a statement on it.
    pub fn compute(file: &FileCoverage, statements: &StatementLineSet) -> Self {
        let covered = statements
            .iter()
            .filter(|line| file.lines.contains_key(line))
            .count();
        Self {
            covered,
            executable: statements.len(),
        }
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.covered, self.executable)
    }

    #[must_use]
    pub fn has_executable_lines(&self) -> bool {
        self.executable > 0
    }
}
