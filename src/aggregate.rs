//! Folds decoded profile records into one `FileCoverage` per canonical
//! source path.
//!
//! The same file is often recorded under several spellings (`@src/a.lua`,
//! `src/a.lua`, `./src/a.lua`). Every tag path is joined to the source root
//! and canonicalized, and the canonical path is the merge key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CovluaError, Result};
use crate::model::{FileCoverage, ProfileRecord};
use crate::profile::ProfileDecoder;

/// Accumulates hit counts per canonical source file.
pub struct Aggregator {
    root: PathBuf,
    files: Vec<FileCoverage>,
    by_path: HashMap<PathBuf, usize>,
    // Resolution is a filesystem round-trip; raw tag paths repeat constantly.
    by_source: HashMap<String, usize>,
    points: usize,
}

impl Aggregator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: Vec::new(),
            by_path: HashMap::new(),
            by_source: HashMap::new(),
            points: 0,
        }
    }

    /// Add one record, resolving its source path on first sight.
    pub fn add(&mut self, record: &ProfileRecord) -> Result<()> {
        let index = match self.by_source.get(&record.source) {
            Some(&index) => index,
            None => {
                let index = self.index_for(record)?;
                self.by_source.insert(record.source.clone(), index);
                index
            }
        };
        self.files[index].record(record.line, record.count);
        self.points += 1;
        Ok(())
    }

    fn index_for(&mut self, record: &ProfileRecord) -> Result<usize> {
        let tag = format!("{}:{}", record.source, record.line);
        let path = resolve(&self.root, &record.source, &tag)?;
        if let Some(&index) = self.by_path.get(&path) {
            debug!(source = %record.source, path = %path.display(), "merging into existing file");
            return Ok(index);
        }
        let index = self.files.len();
        self.by_path.insert(path.clone(), index);
        self.files.push(FileCoverage::new(path));
        Ok(index)
    }

    /// Drain a decoder into the aggregator. Stops at the first fatal error.
    pub fn consume(&mut self, decoder: &mut ProfileDecoder<'_>) -> Result<()> {
        for record in decoder {
            self.add(&record?)?;
        }
        Ok(())
    }

    pub fn finish(self) -> Coverage {
        Coverage {
            files: self.files,
            points: self.points,
        }
    }
}

/// Join `source` beneath `root` and canonicalize it.
///
/// Leading separators in `source` are ignored so every tag stays under the
/// root. The result must name an existing regular file.
pub fn resolve(root: &Path, source: &str, tag: &str) -> Result<PathBuf> {
    let joined = root.join(source.trim_start_matches(['/', '\\']));
    let path = match std::fs::canonicalize(&joined) {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CovluaError::SourceNotFound {
                tag: tag.to_string(),
                path: joined,
            })
        }
        Err(source) => {
            return Err(CovluaError::PathResolution {
                tag: tag.to_string(),
                path: joined,
                source,
            })
        }
    };
    let meta = std::fs::metadata(&path).map_err(|source| CovluaError::PathResolution {
        tag: tag.to_string(),
        path: path.clone(),
        source,
    })?;
    if !meta.is_file() {
        return Err(CovluaError::NotAFile {
            tag: tag.to_string(),
            path,
        });
    }
    Ok(path)
}

/// Read-only result of aggregation, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    pub files: Vec<FileCoverage>,
    /// Number of source-attributed records merged.
    pub points: usize,
}

impl Coverage {
    /// Decode a profile buffer and aggregate it against `root`.
    pub fn from_profile(data: &[u8], root: &Path) -> Result<Self> {
        let mut decoder = ProfileDecoder::new(data);
        let mut aggregator = Aggregator::new(root);
        aggregator.consume(&mut decoder)?;
        let stats = decoder.stats();
        debug!(
            records = stats.records,
            skipped = stats.skipped_tags,
            trailing_bytes = stats.trailing_bytes,
            "decoded profile"
        );
        Ok(aggregator.finish())
    }

    /// Files to report: all of them, or only those whose display name
    /// matches `filter`.
    pub fn select<'a>(&'a self, filter: Option<&'a str>) -> impl Iterator<Item = &'a FileCoverage> {
        self.files
            .iter()
            .filter(move |f| filter.map_or(true, |name| f.name == name))
    }
}
