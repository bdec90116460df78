/// Decoder for the binary execution-count profile.
///
/// The stream is a flat sequence of records with no header or terminator.
/// Each record is little-endian with no padding:
///
///   [u32 tag_len][tag_len bytes: tag][u64 count]
///
/// Tags look like `@path/to/file.lua:42`. Leading `@` characters are chunk
/// markers and are stripped. Tags without exactly one `:` are not attributable
/// to a source line and are skipped.
///
/// A truncated trailing record ends decoding without error, since profiles
/// written by a killed process often end in a partial write.
use tracing::debug;

use crate::error::{CovluaError, Result};
use crate::model::ProfileRecord;

const LEN_SIZE: usize = 4;
const COUNT_SIZE: usize = 8;

/// Counters describing what the decoder saw, beyond the records it yielded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub records: usize,
    pub skipped_tags: usize,
    /// Bytes left over after the last complete record.
    pub trailing_bytes: usize,
}

/// Streaming decoder over an in-memory profile buffer.
///
/// Yields records in stream order. After a fatal error the iterator is
/// exhausted.
pub struct ProfileDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    stats: DecodeStats,
}

impl<'a> ProfileDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            stats: DecodeStats::default(),
        }
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Read the next raw `(tag, count)` pair, or `None` at the end of the
    /// stream or at a truncated record.
    fn next_raw(&mut self) -> Option<(String, u64)> {
        let start = self.pos;
        let raw = self.read_record();
        if raw.is_none() {
            let left = self.data.len() - start;
            if left > 0 {
                debug!(bytes = left, "dropping truncated trailing record");
            }
            self.stats.trailing_bytes = left;
            self.pos = self.data.len();
        }
        raw
    }

    fn read_record(&mut self) -> Option<(String, u64)> {
        let len = u32::from_le_bytes(self.take(LEN_SIZE)?.try_into().ok()?);
        let tag = String::from_utf8_lossy(self.take(usize::try_from(len).ok()?)?).into_owned();
        let count = u64::from_le_bytes(self.take(COUNT_SIZE)?.try_into().ok()?);
        Some((tag, count))
    }

    fn fail(&mut self, err: CovluaError) -> Option<Result<ProfileRecord>> {
        self.pos = self.data.len();
        Some(Err(err))
    }
}

impl Iterator for ProfileDecoder<'_> {
    type Item = Result<ProfileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (tag, count) = self.next_raw()?;
            match parse_tag(&tag) {
                Ok(Some((source, line))) => {
                    self.stats.records += 1;
                    return Some(Ok(ProfileRecord {
                        source: source.to_string(),
                        line,
                        count,
                    }));
                }
                Ok(None) => {
                    debug!(tag = %tag, "skipping tag without a single source:line separator");
                    self.stats.skipped_tags += 1;
                }
                Err(e) => return self.fail(e),
            }
        }
    }
}

/// Split a tag into its source path and line number.
///
/// Returns `Ok(None)` for tags that are not `path:line` shaped, and an error
/// when the line segment is not a non-negative integer.
pub fn parse_tag(tag: &str) -> Result<Option<(&str, u32)>> {
    let tag = tag.trim_start_matches('@');
    if tag.matches(':').count() != 1 {
        return Ok(None);
    }
    let Some((source, line)) = tag.split_once(':') else {
        return Ok(None);
    };
    let line = line.parse::<u32>().map_err(|_| CovluaError::InvalidLine {
        tag: tag.to_string(),
    })?;
    Ok(Some((source, line)))
}

/// Decode a whole buffer, stopping at the first fatal error.
pub fn decode(data: &[u8]) -> Result<Vec<ProfileRecord>> {
    ProfileDecoder::new(data).collect()
}

/// Encode a single record. Used to build profiles for tests and tooling.
pub fn encode_record(out: &mut Vec<u8>, tag: &str, count: u64) {
    out.extend_from_slice(&(tag.len() as u32).to_le_bytes());
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&count.to_le_bytes());
}
