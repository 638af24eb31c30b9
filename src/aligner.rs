/*!
 * Positional line alignment of two parallel texts.
 *
 * Both texts are split into lines, each line is trimmed and blank lines are
 * dropped. Line N of the source is then paired with line N of the target;
 * the shorter side is padded with empty strings so that no line of the
 * longer side is lost.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @const: Line break family (CRLF first so it counts as a single break)
static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x1C\x1D\x1E\x{85}\x{2028}\x{2029}]").unwrap()
});

/// One aligned row of the bilingual script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedRecord {
    /// 1-based position in the alignment
    pub id: usize,

    /// Source language line, empty when the source ran out of lines
    #[serde(rename = "kor", alias = "source")]
    pub source: String,

    /// Target language line, empty when the target ran out of lines
    #[serde(rename = "eng", alias = "target")]
    pub target: String,
}

impl AlignedRecord {
    pub fn new(id: usize, source: impl Into<String>, target: impl Into<String>) -> Self {
        AlignedRecord {
            id,
            source: source.into(),
            target: target.into(),
        }
    }

    /// Whether both sides carry a line
    pub fn is_paired(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }
}

// @checks: Whitespace for trimming, including the FS/GS/RS/US separators
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\x1C'..='\x1F')
}

/// Split raw text into its trimmed, non-blank lines in order of appearance
pub fn normalize_lines(raw: &str) -> Vec<String> {
    LINE_BREAK_REGEX
        .split(raw)
        .map(|line| line.trim_matches(is_trimmable))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pair two already normalized line sequences by position
pub fn align_lines<S: AsRef<str>, T: AsRef<str>>(source_lines: &[S], target_lines: &[T]) -> Vec<AlignedRecord> {
    let count = source_lines.len().max(target_lines.len());

    (0..count)
        .map(|i| {
            let source: &str = source_lines.get(i).map_or("", |line| line.as_ref());
            let target: &str = target_lines.get(i).map_or("", |line| line.as_ref());
            AlignedRecord::new(i + 1, source, target)
        })
        .collect()
}

/// Normalize both texts and align them line by line
pub fn align(source_text: &str, target_text: &str) -> Vec<AlignedRecord> {
    let source_lines = normalize_lines(source_text);
    let target_lines = normalize_lines(target_text);
    align_lines(&source_lines, &target_lines)
}

/// Summary of an alignment, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentStats {
    pub total: usize,
    pub paired: usize,
    pub missing_source: usize,
    pub missing_target: usize,
}

impl AlignmentStats {
    pub fn of(records: &[AlignedRecord]) -> Self {
        records.iter().fold(
            AlignmentStats { total: records.len(), ..Default::default() },
            |mut stats, record| {
                if record.is_paired() {
                    stats.paired += 1;
                } else if record.source.is_empty() {
                    stats.missing_source += 1;
                } else {
                    stats.missing_target += 1;
                }
                stats
            },
        )
    }

    /// True when both texts had the same number of lines
    pub fn is_balanced(&self) -> bool {
        self.total == self.paired
    }
}
