//! Score Extractor — pulls the overall percentage out of the model's report.
//!
//! Extraction never fails: an unreadable score becomes 0.0 and the report
//! text is annotated so the reader of the PDF sees why.

use crate::fitment::sections::SCORE_LABEL;

/// Appended to report content whose score could not be read.
pub const SCORE_DIAGNOSTIC: &str = "[ERROR: Matching Score could not be parsed]";

/// Report content after score extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredReport {
    pub score: f64,
    /// Content to render, diagnostic included when `parsed` is false.
    pub content: String,
    pub parsed: bool,
}

/// Reads the number between `"Overall Matching Score:"` and the next `%`.
///
/// Only the text up to a second occurrence of the label is considered, so a
/// stray `%` further down the report is never picked up for a score the model
/// left blank. Whitespace and emphasis markers are ignored. Values outside
/// 0..=100 are treated as unreadable.
pub fn parse_score(content: &str) -> Option<f64> {
    let (_, after_label) = content.split_once(SCORE_LABEL)?;
    let segment = after_label
        .split_once(SCORE_LABEL)
        .map_or(after_label, |(before, _)| before);
    let (number, _) = segment.split_once('%')?;

    number
        .replace('*', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|score| (0.0..=100.0).contains(score))
}

/// Extracts the score, defaulting to 0.0 and appending the diagnostic once
/// when it cannot be read. Applying this to its own output is a no-op.
pub fn score_report(content: String) -> ScoredReport {
    match parse_score(&content) {
        Some(score) => ScoredReport {
            score,
            content,
            parsed: true,
        },
        None => {
            let content = if content.contains(SCORE_DIAGNOSTIC) {
                content
            } else {
                format!("{content}\n\n{SCORE_DIAGNOSTIC}")
            };
            ScoredReport {
                score: 0.0,
                content,
                parsed: false,
            }
        }
    }
}
