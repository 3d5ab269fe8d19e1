//! Decoding model output into a [`ComplianceReport`]
//!
//! Chat models often wrap JSON in Markdown code fences even when told not
//! to. Fences are stripped first, then the remainder must parse as a report.

use lazy_static::lazy_static;
use regex::Regex;
use review_types::ComplianceReport;
use thiserror::Error;

lazy_static! {
    /// Opening fence with optional language tag, e.g. "```json"
    static ref LEADING_FENCE: Regex = Regex::new(r"^\s*```[A-Za-z0-9_-]*[ \t]*(?:\r?\n)?").unwrap();

    /// Closing fence at the very end
    static ref TRAILING_FENCE: Regex = Regex::new(r"(?:\r?\n)?[ \t]*```\s*$").unwrap();
}

/// Longest slice of the offending output kept in error messages
const EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("model response is not a valid compliance report: {source} (response starts: {excerpt:?})")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },
}

/// Remove an optional leading and trailing Markdown code fence
pub fn strip_code_fences(raw: &str) -> String {
    let without_leading = LEADING_FENCE.replace(raw, "");
    TRAILING_FENCE
        .replace(&without_leading, "")
        .trim()
        .to_string()
}

/// Decode raw model output into a report
pub fn decode_report(raw: &str) -> Result<ComplianceReport, DecodeError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned).map_err(|source| DecodeError::InvalidJson {
        source,
        excerpt: cleaned.chars().take(EXCERPT_LEN).collect(),
    })
}
