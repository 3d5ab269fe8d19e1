use std::fmt;

use serde::{Deserialize, Serialize};

/// Regulatory area an issue falls under.
///
/// Values outside the three known categories are kept as-is so that a
/// slightly off-script model response still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Gambling,
    Marketing,
    Legal,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Gambling => "Gambling",
            Category::Marketing => "Marketing",
            Category::Legal => "Legal",
            Category::Other(raw) => raw,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Gambling" => Category::Gambling,
            "Marketing" => Category::Marketing,
            "Legal" => Category::Legal,
            _ => Category::Other(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a single compliance issue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    /// Anything the model returned that is not one of the three levels
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Other(raw) => raw,
        }
    }
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Low" => Severity::Low,
            "Medium" => Severity::Medium,
            "High" => Severity::High,
            _ => Severity::Other(raw),
        }
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One regulation violation found during review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    #[serde(default)]
    pub id: String,
    pub category: Category,
    pub severity: Severity,
    pub regulation_reference: String,
    pub exact_violation_text: String,
    pub rule_description: String,
    pub recommendation: String,
}

/// Structured result of a compliance review.
///
/// An empty `issues` list means the document was judged fully compliant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    #[serde(default)]
    pub issues: Vec<ComplianceIssue>,
    pub summary: String,
}

impl ComplianceReport {
    pub fn is_compliant(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of issues at the given severity
    pub fn count_by_severity(&self, severity: &Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| &issue.severity == severity)
            .count()
    }
}

/// Reply threading information taken from the inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadContext {
    /// Message-ID of the original mail, without angle brackets
    pub message_id: String,
}

impl ThreadContext {
    pub fn new(message_id: impl Into<String>) -> Self {
        let raw: String = message_id.into();
        Self {
            message_id: raw.trim().trim_matches(['<', '>']).to_string(),
        }
    }

    /// Header value for In-Reply-To and References
    pub fn header_value(&self) -> String {
        format!("<{}>", self.message_id)
    }
}

/// Body of `POST /review`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub sender: String,
    pub filename: String,
    /// Base64-encoded PDF
    pub file: String,
}
