//! Outbound report delivery seam

use async_trait::async_trait;
use review_types::ThreadContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address:?}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),

    #[error("mail task failed: {0}")]
    Task(String),
}

/// A rendered report ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReport {
    pub to: String,
    pub cc: Vec<String>,
    /// Subject before any reply prefix is applied
    pub subject: String,
    pub html_body: String,
    pub thread: Option<ThreadContext>,
}

impl OutgoingReport {
    /// Envelope recipients: the primary address followed by every CC
    pub fn recipients(&self) -> Vec<&str> {
        std::iter::once(self.to.as_str())
            .chain(self.cc.iter().map(String::as_str))
            .collect()
    }
}

#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send(&self, report: OutgoingReport) -> Result<(), MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipients_put_primary_first() {
        let report = OutgoingReport {
            to: "owner@example.com".to_string(),
            cc: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            subject: "s".to_string(),
            html_body: String::new(),
            thread: None,
        };
        assert_eq!(
            report.recipients(),
            vec!["owner@example.com", "a@example.com", "b@example.com"]
        );
    }
}
