//! Review orchestration
//!
//! ```text
//! bytes → temp file → text → prompt → completion → report → HTML → mail
//! ```
//!
//! Every step before the mail send is fatal to the review. Mail delivery is
//! best effort: a failure is logged and the decoded report is still returned.

use std::sync::Arc;

use review_types::{ComplianceReport, Severity, ThreadContext};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::decode::{decode_report, DecodeError};
use crate::llm::{CompletionClient, LlmError};
use crate::mailer::{OutgoingReport, ReportMailer};
use crate::pdf::{ExtractionError, PdfTextExtractor};
use crate::prompt::build_review_prompt;
use crate::report::render_report_html;

/// Subject of report mails, before the reply prefix
pub const DEFAULT_REPORT_SUBJECT: &str = "Your Compliance Report";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("PDF extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM processing error: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM processing error: {0}")]
    MalformedResponse(#[from] DecodeError),

    #[error("review task failed: {0}")]
    Task(String),
}

impl ReviewError {
    /// True when the PDF parsed but had no text to review
    pub fn is_empty_document(&self) -> bool {
        matches!(self, ReviewError::Extraction(ExtractionError::EmptyDocument))
    }
}

/// Who asked for the review and where the report should go
#[derive(Debug, Clone, Default)]
pub struct ReviewRequest {
    pub sender: String,
    pub cc: Vec<String>,
    pub thread: Option<ThreadContext>,
    /// Original attachment or upload name, for logging
    pub filename: Option<String>,
}

impl ReviewRequest {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Default::default()
        }
    }

    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    pub fn with_thread(mut self, thread: ThreadContext) -> Self {
        self.thread = Some(thread);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Compliance reviewer shared by the HTTP endpoint and the mailbox poller
pub struct Reviewer {
    llm: Arc<dyn CompletionClient>,
    mailer: Arc<dyn ReportMailer>,
    subject: String,
}

impl Reviewer {
    pub fn new(llm: Arc<dyn CompletionClient>, mailer: Arc<dyn ReportMailer>) -> Self {
        Self {
            llm,
            mailer,
            subject: DEFAULT_REPORT_SUBJECT.to_string(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Review a PDF and mail the report to the sender.
    ///
    /// Returns the decoded report whether or not the mail went out.
    #[instrument(
        skip(self, pdf_bytes, request),
        fields(
            review_id = %uuid::Uuid::new_v4(),
            sender = %request.sender,
            filename = request.filename.as_deref().unwrap_or("-"),
        )
    )]
    pub async fn review(
        &self,
        pdf_bytes: &[u8],
        request: ReviewRequest,
    ) -> Result<ComplianceReport, ReviewError> {
        let bytes = pdf_bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || {
            PdfTextExtractor::extract_via_tempfile(&bytes)
        })
        .await
        .map_err(|e| ReviewError::Task(e.to_string()))??;
        info!(chars = text.len(), "extracted document text");

        let prompt = build_review_prompt(&text);
        let raw = self.llm.complete(&prompt).await?;
        let report = decode_report(&raw)?;
        info!(
            issues = report.issues.len(),
            high = report.count_by_severity(&Severity::High),
            medium = report.count_by_severity(&Severity::Medium),
            low = report.count_by_severity(&Severity::Low),
            "review decoded"
        );

        let outgoing = OutgoingReport {
            to: request.sender,
            cc: request.cc,
            subject: self.subject.clone(),
            html_body: render_report_html(&report),
            thread: request.thread,
        };
        match self.mailer.send(outgoing).await {
            Ok(()) => info!("report mailed"),
            Err(e) => error!(error = %e, "failed to mail report"),
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        pdf_with_pages, RecordingMailer, ScriptedCompletion, COMPLIANT_RESPONSE,
        GAMBLING_RESPONSE,
    };
    use review_types::Category;

    fn reviewer(
        llm: &Arc<ScriptedCompletion>,
        mailer: &Arc<RecordingMailer>,
    ) -> Reviewer {
        Reviewer::new(llm.clone(), mailer.clone())
    }

    #[tokio::test]
    async fn test_gambling_document_is_flagged_and_mailed() {
        let llm = Arc::new(ScriptedCompletion::replying(GAMBLING_RESPONSE));
        let mailer = Arc::new(RecordingMailer::new());
        let pdf = pdf_with_pages(&["Bet now, no limits!"]);

        let report = reviewer(&llm, &mailer)
            .review(&pdf, ReviewRequest::new("devaang18@gmail.com"))
            .await
            .unwrap();

        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].category, Category::Gambling);
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts()[0].contains("Bet now, no limits!"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "devaang18@gmail.com");
        assert_eq!(sent[0].subject, "Your Compliance Report");
        assert!(sent[0].html_body.contains("issue-row"));
    }

    #[tokio::test]
    async fn test_blank_pdf_fails_before_llm() {
        let llm = Arc::new(ScriptedCompletion::replying(COMPLIANT_RESPONSE));
        let mailer = Arc::new(RecordingMailer::new());
        let pdf = pdf_with_pages(&["", ""]);

        let err = reviewer(&llm, &mailer)
            .review(&pdf, ReviewRequest::new("devaang18@gmail.com"))
            .await
            .unwrap_err();

        assert!(err.is_empty_document());
        assert_eq!(llm.calls(), 0);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_still_returns_report() {
        let llm = Arc::new(ScriptedCompletion::replying(COMPLIANT_RESPONSE));
        let mailer = Arc::new(RecordingMailer::failing());
        let pdf = pdf_with_pages(&["Terms and conditions apply."]);

        let report = reviewer(&llm, &mailer)
            .review(&pdf, ReviewRequest::new("devaang18@gmail.com"))
            .await
            .unwrap();

        assert!(report.is_compliant());
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_error_and_not_mailed() {
        let llm = Arc::new(ScriptedCompletion::replying("Sorry, I can't help with that."));
        let mailer = Arc::new(RecordingMailer::new());
        let pdf = pdf_with_pages(&["Play responsibly."]);

        let err = reviewer(&llm, &mailer)
            .review(&pdf, ReviewRequest::new("devaang18@gmail.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewError::MalformedResponse(_)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_is_error() {
        let llm = Arc::new(ScriptedCompletion::failing("upstream down"));
        let mailer = Arc::new(RecordingMailer::new());
        let pdf = pdf_with_pages(&["Play responsibly."]);

        let err = reviewer(&llm, &mailer)
            .review(&pdf, ReviewRequest::new("devaang18@gmail.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReviewError::Llm(_)));
        assert!(err.to_string().starts_with("LLM processing error"));
    }

    #[tokio::test]
    async fn test_cc_and_thread_are_forwarded() {
        let llm = Arc::new(ScriptedCompletion::replying(COMPLIANT_RESPONSE));
        let mailer = Arc::new(RecordingMailer::new());
        let pdf = pdf_with_pages(&["Play responsibly."]);
        let request = ReviewRequest::new("devaang18@gmail.com")
            .with_cc(vec!["legal@example.com".to_string()])
            .with_thread(ThreadContext::new("<orig-1@mail.example>"))
            .with_filename("promo.pdf");

        reviewer(&llm, &mailer)
            .with_subject("Compliance results")
            .review(&pdf, request)
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent[0].cc, vec!["legal@example.com".to_string()]);
        assert_eq!(sent[0].subject, "Compliance results");
        assert_eq!(
            sent[0].thread.as_ref().map(|t| t.message_id.as_str()),
            Some("orig-1@mail.example")
        );
    }
}
