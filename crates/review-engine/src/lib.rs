//! Compliance review pipeline
//!
//! Turns PDF bytes into a structured [`ComplianceReport`] and mails the
//! rendered report back to the requester:
//!
//! ```text
//! PDF bytes → text (pdf) → prompt → LLM (llm) → JSON (decode) → HTML (report) → mail
//! ```
//!
//! The two network collaborators sit behind traits so the orchestration can
//! be exercised without a live model or mail relay:
//!
//! - [`CompletionClient`] for the chat-completion service
//! - [`ReportMailer`] for outbound mail (implemented over SMTP in `mail-gateway`)

pub mod config;
pub mod decode;
pub mod llm;
pub mod mailer;
pub mod pdf;
pub mod prompt;
pub mod report;
pub mod reviewer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{ConfigError, ImapSettings, LlmSettings, Secret, ServiceConfig, SmtpSettings};
pub use decode::{decode_report, strip_code_fences, DecodeError};
pub use llm::{CompletionClient, LlmError, OpenAiClient};
pub use mailer::{MailError, OutgoingReport, ReportMailer};
pub use pdf::{ExtractionError, PdfTextExtractor};
pub use prompt::build_review_prompt;
pub use report::render_report_html;
pub use reviewer::{ReviewError, ReviewRequest, Reviewer, DEFAULT_REPORT_SUBJECT};

pub use review_types::{
    AllowList, Category, ComplianceIssue, ComplianceReport, Severity, ThreadContext,
};
