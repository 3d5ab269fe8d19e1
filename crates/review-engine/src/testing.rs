//! Test support: PDF fixtures and in-memory collaborators
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! downstream crates that need a reviewer without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::llm::{CompletionClient, LlmError};
use crate::mailer::{MailError, OutgoingReport, ReportMailer};

/// Build a PDF with one page per entry; an empty entry yields a page with no text
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("serialize fixture PDF");
    buffer
}

/// Model response flagging one gambling-marketing issue
pub const GAMBLING_RESPONSE: &str = r#"```json
{
  "issues": [
    {
      "id": "G1",
      "category": "Gambling",
      "severity": "High",
      "regulation_reference": "UK Gambling Act 2005, Section 327; CAP Code 16.3.1",
      "exact_violation_text": "Bet now, no limits!",
      "rule_description": "Gambling marketing must not encourage irresponsible or unlimited play.",
      "recommendation": "Remove 'no limits' and add responsible gambling messaging."
    }
  ],
  "summary": "The document promotes unlimited gambling, which breaches UK gambling advertising rules."
}
```"#;

/// Model response for a compliant document
pub const COMPLIANT_RESPONSE: &str =
    r#"{"issues": [], "summary": "The document is fully compliant with the reviewed regulations."}"#;

/// Completion client returning a fixed response and counting calls
pub struct ScriptedCompletion {
    response: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn replying(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a non-success HTTP status
    pub fn failing(body: impl Into<String>) -> Self {
        Self {
            response: Err(body.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(body) => Err(LlmError::Status {
                status: 500,
                body: body.clone(),
            }),
        }
    }
}

/// Mailer that records every report instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingReport>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the attempt, then fails like an unreachable relay
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingReport> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send(&self, report: OutgoingReport) -> Result<(), MailError> {
        self.sent.lock().expect("sent lock").push(report);
        if self.fail {
            return Err(MailError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}
