//! SMTP report delivery
//!
//! One implicit-TLS connection per send, authenticated with the service
//! account. No pooling and no retry; the caller decides what a failure means.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use review_engine::{MailError, OutgoingReport, ReportMailer, SmtpSettings};
use tracing::{info, instrument};

const REPLY_PREFIX: &str = "Re:";

/// Prefix a subject with "Re: " unless it already starts with "Re:"
pub fn reply_subject(subject: &str) -> String {
    if subject.starts_with(REPLY_PREFIX) {
        subject.to_string()
    } else {
        format!("{} {}", REPLY_PREFIX, subject)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: format!("{}", e),
    })
}

/// Build the MIME message for a report.
///
/// The envelope is derived from the To and Cc headers, so it always holds
/// the primary recipient followed by every CC address. Threaded replies carry
/// the original Message-ID in both In-Reply-To and References.
pub fn build_message(from: &str, report: &OutgoingReport) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(&report.to)?)
        .subject(reply_subject(&report.subject));

    for cc in &report.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }

    if let Some(thread) = &report.thread {
        let original = thread.header_value();
        builder = builder.in_reply_to(original.clone()).references(original);
    }

    builder
        .multipart(MultiPart::alternative().singlepart(SinglePart::html(report.html_body.clone())))
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Report mailer backed by an SMTP relay
pub struct SmtpMailer {
    settings: SmtpSettings,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }

    fn deliver(settings: &SmtpSettings, message: &Message) -> Result<(), MailError> {
        let transport = SmtpTransport::relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose().to_string(),
            ))
            .build();

        transport
            .send(message)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    #[instrument(skip(self, report), fields(to = %report.to, cc = report.cc.len()))]
    async fn send(&self, report: OutgoingReport) -> Result<(), MailError> {
        let message = build_message(&self.settings.from, &report)?;
        let settings = self.settings.clone();

        tokio::task::spawn_blocking(move || Self::deliver(&settings, &message))
            .await
            .map_err(|e| MailError::Task(e.to_string()))??;

        info!(host = %self.settings.host, "report delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_types::ThreadContext;

    fn report(cc: &[&str], thread: Option<ThreadContext>) -> OutgoingReport {
        OutgoingReport {
            to: "devaang18@gmail.com".to_string(),
            cc: cc.iter().map(|s| s.to_string()).collect(),
            subject: "Your Compliance Report".to_string(),
            html_body: "<html><body><p>ok</p></body></html>".to_string(),
            thread,
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn test_reply_subject_adds_prefix_once() {
        assert_eq!(reply_subject("Your Compliance Report"), "Re: Your Compliance Report");
        assert_eq!(reply_subject("Re: Your Compliance Report"), "Re: Your Compliance Report");
        assert_eq!(reply_subject("Re:tight"), "Re:tight");
    }

    #[test]
    fn test_reply_subject_prefix_check_is_case_sensitive() {
        assert_eq!(reply_subject("RE: shouting"), "Re: RE: shouting");
        assert_eq!(reply_subject("re: quiet"), "Re: re: quiet");
    }

    #[test]
    fn test_plain_message_has_no_cc_or_thread_headers() {
        let message = build_message("bot@example.com", &report(&[], None)).unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("Subject: Re: Your Compliance Report"));
        assert!(!raw.contains("\r\nCc:"));
        assert!(!raw.contains("In-Reply-To:"));
        assert!(!raw.contains("References:"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
        assert_eq!(message.envelope().to().len(), 1);
    }

    #[test]
    fn test_cc_addresses_join_the_envelope() {
        let message = build_message(
            "bot@example.com",
            &report(&["legal@example.com", "ops@example.com"], None),
        )
        .unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("\r\nCc: "));
        assert!(raw.contains("legal@example.com"));
        let recipients: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(recipients.len(), 3);
        assert!(recipients.contains(&"devaang18@gmail.com".to_string()));
        assert!(recipients.contains(&"ops@example.com".to_string()));
    }

    #[test]
    fn test_thread_headers_use_original_message_id() {
        let thread = ThreadContext::new("CAF+abc123@mail.gmail.com");
        let message = build_message("bot@example.com", &report(&[], Some(thread))).unwrap();
        let raw = formatted(&message);

        assert!(raw.contains("In-Reply-To: <CAF+abc123@mail.gmail.com>"));
        assert!(raw.contains("References: <CAF+abc123@mail.gmail.com>"));
    }

    proptest::proptest! {
        #[test]
        fn reply_subject_is_idempotent(subject in "[ -~]{0,40}") {
            let once = reply_subject(&subject);
            proptest::prop_assert!(once.starts_with("Re:"));
            proptest::prop_assert_eq!(reply_subject(&once), once);
        }
    }

    #[test]
    fn test_invalid_recipient_is_address_error() {
        let mut bad = report(&[], None);
        bad.to = "not an address".to_string();
        let err = build_message("bot@example.com", &bad).unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }
}
