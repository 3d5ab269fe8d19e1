//! Mail plumbing for the compliance reviewer
//!
//! - [`smtp`]: delivers rendered reports as threaded replies over implicit-TLS SMTP
//! - [`inbound`]: parses raw RFC 822 messages into sender, CC and PDF attachments
//! - [`mailbox`]: IMAP session over implicit TLS behind the [`MailboxConnector`] seam
//! - [`poller`]: background worker that reviews PDFs from allow-listed senders
//!
//! ## Poll cycle
//!
//! ```text
//! IDLE → CONNECTED → SCANNING → (PROCESSING)* → DISCONNECTED → SLEEPING → IDLE
//! ```
//!
//! Every error inside a cycle is logged and the loop carries on after the
//! sleep interval; the worker only stops when its shutdown signal fires.

pub mod inbound;
pub mod mailbox;
pub mod poller;
pub mod smtp;

pub use inbound::{InboundError, InboundMessage, PdfAttachment};
pub use mailbox::{ImapConnector, MailboxConnector, MailboxError, MailboxSession};
pub use poller::{CycleSummary, MailboxPoller};
pub use smtp::{build_message, reply_subject, SmtpMailer};
