//! Inbound message parsing

use mail_parser::{Address, Addr, MessageParser, MessagePart, MimeHeaders};
use review_types::ThreadContext;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InboundError {
    #[error("message could not be parsed as RFC 822")]
    Unparseable,
}

/// A PDF part taken from an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfAttachment {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// The parts of an inbound message the poller acts on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// Bare address of the first From mailbox
    pub sender: Option<String>,
    pub cc: Vec<String>,
    /// Message-ID without angle brackets
    pub message_id: Option<String>,
    pub subject: Option<String>,
    pub pdf_attachments: Vec<PdfAttachment>,
}

impl InboundMessage {
    pub fn parse(raw: &[u8]) -> Result<Self, InboundError> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or(InboundError::Unparseable)?;

        let sender = message
            .from()
            .and_then(|from| addresses(from).into_iter().next());
        let cc = message.cc().map(addresses).unwrap_or_default();

        let pdf_attachments = message
            .parts
            .iter()
            .filter(|part| is_pdf(part))
            .map(|part| PdfAttachment {
                filename: part.attachment_name().map(str::to_string),
                data: part.contents().to_vec(),
            })
            .filter(|attachment| !attachment.data.is_empty())
            .collect();

        Ok(Self {
            sender,
            cc,
            message_id: message.message_id().map(str::to_string),
            subject: message.subject().map(str::to_string),
            pdf_attachments,
        })
    }

    /// Threading context for the reply, if the message had a Message-ID
    pub fn thread_context(&self) -> Option<ThreadContext> {
        self.message_id.as_deref().map(ThreadContext::new)
    }
}

fn addresses(address: &Address<'_>) -> Vec<String> {
    let bare = |addr: &Addr<'_>| addr.address().map(|a| a.trim().to_string());
    match address {
        Address::List(list) => list.iter().filter_map(bare).collect(),
        Address::Group(groups) => groups
            .iter()
            .flat_map(|group| group.addresses.iter())
            .filter_map(bare)
            .collect(),
    }
}

fn is_pdf(part: &MessagePart<'_>) -> bool {
    part.content_type()
        .map(|ct| {
            ct.ctype().eq_ignore_ascii_case("application")
                && ct
                    .subtype()
                    .map(|sub| sub.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .unwrap_or(false)
}
