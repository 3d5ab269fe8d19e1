//! Background mailbox poller
//!
//! One long-lived task per process. Each cycle opens a fresh IMAP session,
//! reviews every PDF sent by an allow-listed sender, marks the processed
//! messages seen and logs out. Cycle errors are logged and never end the
//! loop; only the shutdown signal does.

use std::sync::Arc;
use std::time::Duration;

use review_engine::{ReviewRequest, Reviewer};
use review_types::AllowList;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::inbound::InboundMessage;
use crate::mailbox::{MailboxConnector, MailboxError, MailboxSession};

/// What a single poll cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub unseen: usize,
    /// Attachments reviewed successfully
    pub reviewed: usize,
    pub failed_reviews: usize,
    pub skipped_senders: usize,
    /// Messages that could not be fetched or parsed
    pub unreadable: usize,
    pub search_failed: bool,
}

impl CycleSummary {
    /// Nothing was waiting and nothing went wrong
    pub fn is_idle(&self) -> bool {
        self.unseen == 0 && !self.search_failed
    }
}

pub struct MailboxPoller {
    connector: Arc<dyn MailboxConnector>,
    reviewer: Arc<Reviewer>,
    allowed: AllowList,
    interval: Duration,
}

impl MailboxPoller {
    pub fn new(
        connector: Arc<dyn MailboxConnector>,
        reviewer: Arc<Reviewer>,
        allowed: AllowList,
        interval: Duration,
    ) -> Self {
        Self {
            connector,
            reviewer,
            allowed,
            interval,
        }
    }

    /// Run the poll loop on its own task until `shutdown` turns true or its
    /// sender is dropped
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            senders = self.allowed.len(),
            "mailbox poller started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.poll_once().await {
                Ok(summary) if summary.is_idle() => debug!(?summary, "poll cycle finished"),
                Ok(summary) => info!(?summary, "poll cycle finished"),
                Err(e) => error!(error = %e, "poll cycle failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                res = shutdown.changed() => {
                    if res.is_err() {
                        break;
                    }
                }
            }
        }

        info!("mailbox poller stopped");
    }

    /// One full cycle: connect, scan, process, log out.
    ///
    /// Only a failed connection is returned as an error. Everything after
    /// that is logged and reflected in the summary.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> Result<CycleSummary, MailboxError> {
        let mut session = self.connector.connect().await?;
        let mut summary = CycleSummary::default();

        match session.search_unseen().await {
            Ok(seqs) => {
                summary.unseen = seqs.len();
                if !seqs.is_empty() {
                    info!(count = seqs.len(), "unseen messages");
                }
                for seq in seqs {
                    self.process_message(session.as_mut(), seq, &mut summary)
                        .await;
                }
            }
            Err(e) => {
                warn!(error = %e, "unseen search failed");
                summary.search_failed = true;
            }
        }

        if let Err(e) = session.logout().await {
            warn!(error = %e, "logout failed");
        }
        Ok(summary)
    }

    async fn process_message(
        &self,
        session: &mut dyn MailboxSession,
        seq: u32,
        summary: &mut CycleSummary,
    ) {
        let raw = match session.fetch_message(seq).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(seq, error = %e, "fetch failed");
                summary.unreadable += 1;
                return;
            }
        };

        let message = match InboundMessage::parse(&raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(seq, error = %e, "dropping unparseable message");
                summary.unreadable += 1;
                mark_seen(session, seq).await;
                return;
            }
        };

        let sender = match message.sender.as_deref() {
            Some(sender) if self.allowed.contains(sender) => sender.to_string(),
            other => {
                info!(seq, sender = other.unwrap_or("-"), "sender not allowed, skipping");
                summary.skipped_senders += 1;
                mark_seen(session, seq).await;
                return;
            }
        };

        info!(
            seq,
            sender = %sender,
            subject = message.subject.as_deref().unwrap_or("-"),
            attachments = message.pdf_attachments.len(),
            "processing message"
        );
        let thread = message.thread_context();
        for attachment in &message.pdf_attachments {
            let mut request = ReviewRequest::new(sender.clone()).with_cc(message.cc.clone());
            if let Some(thread) = &thread {
                request = request.with_thread(thread.clone());
            }
            if let Some(filename) = &attachment.filename {
                request = request.with_filename(filename.clone());
            }

            match self.reviewer.review(&attachment.data, request).await {
                Ok(_) => summary.reviewed += 1,
                Err(e) if e.is_empty_document() => {
                    warn!(seq, sender = %sender, "attachment has no extractable text");
                    summary.failed_reviews += 1;
                }
                Err(e) => {
                    error!(seq, sender = %sender, error = %e, "attachment review failed");
                    summary.failed_reviews += 1;
                }
            }
        }

        mark_seen(session, seq).await;
    }
}

async fn mark_seen(session: &mut dyn MailboxSession, seq: u32) {
    if let Err(e) = session.mark_seen(seq).await {
        warn!(seq, error = %e, "failed to mark message seen");
    }
}
