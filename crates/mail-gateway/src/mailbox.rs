//! IMAP mailbox access
//!
//! The `imap` crate is blocking, so every command runs on the blocking pool.
//! The session is moved into the blocking task and handed back when the
//! command finishes; a panicking command leaves the session closed.

use std::net::TcpStream;

use async_trait::async_trait;
use native_tls::{TlsConnector, TlsStream};
use review_engine::ImapSettings;
use thiserror::Error;
use tracing::debug;

type TlsSession = imap::Session<TlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("imap connect to {host}:{port} failed: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("imap login failed for {username}: {reason}")]
    Auth { username: String, reason: String },

    #[error("imap {command} failed: {reason}")]
    Command {
        command: &'static str,
        reason: String,
    },

    #[error("imap session is closed")]
    Closed,

    #[error("imap task failed: {0}")]
    Task(String),
}

/// An authenticated session with the inbox selected
#[async_trait]
pub trait MailboxSession: Send {
    /// Sequence numbers of messages without the \Seen flag
    async fn search_unseen(&mut self) -> Result<Vec<u32>, MailboxError>;

    /// Full RFC 822 source of one message
    async fn fetch_message(&mut self, seq: u32) -> Result<Vec<u8>, MailboxError>;

    async fn mark_seen(&mut self, seq: u32) -> Result<(), MailboxError>;

    async fn logout(&mut self) -> Result<(), MailboxError>;
}

/// Opens a fresh session for each poll cycle
#[async_trait]
pub trait MailboxConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError>;
}

/// Implicit-TLS IMAP connector
pub struct ImapConnector {
    settings: ImapSettings,
}

impl ImapConnector {
    pub fn new(settings: ImapSettings) -> Self {
        Self { settings }
    }

    fn open(settings: &ImapSettings) -> Result<TlsSession, MailboxError> {
        let connect_err = |reason: String| MailboxError::Connect {
            host: settings.host.clone(),
            port: settings.port,
            reason,
        };

        let tls = TlsConnector::builder()
            .build()
            .map_err(|e| connect_err(e.to_string()))?;
        let client = imap::connect(
            (settings.host.as_str(), settings.port),
            &settings.host,
            &tls,
        )
        .map_err(|e| connect_err(e.to_string()))?;

        let mut session = client
            .login(&settings.username, settings.password.expose())
            .map_err(|(e, _)| MailboxError::Auth {
                username: settings.username.clone(),
                reason: e.to_string(),
            })?;

        session
            .select(&settings.mailbox)
            .map_err(|e| MailboxError::Command {
                command: "SELECT",
                reason: e.to_string(),
            })?;
        Ok(session)
    }
}

#[async_trait]
impl MailboxConnector for ImapConnector {
    async fn connect(&self) -> Result<Box<dyn MailboxSession>, MailboxError> {
        let settings = self.settings.clone();
        let session = tokio::task::spawn_blocking(move || Self::open(&settings))
            .await
            .map_err(|e| MailboxError::Task(e.to_string()))??;
        debug!(host = %self.settings.host, mailbox = %self.settings.mailbox, "imap session open");
        Ok(Box::new(ImapSession {
            session: Some(session),
        }))
    }
}

struct ImapSession {
    session: Option<TlsSession>,
}

impl ImapSession {
    async fn run<T, F>(&mut self, command: &'static str, op: F) -> Result<T, MailboxError>
    where
        F: FnOnce(&mut TlsSession) -> imap::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut session = self.session.take().ok_or(MailboxError::Closed)?;
        let (session, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut session);
            (session, result)
        })
        .await
        .map_err(|e| MailboxError::Task(e.to_string()))?;
        self.session = Some(session);

        result.map_err(|e| MailboxError::Command {
            command,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl MailboxSession for ImapSession {
    async fn search_unseen(&mut self) -> Result<Vec<u32>, MailboxError> {
        let mut seqs: Vec<u32> = self
            .run("SEARCH", |s| s.search("UNSEEN"))
            .await?
            .into_iter()
            .collect();
        seqs.sort_unstable();
        Ok(seqs)
    }

    async fn fetch_message(&mut self, seq: u32) -> Result<Vec<u8>, MailboxError> {
        self.run("FETCH", move |s| {
            let fetches = s.fetch(seq.to_string(), "RFC822")?;
            Ok(fetches
                .iter()
                .find_map(|fetch| fetch.body().map(<[u8]>::to_vec)))
        })
        .await?
        .ok_or(MailboxError::Command {
            command: "FETCH",
            reason: format!("no RFC822 body returned for message {}", seq),
        })
    }

    async fn mark_seen(&mut self, seq: u32) -> Result<(), MailboxError> {
        self.run("STORE", move |s| {
            s.store(seq.to_string(), "+FLAGS (\\Seen)").map(|_| ())
        })
        .await
    }

    async fn logout(&mut self) -> Result<(), MailboxError> {
        let result = self.run("LOGOUT", |s| s.logout()).await;
        self.session = None;
        result
    }
}
