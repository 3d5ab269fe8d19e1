//! Process-wide configuration
//!
//! Read once at startup and shared (behind an `Arc`) with the HTTP handlers
//! and the mailbox poller. Nothing here is mutated after construction.

use std::fmt;
use std::time::Duration;

use review_types::AllowList;
use thiserror::Error;

use crate::reviewer::DEFAULT_REPORT_SUBJECT;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_IMAP_MAILBOX: &str = "INBOX";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-5-chat-latest";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Credential wrapper that never prints its contents
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Outbound relay (implicit TLS)
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,
    /// From header of every report mail
    pub from: String,
}

/// Inbound mailbox (implicit TLS)
#[derive(Debug, Clone)]
pub struct ImapSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,
    pub mailbox: String,
}

/// Chat-completion service
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Secret,
    pub base_url: String,
    pub model: String,
    /// `None` keeps requests unbounded
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub smtp: SmtpSettings,
    pub imap: ImapSettings,
    pub llm: LlmSettings,
    pub allowed_senders: AllowList,
    pub poll_interval: Duration,
    pub report_subject: String,
}

impl ServiceConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let smtp_user = required("SMTP_EMAIL")?;
        let smtp_password = required("SMTP_PASSWORD")?;

        let smtp = SmtpSettings {
            host: var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port: parse_or("SMTP_PORT", var("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
            username: smtp_user.clone(),
            password: Secret::new(smtp_password.clone()),
            from: smtp_user.clone(),
        };

        let imap = ImapSettings {
            host: var("IMAP_HOST").unwrap_or_else(|| DEFAULT_IMAP_HOST.to_string()),
            port: parse_or("IMAP_PORT", var("IMAP_PORT"), DEFAULT_IMAP_PORT)?,
            username: var("IMAP_USER").unwrap_or(smtp_user),
            password: Secret::new(var("IMAP_PASSWORD").unwrap_or(smtp_password)),
            mailbox: var("IMAP_MAILBOX").unwrap_or_else(|| DEFAULT_IMAP_MAILBOX.to_string()),
        };

        let timeout = match var("LLM_TIMEOUT_SECS") {
            Some(raw) => match parse_or("LLM_TIMEOUT_SECS", Some(raw.clone()), 0u64)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        name: "LLM_TIMEOUT_SECS",
                        value: raw,
                    })
                }
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        let llm = LlmSettings {
            api_key: Secret::new(required("OPENAI_API_KEY")?),
            base_url: var("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            timeout,
        };

        let allowed_senders = var("ALLOWED_SENDERS")
            .map(|raw| AllowList::from_csv(&raw))
            .unwrap_or_default();

        let poll_interval = Duration::from_secs(parse_or(
            "POLL_INTERVAL_SECS",
            var("POLL_INTERVAL_SECS"),
            DEFAULT_POLL_INTERVAL_SECS,
        )?);

        Ok(Self {
            smtp,
            imap,
            llm,
            allowed_senders,
            poll_interval,
            report_subject: var("REPORT_SUBJECT")
                .unwrap_or_else(|| DEFAULT_REPORT_SUBJECT.to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
