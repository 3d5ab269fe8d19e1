//! Compliance Review Server
//!
//! Reviews marketing PDFs against gambling, marketing and legal rules and
//! mails the findings back to the requester. Two entry points share one
//! [`Reviewer`]:
//!
//! - `POST /review` for direct base64 submissions
//! - a background IMAP poller for PDFs mailed in by allow-listed senders
//!
//! Configuration comes from the environment (an optional `.env` file is
//! loaded first); see [`ServiceConfig::from_env`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use mail_gateway::{ImapConnector, MailboxPoller, SmtpMailer};
use review_engine::{OpenAiClient, Reviewer, ServiceConfig};
use review_types::AllowList;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_health, handle_review};

/// Command-line arguments for the review server
#[derive(Parser, Debug)]
#[command(name = "review-server")]
#[command(about = "Compliance review server for emailed and uploaded PDFs")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Serve HTTP only, without polling the mailbox
    #[arg(long)]
    no_poller: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reviewer: Arc<Reviewer>,
    pub allowed: Arc<AllowList>,
}

/// Router with every endpoint and the HTTP middleware stack
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/review", post(handle_review))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env()?;
    info!(
        model = %config.llm.model,
        smtp = %config.smtp.host,
        senders = ?config.allowed_senders.iter().collect::<Vec<_>>(),
        "configuration loaded"
    );
    if config.llm.timeout.is_none() {
        warn!("LLM_TIMEOUT_SECS not set; a stalled completion blocks its review indefinitely");
    }

    let llm = Arc::new(OpenAiClient::new(&config.llm)?);
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let reviewer =
        Arc::new(Reviewer::new(llm, mailer).with_subject(config.report_subject.clone()));
    let allowed = Arc::new(config.allowed_senders.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = if args.no_poller {
        info!("mailbox poller disabled");
        None
    } else {
        let poller = MailboxPoller::new(
            Arc::new(ImapConnector::new(config.imap.clone())),
            reviewer.clone(),
            config.allowed_senders.clone(),
            config.poll_interval,
        );
        Some(poller.spawn(shutdown_rx))
    };

    let state = AppState { reviewer, allowed };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutdown requested");
        })
        .await?;

    shutdown_tx.send(true).ok();
    if let Some(handle) = poller {
        if let Err(e) = handle.await {
            warn!(error = %e, "poller task ended abnormally");
        }
    }

    Ok(())
}
