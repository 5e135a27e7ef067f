use std::path::PathBuf;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::Utc;

use outdate_notify::checks;
use outdate_notify::config::{NotificationConfig, SmtpConfig};
use outdate_notify::document::DocumentRecord;
use outdate_notify::error::TransportError;
use outdate_notify::mail::SmtpMailer;
use outdate_notify::notify::{self, DispatchOptions, FailurePolicy, MailTransport, OutgoingMail};

/// Stand-in transport for dry runs without SMTP settings.
struct NoTransport;

#[async_trait]
impl MailTransport for NoTransport {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), TransportError> {
        Err(TransportError::SendFailed {
            recipient: mail.to,
            reason: "SMTP is not configured".into(),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_path(name: &str) -> anyhow::Result<PathBuf> {
    std::env::var(name)
        .map(PathBuf::from)
        .with_context(|| format!("{name} not set"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = env_path("OUTDATE_CONFIG_PATH")?;
    let documents_path = env_path("OUTDATE_DOCUMENTS_PATH")?;
    let dry_run = env_flag("OUTDATE_DRY_RUN");
    let on_failure = if env_flag("OUTDATE_CONTINUE_ON_ERROR") {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let config = NotificationConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    let json = std::fs::read_to_string(&documents_path)
        .with_context(|| format!("reading documents from {}", documents_path.display()))?;
    let mut documents: Vec<DocumentRecord> =
        serde_json::from_str(&json).context("parsing documents")?;

    if !config.checks.is_empty() {
        let now = Utc::now();
        let total = documents.len();
        documents.retain(|record| checks::is_selected(&config.checks, record, now));
        tracing::info!(
            selected = documents.len(),
            total,
            "Applied staleness checks"
        );
    }

    let transport: Box<dyn MailTransport> = match SmtpConfig::from_env() {
        Some(smtp) => Box::new(SmtpMailer::new(smtp)),
        None if dry_run => Box::new(NoTransport),
        None => bail!("SMTP_HOST not set (required unless OUTDATE_DRY_RUN=1)"),
    };

    let report = notify::run(
        &documents,
        &config,
        transport.as_ref(),
        DispatchOptions {
            dry_run,
            on_failure,
        },
    )
    .await?;

    eprintln!(
        "Notified {} of {} recipient(s) ({} failed, {} document(s) skipped, {} unrouted)",
        report.sent(),
        report.deliveries.len(),
        report.failed(),
        report.skipped,
        report.unrouted,
    );
    Ok(())
}
