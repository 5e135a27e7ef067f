//! Notification dispatch.
//!
//! Renders one message per recipient from a closed batch and hands it to a
//! [`MailTransport`]. Sends are sequential, in batch order.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::NotificationConfig;
use crate::error::{Error, TransportError};
use crate::notify::batch::NotificationBatch;
use crate::notify::render::{MessageRenderer, RenderedMessage};

/// A message ready for the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Trait for mail transports: pure I/O, no decisions.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_mail(&self, mail: OutgoingMail) -> Result<(), TransportError>;
}

/// What to do when the transport fails for one recipient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Record the failure and carry on with the next recipient.
    Continue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Render everything but send nothing.
    pub dry_run: bool,
    pub on_failure: FailurePolicy,
}

/// Outcome for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    DryRun,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Delivery {
    pub message: RenderedMessage,
    pub status: DeliveryStatus,
}

/// Result of a dispatch pass, in batch order.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub deliveries: Vec<Delivery>,
    /// Documents excluded by the filter.
    pub skipped: usize,
    /// Documents that resolved to no recipient.
    pub unrouted: usize,
}

impl DispatchReport {
    pub fn sent(&self) -> usize {
        self.count(|status| *status == DeliveryStatus::Sent)
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, DeliveryStatus::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.deliveries
            .iter()
            .filter(|delivery| predicate(&delivery.status))
            .count()
    }
}

/// Render and send one message per recipient in `batch`.
///
/// Under [`FailurePolicy::Abort`] the first transport error ends the pass and
/// is returned; remaining recipients are not contacted. Render errors always
/// abort.
pub async fn dispatch_all(
    batch: &NotificationBatch<'_>,
    config: &NotificationConfig,
    transport: &dyn MailTransport,
    options: DispatchOptions,
) -> Result<DispatchReport, Error> {
    let renderer = MessageRenderer::new(config)?;
    let mut report = DispatchReport {
        deliveries: Vec::with_capacity(batch.len()),
        skipped: batch.skipped(),
        unrouted: batch.unrouted().len(),
    };

    for (recipient, documents) in batch.iter() {
        let message = renderer.render(recipient, documents)?;

        if options.dry_run {
            info!(
                to = %recipient,
                documents = documents.len(),
                subject = %message.subject,
                "Dry run, not sending notification"
            );
            report.deliveries.push(Delivery {
                message,
                status: DeliveryStatus::DryRun,
            });
            continue;
        }

        let mail = OutgoingMail {
            from: config.notification_from.clone(),
            to: recipient.to_string(),
            subject: message.subject.clone(),
            html: message.body.clone(),
        };

        let status = match transport.send_mail(mail).await {
            Ok(()) => {
                info!(to = %recipient, documents = documents.len(), "Notification sent");
                DeliveryStatus::Sent
            }
            Err(e) if options.on_failure == FailurePolicy::Continue => {
                warn!(to = %recipient, error = %e, "Failed to send notification, continuing");
                DeliveryStatus::Failed(e.to_string())
            }
            Err(e) => return Err(e.into()),
        };
        report.deliveries.push(Delivery { message, status });
    }

    Ok(report)
}
