//! Notification engine.
//!
//! Every run flows through:
//! 1. `filter`: exception patterns, then excluded labels
//! 2. `resolver`: maintainer rules → recipient addresses
//! 3. `batch`: group documents per recipient
//! 4. `render` + `dispatch`: one message per recipient, after batching closes

pub mod batch;
pub mod dispatch;
pub mod filter;
pub mod render;
pub mod resolver;

use tracing::info;
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::document::DocumentRecord;
use crate::error::Result;

pub use batch::NotificationBatch;
pub use dispatch::{
    Delivery, DeliveryStatus, DispatchOptions, DispatchReport, FailurePolicy, MailTransport,
    OutgoingMail, dispatch_all,
};
pub use render::{MessageRenderer, RenderedMessage};

/// Run one complete notification pass over `records`.
#[tracing::instrument(
    name = "notification_run",
    skip_all,
    fields(run_id = %Uuid::new_v4(), dry_run = options.dry_run)
)]
pub async fn run(
    records: &[DocumentRecord],
    config: &NotificationConfig,
    transport: &dyn MailTransport,
    options: DispatchOptions,
) -> Result<DispatchReport> {
    info!(documents = records.len(), "Starting notification run");
    let batch = NotificationBatch::build(records, config);
    let report = dispatch_all(&batch, config, transport, options).await?;
    info!(
        recipients = report.deliveries.len(),
        sent = report.sent(),
        failed = report.failed(),
        skipped = report.skipped,
        unrouted = report.unrouted,
        "Notification run complete"
    );
    Ok(report)
}
