//! Message rendering with the configured Handlebars templates.
//!
//! Templates are compiled once per run and rendered in strict mode, so an
//! expression that does not resolve fails the render instead of producing an
//! incomplete message.

use handlebars::Handlebars;
use serde::Serialize;

use crate::config::NotificationConfig;
use crate::document::DocumentRecord;
use crate::error::RenderError;

const SUBJECT_TEMPLATE: &str = "subject";
const BODY_TEMPLATE: &str = "body";

/// A rendered notification for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub recipient: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

/// Template context for one recipient.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext<'a> {
    /// The recipient address.
    pub author: &'a str,
    pub documents_count: usize,
    pub multiple_documents: bool,
    pub documents: Vec<DocumentView<'a>>,
}

/// Read-only view of a document as templates see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView<'a> {
    pub id: u64,
    pub title: &'a str,
    pub url: &'a str,
    pub short_url: &'a str,
    pub author: &'a str,
    pub creator: &'a str,
    /// `YYYY-MM-DD HH:MM` in UTC, or the raw value if it does not parse.
    pub last_version_date: String,
    pub last_version_message: &'a str,
    pub labels: &'a [String],
    /// Full slash-joined path including the title.
    pub path: String,
}

impl<'a> DocumentView<'a> {
    pub fn new(record: &'a DocumentRecord) -> Self {
        let last_version_date = record
            .last_version_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| record.last_version_date.clone());

        Self {
            id: record.id,
            title: &record.title,
            url: &record.url,
            short_url: &record.short_url,
            author: &record.author,
            creator: &record.creator,
            last_version_date,
            last_version_message: &record.last_version_message,
            labels: &record.labels,
            path: record.full_path(),
        }
    }
}

impl<'a> RenderContext<'a> {
    pub fn new(recipient: &'a str, batch: &[&'a DocumentRecord]) -> Self {
        Self {
            author: recipient,
            documents_count: batch.len(),
            multiple_documents: batch.len() > 1,
            documents: batch.iter().copied().map(DocumentView::new).collect(),
        }
    }
}

/// Compiled subject and body templates.
pub struct MessageRenderer {
    /// Plain text, rendered without HTML escaping.
    subject: Handlebars<'static>,
    body: Handlebars<'static>,
}

impl MessageRenderer {
    /// Compile the templates from `config`.
    pub fn new(config: &NotificationConfig) -> Result<Self, RenderError> {
        let mut subject = Handlebars::new();
        subject.set_strict_mode(true);
        subject.register_escape_fn(handlebars::no_escape);
        subject
            .register_template_string(SUBJECT_TEMPLATE, &config.notification_subject_template)
            .map_err(|e| RenderError::Compile {
                template: SUBJECT_TEMPLATE.into(),
                reason: e.to_string(),
            })?;

        let mut body = Handlebars::new();
        body.set_strict_mode(true);
        body.register_template_string(BODY_TEMPLATE, &config.notification_body_template)
            .map_err(|e| RenderError::Compile {
                template: BODY_TEMPLATE.into(),
                reason: e.to_string(),
            })?;

        Ok(Self { subject, body })
    }

    /// Render the message for `recipient` over its complete batch.
    pub fn render(
        &self,
        recipient: &str,
        batch: &[&DocumentRecord],
    ) -> Result<RenderedMessage, RenderError> {
        let context = RenderContext::new(recipient, batch);

        let subject = self
            .subject
            .render(SUBJECT_TEMPLATE, &context)
            .map_err(|e| RenderError::Render {
                template: SUBJECT_TEMPLATE.into(),
                recipient: recipient.into(),
                reason: e.to_string(),
            })?;
        let body = self
            .body
            .render(BODY_TEMPLATE, &context)
            .map_err(|e| RenderError::Render {
                template: BODY_TEMPLATE.into(),
                recipient: recipient.into(),
                reason: e.to_string(),
            })?;

        Ok(RenderedMessage {
            recipient: recipient.to_string(),
            subject,
            body,
        })
    }
}
