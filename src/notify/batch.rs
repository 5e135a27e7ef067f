//! Per-recipient batching for one notification run.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::NotificationConfig;
use crate::document::DocumentRecord;
use crate::notify::{filter, resolver};

/// Documents grouped by recipient for a single run.
///
/// Recipients iterate in first-seen order and each recipient's documents in
/// input order. Records are borrowed, never copied or modified.
#[derive(Debug, Default)]
pub struct NotificationBatch<'a> {
    buckets: IndexMap<String, Vec<&'a DocumentRecord>>,
    skipped: usize,
    unrouted: Vec<&'a DocumentRecord>,
}

impl<'a> NotificationBatch<'a> {
    /// Filter, resolve and group `records`.
    pub fn build(records: &'a [DocumentRecord], config: &NotificationConfig) -> Self {
        let mut batch = Self::default();

        for record in records {
            if filter::should_skip(record, config) {
                batch.skipped += 1;
                continue;
            }

            let recipients = resolver::resolve(record, config);
            if recipients.is_empty() {
                warn!(
                    id = record.id,
                    path = %record.full_path(),
                    "Document matched no maintainer rule, nobody will be notified"
                );
                batch.unrouted.push(record);
                continue;
            }

            for recipient in recipients {
                let bucket = batch.buckets.entry(recipient).or_default();
                if !bucket.iter().any(|queued| std::ptr::eq(*queued, record)) {
                    bucket.push(record);
                }
            }
        }

        debug!(
            recipients = batch.buckets.len(),
            skipped = batch.skipped,
            unrouted = batch.unrouted.len(),
            "Notification batch built"
        );
        batch
    }

    /// Recipients and their documents, in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a DocumentRecord])> {
        self.buckets
            .iter()
            .map(|(recipient, documents)| (recipient.as_str(), documents.as_slice()))
    }

    /// Documents queued for `recipient`.
    pub fn get(&self, recipient: &str) -> Option<&[&'a DocumentRecord]> {
        self.buckets.get(recipient).map(Vec::as_slice)
    }

    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Number of recipients.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of documents excluded by the filter.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Documents that were not excluded but resolved to no recipient.
    pub fn unrouted(&self) -> &[&'a DocumentRecord] {
        &self.unrouted
    }
}
