//! Exclusion filter: decides whether a document is left out of a run.
//!
//! Exception patterns are checked first, in declared order, and win over
//! everything else. Excluded labels are compared case-insensitively.

use tracing::debug;

use crate::config::NotificationConfig;
use crate::document::DocumentRecord;

/// Why a document was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The full path matched an exception pattern.
    Exception { pattern: String },
    /// The document carries an excluded label.
    Label { label: String },
}

/// First matching exclusion for `record`, if any.
pub fn skip_reason(record: &DocumentRecord, config: &NotificationConfig) -> Option<SkipReason> {
    if let Some(pattern) = config
        .exceptions
        .iter()
        .find(|pattern| record.matches_path(pattern))
    {
        return Some(SkipReason::Exception {
            pattern: pattern.as_str().to_string(),
        });
    }

    for excluded in &config.excluded_labels {
        if record
            .labels
            .iter()
            .any(|label| label.to_lowercase() == *excluded)
        {
            return Some(SkipReason::Label {
                label: excluded.clone(),
            });
        }
    }

    None
}

/// Whether `record` is excluded from notification.
pub fn should_skip(record: &DocumentRecord, config: &NotificationConfig) -> bool {
    match skip_reason(record, config) {
        Some(reason) => {
            debug!(
                id = record.id,
                path = %record.full_path(),
                reason = ?reason,
                "Skipping document"
            );
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawNotificationConfig;
    use crate::document::sample_record;

    fn config(exceptions: &[&str], excluded_labels: &[&str]) -> NotificationConfig {
        NotificationConfig::from_raw(RawNotificationConfig {
            exceptions: exceptions.iter().map(|s| s.to_string()).collect(),
            excluded_labels: excluded_labels.iter().map(|s| s.to_string()).collect(),
            notification_from: "noreply@example.com".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn keeps_document_without_rules() {
        let record = sample_record(1, "Test2", &["main"], "author");
        assert!(!should_skip(&record, &config(&[], &[])));
    }

    #[test]
    fn skips_matching_exception() {
        let record = sample_record(1, "Test2", &["staging", "drafts"], "author");
        assert_eq!(
            skip_reason(&record, &config(&["^staging/"], &[])),
            Some(SkipReason::Exception {
                pattern: "^staging/".into()
            })
        );
    }

    #[test]
    fn first_matching_exception_wins() {
        let record = sample_record(1, "Test2", &["main"], "author");
        let reason = skip_reason(&record, &config(&["nomatch", "Test", "main"], &[]));
        assert_eq!(
            reason,
            Some(SkipReason::Exception {
                pattern: "Test".into()
            })
        );
    }

    #[test]
    fn skips_excluded_label_case_insensitively() {
        let mut record = sample_record(1, "Test2", &["main"], "author");
        record.labels = vec!["NOT".into()];
        assert_eq!(
            skip_reason(&record, &config(&[], &["not"])),
            Some(SkipReason::Label { label: "not".into() })
        );
    }

    #[test]
    fn exception_takes_precedence_over_label() {
        let mut record = sample_record(1, "Test2", &["main"], "author");
        record.labels = vec!["archived".into()];
        let reason = skip_reason(&record, &config(&["main/"], &["archived"]));
        assert!(matches!(reason, Some(SkipReason::Exception { .. })));
    }

    #[test]
    fn unrelated_labels_are_kept() {
        let mut record = sample_record(1, "Test2", &["main"], "author");
        record.labels = vec!["howto".into(), "nothing".into()];
        assert!(!should_skip(&record, &config(&["staging"], &["not"])));
    }
}
