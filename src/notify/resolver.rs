//! Recipient resolution.
//!
//! Without maintainer rules every document goes to its last author. Once rules
//! exist, routing is opt-in per match: only matching rules contribute, and the
//! last author or creator is added only when a matching directive asks for it.

use indexmap::IndexSet;
use tracing::debug;

use crate::config::{NotificationConfig, RecipientToken};
use crate::document::DocumentRecord;

/// Recipient addresses for `record`, deduplicated in first-seen order.
pub fn resolve(record: &DocumentRecord, config: &NotificationConfig) -> Vec<String> {
    let mut recipients: IndexSet<&str> = IndexSet::new();
    let mut add_last_author = config.maintainer.is_empty();
    let mut add_creator = false;
    let mut matched = false;

    for rule in &config.maintainer {
        if !record.matches_path(&rule.pattern) {
            continue;
        }
        matched = true;
        debug!(
            id = record.id,
            pattern = %rule.pattern,
            directive = %rule.directive,
            "Document matched maintainer rule"
        );
        for token in &rule.tokens {
            match token {
                RecipientToken::Literal(name) => {
                    recipients.insert(name.as_str());
                }
                RecipientToken::LastAuthor => add_last_author = true,
                RecipientToken::Creator => add_creator = true,
            }
        }
    }

    if !matched && config.notify_last_author_when_unmatched {
        add_last_author = true;
    }
    if add_last_author {
        recipients.insert(record.author.as_str());
    }
    if add_creator {
        recipients.insert(record.creator.as_str());
    }

    recipients
        .into_iter()
        .map(|recipient| match &config.domain {
            Some(domain) => format!("{recipient}@{domain}"),
            None => recipient.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RawMaintainerRule, RawNotificationConfig};
    use crate::document::sample_record;

    fn config(rules: &[(&str, &str)], domain: Option<&str>) -> NotificationConfig {
        NotificationConfig::from_raw(RawNotificationConfig {
            maintainer: rules
                .iter()
                .map(|(pattern, maintainer)| RawMaintainerRule {
                    page_pattern: pattern.to_string(),
                    maintainer: maintainer.to_string(),
                })
                .collect(),
            domain: domain.map(String::from),
            notification_from: "noreply@example.com".into(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn defaults_to_last_author_without_rules() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        assert_eq!(resolve(&record, &config(&[], None)), vec!["author2"]);
    }

    #[test]
    fn appends_domain() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        assert_eq!(
            resolve(&record, &config(&[], Some("example.com"))),
            vec!["author2@example.com"]
        );
    }

    #[test]
    fn maintainer_and_last_author() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let config = config(&[("main/Test2", "maintainer,_lastauthor")], Some("example.com"));
        assert_eq!(
            resolve(&record, &config),
            vec!["maintainer@example.com", "author2@example.com"]
        );
    }

    #[test]
    fn maintainer_overrides_last_author() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let config = config(&[("main/", "maintainer")], None);
        assert_eq!(resolve(&record, &config), vec!["maintainer"]);
    }

    #[test]
    fn creator_sentinel_adds_creator_after_last_author() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let config = config(&[("main", "_creator,_lastauthor")], None);
        assert_eq!(resolve(&record, &config), vec!["author2", "creator"]);
    }

    #[test]
    fn rules_accumulate_and_sentinels_never_leak() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let config = config(&[("main", "_lastauthor"), ("Test2", "alice")], None);
        let recipients = resolve(&record, &config);
        assert_eq!(recipients, vec!["alice", "author2"]);
        assert!(!recipients.iter().any(|r| r.starts_with('_')));
    }

    #[test]
    fn duplicates_are_removed_in_first_seen_order() {
        let mut record = sample_record(1, "Test2", &["main"], "alice");
        record.creator = "bob".into();
        let config = config(
            &[("main", "bob,alice"), ("Test2", "alice,_lastauthor,_creator")],
            None,
        );
        assert_eq!(resolve(&record, &config), vec!["bob", "alice"]);
    }

    #[test]
    fn unmatched_document_gets_nobody_when_rules_exist() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let config = config(&[("^other/", "maintainer")], None);
        assert!(resolve(&record, &config).is_empty());
    }

    #[test]
    fn unmatched_document_falls_back_when_enabled() {
        let record = sample_record(1, "Test2", &["main"], "author2");
        let mut config = config(&[("^other/", "maintainer")], None);
        config.notify_last_author_when_unmatched = true;
        assert_eq!(resolve(&record, &config), vec!["author2"]);
    }
}
