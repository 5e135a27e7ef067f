//! Document records and path matching.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Metadata snapshot of one tracked document.
///
/// Produced by the document-store client; the notification engine only ever
/// borrows records and never writes to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Document ID in the document store.
    pub id: u64,
    /// Author of the most recent version.
    pub author: String,
    /// Author of the first version.
    pub creator: String,
    /// ISO 8601 timestamp of the most recent version.
    pub last_version_date: String,
    /// Edit message of the most recent version (may be empty).
    #[serde(default)]
    pub last_version_message: String,
    pub title: String,
    /// Ancestor titles, root first, not including `title`.
    #[serde(default)]
    pub path: Vec<String>,
    /// Absolute link to the document.
    pub url: String,
    /// Relative link to the document.
    #[serde(default)]
    pub short_url: String,
    /// Labels, case-sensitive, order irrelevant.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl DocumentRecord {
    /// Ancestors and title joined by `/`, e.g. `main/Sub/Title`.
    pub fn full_path(&self) -> String {
        let mut full = String::new();
        for segment in &self.path {
            full.push_str(segment);
            full.push('/');
        }
        full.push_str(&self.title);
        full
    }

    /// Whether `pattern` matches anywhere in the full path.
    pub fn matches_path(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.full_path())
    }

    /// The last version timestamp, if it parses.
    ///
    /// Accepts RFC 3339 as well as offsets without a colon (`+0100`).
    pub fn last_version_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_version_date.trim();
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: u64, title: &str, path: &[&str], author: &str) -> DocumentRecord {
    DocumentRecord {
        id,
        author: author.into(),
        creator: "creator".into(),
        last_version_date: "2020-01-01T12:00:00.000Z".into(),
        last_version_message: String::new(),
        title: title.into(),
        path: path.iter().map(|s| s.to_string()).collect(),
        url: format!("https://wiki.example.com/pages/{id}"),
        short_url: format!("/x/{id}"),
        labels: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_joins_ancestors_and_title() {
        let record = sample_record(1, "Test2", &["main", "sub"], "author");
        assert_eq!(record.full_path(), "main/sub/Test2");
    }

    #[test]
    fn full_path_of_root_document_is_title() {
        let record = sample_record(1, "Home", &[], "author");
        assert_eq!(record.full_path(), "Home");
    }

    #[test]
    fn pattern_matches_substring() {
        let record = sample_record(1, "Test2", &["main"], "author");
        assert!(record.matches_path(&Regex::new("main/Test2").unwrap()));
        assert!(record.matches_path(&Regex::new("Test").unwrap()));
        assert!(record.matches_path(&Regex::new("^main/").unwrap()));
        assert!(!record.matches_path(&Regex::new("^Test2").unwrap()));
        assert!(!record.matches_path(&Regex::new("staging").unwrap()));
    }

    #[test]
    fn parses_version_timestamps() {
        let mut record = sample_record(1, "Home", &[], "author");
        let parsed = record.last_version_at().unwrap();
        assert_eq!(parsed.to_rfc3339(), "2020-01-01T12:00:00+00:00");

        record.last_version_date = "2020-01-01T13:00:00.000+0100".into();
        assert_eq!(record.last_version_at(), Some(parsed));

        record.last_version_date = "last tuesday".into();
        assert!(record.last_version_at().is_none());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let record: DocumentRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "author": "alice",
            "creator": "bob",
            "lastVersionDate": "2021-03-04T05:06:07Z",
            "title": "Runbook",
            "url": "https://wiki.example.com/x/7"
        }))
        .unwrap();
        assert_eq!(record.author, "alice");
        assert!(record.path.is_empty());
        assert!(record.labels.is_empty());
        assert_eq!(record.last_version_message, "");
    }
}
