//! Staleness checks.
//!
//! A check selects documents carrying all of its labels whose last version is
//! older than its maximum age. The document-store client runs the search; the
//! helpers here build the query and re-test fetched records.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentRecord;

/// One row of the checks table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    /// Labels a document must all carry.
    pub labels: Vec<String>,
    /// Maximum age in days.
    pub max_age: u32,
}

impl Check {
    pub fn new(labels: &[&str], max_age: u32) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            max_age,
        }
    }

    /// Label and space filter, e.g. `label = a AND label = b AND space = DOCS`.
    pub fn search_filter(&self, space: Option<&str>) -> String {
        let mut clauses: Vec<String> = self
            .labels
            .iter()
            .map(|label| format!("label = {label}"))
            .collect();
        if let Some(space) = space.filter(|s| !s.is_empty()) {
            clauses.push(format!("space = {space}"));
        }
        clauses.join(" AND ")
    }

    /// Documents last modified before this date are outdated.
    pub fn cutoff_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.max_age)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Full search query for the document store.
    pub fn search_query(&self, space: Option<&str>, today: NaiveDate) -> String {
        let mut query = format!("lastmodified < {}", self.cutoff_date(today).format("%Y-%m-%d"));
        let filter = self.search_filter(space);
        if !filter.is_empty() {
            query.push_str(" and ");
            query.push_str(&filter);
        }
        query
    }

    /// Whether `record` is older than this check allows.
    ///
    /// Records with an unparseable timestamp are never outdated.
    pub fn is_outdated(&self, record: &DocumentRecord, now: DateTime<Utc>) -> bool {
        let Some(last_version) = record.last_version_at() else {
            tracing::debug!(
                id = record.id,
                date = %record.last_version_date,
                "Unparseable last version date"
            );
            return false;
        };
        last_version.date_naive() < self.cutoff_date(now.date_naive())
    }

    /// Whether `record` carries every label of this check.
    pub fn applies_to(&self, record: &DocumentRecord) -> bool {
        self.labels.iter().all(|label| record.labels.contains(label))
    }
}

/// Whether any check selects `record` as outdated.
pub fn is_selected(checks: &[Check], record: &DocumentRecord, now: DateTime<Utc>) -> bool {
    checks
        .iter()
        .any(|check| check.applies_to(record) && check.is_outdated(record, now))
}
