//! Configuration types.
//!
//! The configuration document is parsed elsewhere into the JSON shape of
//! [`RawNotificationConfig`]. Loading it here compiles every pattern once, so
//! the notification engine only ever sees valid matchers.

use std::path::Path;

use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::checks::Check;
use crate::error::ConfigError;

/// Directive token substituted by the document's last author.
pub const LAST_AUTHOR_TOKEN: &str = "_lastauthor";

/// Directive token substituted by the document's creator.
pub const CREATOR_TOKEN: &str = "_creator";

// ── Raw (serialized) form ───────────────────────────────────────────

/// Configuration as it comes out of the configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotificationConfig {
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub excluded_labels: Vec<String>,
    #[serde(default)]
    pub maintainer: Vec<RawMaintainerRule>,
    #[serde(default)]
    pub domain: Option<String>,
    pub notification_from: String,
    pub notification_subject_template: String,
    pub notification_body_template: String,
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub checks: Vec<Check>,
    #[serde(default)]
    pub notify_last_author_when_unmatched: bool,
}

/// One row of the maintainer table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaintainerRule {
    pub page_pattern: String,
    pub maintainer: String,
}

// ── Compiled form ───────────────────────────────────────────────────

/// A single entry of a maintainer directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientToken {
    /// A recipient identifier, used verbatim.
    Literal(String),
    /// The document's last author.
    LastAuthor,
    /// The document's creator.
    Creator,
}

impl RecipientToken {
    /// Parse a comma-separated directive such as `"alice,_lastauthor"`.
    ///
    /// Tokens are trimmed; empty tokens are dropped.
    pub fn parse_directive(directive: &str) -> Vec<Self> {
        directive
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| match token {
                LAST_AUTHOR_TOKEN => Self::LastAuthor,
                CREATOR_TOKEN => Self::Creator,
                other => Self::Literal(other.to_string()),
            })
            .collect()
    }
}

/// Maintainer override: documents whose full path matches `pattern` are
/// routed according to `tokens`.
#[derive(Debug, Clone)]
pub struct MaintainerRule {
    pub pattern: Regex,
    pub tokens: Vec<RecipientToken>,
    /// The directive as written, kept for logging.
    pub directive: String,
}

impl MaintainerRule {
    pub fn new(pattern: &str, directive: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            pattern: compile_pattern("maintainer", pattern)?,
            tokens: RecipientToken::parse_directive(directive),
            directive: directive.to_string(),
        })
    }
}

/// Loaded notification configuration, consumed read-only by a run.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Path patterns excluding documents entirely, in declared order.
    pub exceptions: Vec<Regex>,
    /// Excluded labels, lower-cased.
    pub excluded_labels: Vec<String>,
    pub maintainer: Vec<MaintainerRule>,
    /// Suffix appended to bare recipient identifiers.
    pub domain: Option<String>,
    pub notification_from: String,
    pub notification_subject_template: String,
    pub notification_body_template: String,
    /// Space the checks are restricted to, if any.
    pub space: Option<String>,
    pub checks: Vec<Check>,
    /// Route documents matching no maintainer rule to their last author even
    /// when maintainer rules exist.
    pub notify_last_author_when_unmatched: bool,
}

impl NotificationConfig {
    /// Compile a raw configuration.
    pub fn from_raw(raw: RawNotificationConfig) -> Result<Self, ConfigError> {
        if raw.notification_from.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "notificationFrom".into(),
                message: "sender address must not be empty".into(),
            });
        }

        let exceptions = raw
            .exceptions
            .iter()
            .map(|pattern| compile_pattern("exceptions", pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let maintainer = raw
            .maintainer
            .iter()
            .map(|rule| MaintainerRule::new(&rule.page_pattern, &rule.maintainer))
            .collect::<Result<Vec<_>, _>>()?;

        let excluded_labels = raw
            .excluded_labels
            .iter()
            .map(|label| label.trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();

        let domain = raw
            .domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let space = raw
            .space
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            exceptions,
            excluded_labels,
            maintainer,
            domain,
            notification_from: raw.notification_from,
            notification_subject_template: raw.notification_subject_template,
            notification_body_template: raw.notification_body_template,
            space,
            checks: raw.checks,
            notify_last_author_when_unmatched: raw.notify_last_author_when_unmatched,
        })
    }

    /// Parse and compile a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawNotificationConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Read, parse and compile a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            exceptions = config.exceptions.len(),
            maintainer_rules = config.maintainer.len(),
            checks = config.checks.len(),
            "Loaded notification configuration"
        );
        Ok(config)
    }
}

fn compile_pattern(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

// ── SMTP ────────────────────────────────────────────────────────────

/// SMTP settings, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default());

        Some(Self {
            host,
            port,
            username,
            password,
        })
    }
}
