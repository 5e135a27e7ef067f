//! Error types for outdate-notify.

/// Top-level error type for a notification run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
///
/// Raised while loading configuration, before any document is looked at.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid regular expression in {field}: {pattern}: {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Template errors.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to compile {template} template: {reason}")]
    Compile { template: String, reason: String },

    #[error("Failed to render {template} template for {recipient}: {reason}")]
    Render {
        template: String,
        recipient: String,
        reason: String,
    },
}

/// Mail transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to send notification to {recipient}: {reason}")]
    SendFailed { recipient: String, reason: String },
}

/// Result type alias for notification runs.
pub type Result<T> = std::result::Result<T, Error>;
