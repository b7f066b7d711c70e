use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur across Herald.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the
/// boundary.
///
/// # Examples
///
/// ```
/// use herald_core::HeraldError;
///
/// let err = HeraldError::Config("missing chat id".into());
/// assert!(err.to_string().contains("missing chat id"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum HeraldError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// Document rendering failure.
    #[error("render error: {0}")]
    Render(String),

    /// Report delivery failure.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// The reason an external call degraded instead of succeeding.
///
/// Herald's pipeline never aborts on external-command failure; each wrapper
/// returns [`Outcome`] and the report renders the reason instead of silently
/// omitting context.
///
/// # Examples
///
/// ```
/// use herald_core::Degraded;
///
/// let d = Degraded::new("git fetch exited with status 128");
/// assert_eq!(d.to_string(), "git fetch exited with status 128");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Degraded {
    /// Human-readable reason rendered into the report.
    pub reason: String,
}

impl Degraded {
    /// Create a degradation with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Result type for external-call wrappers: success, or a reported reason
/// for running with reduced output.
pub type Outcome<T> = std::result::Result<T, Degraded>;
