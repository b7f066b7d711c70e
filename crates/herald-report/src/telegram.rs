//! Telegram document delivery.
//!
//! Posts the generated document to a chat via the Bot API's `sendDocument`
//! endpoint as a multipart upload. Delivery is fire-and-forget: a non-2xx
//! response or network failure degrades, it is logged by the caller and
//! never retried.

use std::path::Path;

use herald_core::{Degraded, Outcome, TelegramTarget};

const API_BASE: &str = "https://api.telegram.org";

/// Caption attached to a delivered document.
///
/// # Examples
///
/// ```
/// use herald_report::telegram::caption;
///
/// assert_eq!(caption("main", "abc1234"), "Auto summary — main @ abc1234");
/// ```
pub fn caption(branch: &str, short_sha: &str) -> String {
    format!("Auto summary — {branch} @ {short_sha}")
}

/// Telegram Bot API client for document delivery.
///
/// # Examples
///
/// ```
/// use herald_core::TelegramTarget;
/// use herald_report::telegram::TelegramClient;
///
/// let client = TelegramClient::new(TelegramTarget {
///     bot_token: "12345:abc".into(),
///     chat_id: "-42".into(),
/// });
/// ```
pub struct TelegramClient {
    http: reqwest::Client,
    target: TelegramTarget,
    api_base: String,
}

impl TelegramClient {
    /// Create a client against the production Bot API.
    pub fn new(target: TelegramTarget) -> Self {
        Self::with_api_base(target, API_BASE)
    }

    /// Create a client against a custom API base URL.
    pub fn with_api_base(target: TelegramTarget, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            target,
            api_base: api_base.into(),
        }
    }

    /// Upload `document` with `caption` to the configured chat.
    ///
    /// Degrades on a missing file, a network failure, or a non-2xx response;
    /// the reason carries the status and body for the log.
    pub async fn send_document(&self, document: &Path, caption: &str) -> Outcome<()> {
        let bytes = std::fs::read(document).map_err(|e| {
            Degraded::new(format!("failed to read {}: {e}", document.display()))
        })?;
        let file_name = document
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "summary.pdf".into());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.target.chat_id.clone())
            .text("caption", caption.to_string())
            .part("document", part);

        let url = format!(
            "{}/bot{}/sendDocument",
            self.api_base, self.target.bot_token
        );
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Degraded::new(format!("failed to reach Telegram: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Degraded::new(format!(
                "Telegram API error {status}: {body}"
            )));
        }

        Ok(())
    }
}
