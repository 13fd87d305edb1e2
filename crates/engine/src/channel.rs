//! Notification delivery channel.
//!
//! The dispatcher only knows the [`NotificationChannel`] trait; the
//! production implementation talks to the Telegram Bot API, and tests
//! substitute an in-memory recording channel.

use async_trait::async_trait;
use serde::Deserialize;

/// A delivery failure. Failures are treated as transient; the
/// dispatcher leaves the event PLANNED and retries on a later poll.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

/// Something that can deliver a reminder text to an instructor's chat.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError>;
}

/// Channel used when no delivery credentials are configured. Every
/// send fails, which leaves events PLANNED for a properly configured
/// dispatcher to pick up.
pub struct DisabledChannel;

#[async_trait]
impl NotificationChannel for DisabledChannel {
    async fn send(&self, _chat_id: i64, _text: &str) -> Result<(), ChannelError> {
        Err(ChannelError("notification channel not configured".into()))
    }
}

/// Telegram Bot API channel.
pub struct TelegramChannel {
    client: reqwest::Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramChannel {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }

    /// Build from the `TELEGRAM_BOT_TOKEN` environment variable.
    pub fn from_env() -> Self {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN must be set");
        Self::new(&token)
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), ChannelError> {
        let url = format!("{}/sendMessage", self.api_base);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| ChannelError(format!("request failed: {e}")))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| ChannelError(format!("malformed response ({status}): {e}")))?;

        if body.ok {
            Ok(())
        } else {
            Err(ChannelError(format!(
                "telegram rejected the message ({status}): {}",
                body.description.unwrap_or_else(|| "no description".into()),
            )))
        }
    }
}
