//! Delivery of messages to the Telegram chat

use async_trait::async_trait;
use compact_str::{CompactString, format_compact};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::BotConfig;

/// Sends text to the single configured destination.
///
/// Implementations must never fail: delivery problems are logged and dropped.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram rejected the message (HTTP {status}): {description}")]
    Rejected {
        status: StatusCode,
        description: CompactString,
    },
}

// The request URL carries the bot token, so it never reaches the error text
impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Transport(e.without_url())
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<CompactString>,
}

/// Telegram Bot API notifier
#[derive(Debug)]
pub struct TelegramNotifier {
    client: Client,
    send_url: CompactString,
    chat_id: CompactString,
}

impl TelegramNotifier {
    pub fn new(config: &BotConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.request.timeout).build()?;

        Ok(Self {
            client,
            send_url: format_compact!(
                "{}/bot{}/sendMessage",
                config.telegram_api_url.trim_end_matches('/'),
                config.credentials.telegram_token
            ),
            chat_id: config.credentials.telegram_chat_id.clone(),
        })
    }

    /// Send a message and report the outcome
    pub async fn send_message(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.send_url.as_str())
            .json(&SendMessageRequest { chat_id: &self.chat_id, text: message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<TelegramResponse>(&body).ok();

        match parsed {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(TelegramResponse { description, .. }) => Err(NotifyError::Rejected {
                status,
                description: description.unwrap_or_default(),
            }),
            None => Err(NotifyError::Rejected { status, description: body.into() }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, message), fields(chat_id = %self.chat_id))]
    async fn notify(&self, message: &str) {
        info!("Sending message to Telegram");
        match self.send_message(message).await {
            Ok(()) => debug!(text = message, "Message delivered"),
            Err(e) => error!(error = %e, "Failed to deliver message to Telegram"),
        }
    }
}
