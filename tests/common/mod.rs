#![allow(dead_code)]

use std::{collections::VecDeque, net::TcpListener, sync::Mutex, time::Duration};

use async_trait::async_trait;
use homework_notifier::{
    BotConfig, Credentials,
    client::{self, HomeworkSource, PollCursor},
    config::PollingConfig,
    notifier::Notifier,
};
use serde_json::{Value, json};

pub const PRACTICUM_TOKEN: &str = "practicum-test-token";
pub const TELEGRAM_TOKEN: &str = "123456:telegram-test-token";
pub const CHAT_ID: &str = "987654321";

pub fn test_config(api_uri: &str, telegram_uri: &str) -> BotConfig {
    BotConfig::new(Credentials::new(PRACTICUM_TOKEN, TELEGRAM_TOKEN, CHAT_ID))
        .with_endpoint(format!("{api_uri}/api/user_api/homework_statuses/"))
        .with_telegram_api_url(telegram_uri)
}

/// Base URI of a local port nothing listens on
pub fn closed_port_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn polling() -> PollingConfig {
    PollingConfig { retry_period: Duration::from_secs(600) }
}

/// Replays queued responses; once empty, answers "nothing new" at the same cursor
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<client::Result<Value>>>,
    seen: Mutex<Vec<PollCursor>>,
}

impl ScriptedSource {
    pub fn new(responses: impl IntoIterator<Item = client::Result<Value>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            seen: Mutex::default(),
        }
    }

    /// Cursors passed to `fetch`, in call order
    pub fn seen(&self) -> Vec<PollCursor> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HomeworkSource for ScriptedSource {
    async fn fetch(&self, cursor: PollCursor) -> client::Result<Value> {
        self.seen.lock().unwrap().push(cursor);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"homeworks": [], "current_date": cursor.timestamp()})))
    }
}

/// Keeps every message it was asked to deliver
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.sent.lock().unwrap().push(message.to_owned());
    }
}
