//! Polls the Practicum homework review API and forwards status changes to a
//! Telegram chat.

pub mod client;
pub mod config;
pub mod homework;
pub mod logging;
pub mod notifier;
pub mod result;

pub use client::{HomeworkPoller, PollCursor, PracticumApi, TickOutcome};
pub use config::{BotConfig, Credentials, check_tokens};
pub use notifier::{Notifier, TelegramNotifier};
pub use result::{BotError, Result};
