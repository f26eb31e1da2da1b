//! Runtime configuration, read once from the environment at startup

use std::{env, time::Duration};

use compact_str::CompactString;

use crate::result::{BotError, Result};

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Tokens and chat id required to run the bot
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the review API
    pub practicum_token: CompactString,
    /// Bot token for the Telegram API
    pub telegram_token: CompactString,
    /// Destination chat
    pub telegram_chat_id: CompactString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"***")
            .field("telegram_token", &"***")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        practicum_token: impl Into<CompactString>,
        telegram_token: impl Into<CompactString>,
        telegram_chat_id: impl Into<CompactString>,
    ) -> Self {
        Self {
            practicum_token: practicum_token.into(),
            telegram_token: telegram_token.into(),
            telegram_chat_id: telegram_chat_id.into(),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// Fails on the first variable that is absent or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<CompactString> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(CompactString::from)
                .ok_or_else(|| BotError::missing_credential(name))
        };

        Ok(Self {
            practicum_token: required(PRACTICUM_TOKEN)?,
            telegram_token: required(TELEGRAM_TOKEN)?,
            telegram_chat_id: required(TELEGRAM_CHAT_ID)?,
        })
    }
}

/// True when every credential is present and non-empty
pub fn check_tokens(credentials: &Credentials) -> bool {
    [
        &credentials.practicum_token,
        &credentials.telegram_token,
        &credentials.telegram_chat_id,
    ]
    .iter()
    .all(|value| !value.trim().is_empty())
}

/// Main configuration for the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub credentials: Credentials,
    /// Review API endpoint
    pub endpoint: CompactString,
    /// Telegram Bot API base URL
    pub telegram_api_url: CompactString,
    /// Polling configuration
    pub polling: PollingConfig,
    /// Request configuration
    pub request: RequestConfig,
}

/// Polling interval configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay between two iterations, applied after every iteration
    pub retry_period: Duration,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { retry_period: Duration::from_secs(600) }
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30) }
    }
}

impl BotConfig {
    /// Create a configuration with default endpoints and intervals
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: DEFAULT_ENDPOINT.into(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.into(),
            polling: PollingConfig::default(),
            request: RequestConfig::default(),
        }
    }

    /// Build the configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(Credentials::from_env()?);

        if let Ok(endpoint) = env::var("PRACTICUM_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        if let Ok(url) = env::var("TELEGRAM_API_URL") {
            config = config.with_telegram_api_url(url);
        }
        if let Some(period) = seconds_from_env("RETRY_PERIOD")? {
            config = config.with_retry_period(period);
        }
        if let Some(timeout) = seconds_from_env("REQUEST_TIMEOUT")? {
            config = config.with_request(RequestConfig { timeout });
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !check_tokens(&self.credentials) {
            return Err(BotError::config_validation(
                "credentials",
                "Tokens and chat id cannot be empty",
            ));
        }

        for (field, value) in [
            ("endpoint", &self.endpoint),
            ("telegram_api_url", &self.telegram_api_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(BotError::config_validation(
                    field,
                    "URL must start with http:// or https://",
                ));
            }

            if url::Url::parse(value).is_err() {
                return Err(BotError::config_validation(field, "URL is not a valid URL format"));
            }
        }

        if self.polling.retry_period.is_zero() {
            return Err(BotError::config_validation(
                "retry_period",
                "Retry period must be greater than zero",
            ));
        }

        if self.request.timeout.is_zero() {
            return Err(BotError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Set the review API endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<CompactString>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the Telegram API base URL
    pub fn with_telegram_api_url(mut self, url: impl Into<CompactString>) -> Self {
        self.telegram_api_url = url.into();
        self
    }

    /// Set the delay between polling iterations
    pub fn with_retry_period(mut self, retry_period: Duration) -> Self {
        self.polling.retry_period = retry_period;
        self
    }

    /// Set request configuration
    pub fn with_request(mut self, request: RequestConfig) -> Self {
        self.request = request;
        self
    }
}

fn seconds_from_env(name: &str) -> Result<Option<Duration>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| BotError::config_validation(name, "Expected a number of seconds")),
        Err(_) => Ok(None),
    }
}
