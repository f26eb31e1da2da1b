use compact_str::CompactString;
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Некорректный ответ API: {message}")]
    ShapeError { message: CompactString },

    #[error("В ответе API отсутствует ключ {field}")]
    MissingField { field: CompactString },

    #[error("Неожиданный статус домашней работы: {}", .status.as_deref().unwrap_or("<пусто>"))]
    UnknownStatus { status: Option<CompactString> },

    #[error("Отсутствует обязательная переменная окружения: {name}")]
    MissingCredential { name: CompactString },

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidation { field: CompactString, message: CompactString },
}

impl BotError {
    /// Create a shape error
    pub fn shape(message: impl Into<CompactString>) -> Self {
        Self::ShapeError { message: message.into() }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<CompactString>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Create an unknown status error; empty statuses are reported as absent
    pub fn unknown_status(status: Option<&str>) -> Self {
        Self::UnknownStatus {
            status: status.filter(|s| !s.is_empty()).map(CompactString::from),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(name: impl Into<CompactString>) -> Self {
        Self::MissingCredential { name: name.into() }
    }

    /// Create a configuration validation error
    pub fn config_validation(field: impl Into<CompactString>, message: impl Into<CompactString>) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    /// Whether the error is forwarded to the chat in addition to being logged.
    ///
    /// Connection failures stay in the log: the chat is most likely unreachable
    /// through the same network. Startup errors never reach the poll loop.
    pub fn is_notifiable(&self) -> bool {
        match self {
            BotError::Client(ClientError::ConnectionFailure(_)) => false,
            BotError::Client(_) => true,
            BotError::ShapeError { .. }
            | BotError::MissingField { .. }
            | BotError::UnknownStatus { .. } => true,
            BotError::MissingCredential { .. } | BotError::ConfigValidation { .. } => false,
        }
    }

    /// Whether the error must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::MissingCredential { .. } | BotError::ConfigValidation { .. }
        )
    }

    /// Text sent to the chat for a notifiable error
    pub fn report_message(&self) -> String {
        format!("Сбой в работе программы: {self}")
    }
}
