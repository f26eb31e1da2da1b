//! Error types for the review API client

use compact_str::CompactString;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures produced while talking to the homework review API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint could not be reached at all
    #[error("Ошибка подключения к API: {0}")]
    ConnectionFailure(#[source] reqwest::Error),

    /// Any other transport level failure, timeouts included
    #[error("Ошибка запроса к API: {0}")]
    RequestFailure(#[source] reqwest::Error),

    #[error("Эндпоинт {endpoint} недоступен, код ответа: {status}")]
    UnexpectedStatusCode {
        endpoint: CompactString,
        status: StatusCode,
    },

    #[error("Ошибка преобразования из JSON ({endpoint}): {source}")]
    MalformedResponse {
        endpoint: CompactString,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ClientError::ConnectionFailure(e)
        } else {
            ClientError::RequestFailure(e)
        }
    }
}

impl ClientError {
    /// Create an unexpected status code error
    pub fn unexpected_status(endpoint: impl Into<CompactString>, status: StatusCode) -> Self {
        Self::UnexpectedStatusCode { endpoint: endpoint.into(), status }
    }

    /// Create a malformed response error
    pub fn malformed(endpoint: impl Into<CompactString>, source: serde_json::Error) -> Self {
        Self::MalformedResponse { endpoint: endpoint.into(), source }
    }
}
