//! HTTP client for the homework review API

use async_trait::async_trait;
use compact_str::CompactString;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use super::error::{ClientError, Result};
use crate::{client::cursor::PollCursor, config::BotConfig};

/// Anything that can answer "what changed since `cursor`"
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch the raw status payload for the window starting at `cursor`
    async fn fetch(&self, cursor: PollCursor) -> Result<Value>;
}

/// Pure HTTP client for the review API
#[derive(Debug)]
pub struct PracticumApi {
    client: Client,
    endpoint: CompactString,
    token: CompactString,
}

impl PracticumApi {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request.timeout)
            .build()
            .map_err(ClientError::RequestFailure)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.credentials.practicum_token.clone(),
        })
    }

    /// Get homework statuses updated since `from_date`
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn get_homework_statuses(&self, from_date: i64) -> Result<Value> {
        let response = self
            .authenticated_request()
            .query(&[("from_date", from_date)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create authenticated request builder
    fn authenticated_request(&self) -> RequestBuilder {
        self.client
            .get(self.endpoint.as_str())
            .header("Authorization", format!("OAuth {}", self.token))
    }

    /// Check the status code and decode the JSON body without interpreting it
    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::unexpected_status(self.endpoint.clone(), status));
        }

        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Received review API response");

        serde_json::from_str(&body).map_err(|e| ClientError::malformed(self.endpoint.clone(), e))
    }
}

#[async_trait]
impl HomeworkSource for PracticumApi {
    async fn fetch(&self, cursor: PollCursor) -> Result<Value> {
        self.get_homework_statuses(cursor.timestamp()).await
    }
}
