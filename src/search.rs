use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::data_models::{FastGptRequest, FastGptResults, SearchAnswer};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search query is empty")]
    EmptyQuery,

    #[error("api key is empty")]
    MissingApiKey,

    #[error("error making API request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned non-200 status: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("error decoding response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SearchError {
    /// Bad input from the caller, as opposed to a failure upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, SearchError::EmptyQuery | SearchError::MissingApiKey)
    }
}

/// Client for Kagi's FastGPT answer API.
#[derive(Debug, Clone)]
pub struct FastGptClient {
    client: Client,
    api_url: String,
    timeout: Duration,
}

impl FastGptClient {
    pub fn new(client: Client, api_url: impl Into<String>, timeout: Duration) -> FastGptClient {
        FastGptClient {
            client,
            api_url: api_url.into(),
            timeout,
        }
    }

    pub async fn search(&self, query: &str, api_key: &str) -> Result<SearchAnswer, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let res = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, format!("Bot {}", api_key.trim()))
            .json(&FastGptRequest { query })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(SearchError::Transport)?;
        if status != StatusCode::OK {
            log::error!("fastgpt returned {status} for query {query:?}");
            return Err(SearchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let results: FastGptResults = serde_json::from_str(&body).map_err(SearchError::Decode)?;
        if let Some(meta) = &results.meta {
            log::debug!(
                "fastgpt answered in {}ms on node {} (request {}, balance {})",
                meta.ms,
                meta.node,
                meta.id,
                meta.api_balance
            );
        }
        Ok(results.data.into())
    }
}
