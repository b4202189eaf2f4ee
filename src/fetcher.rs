use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

const BODY_SNIPPET_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

/// Raw page as it came off the wire.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: Bytes,
    /// URL after redirects.
    pub final_url: Url,
}

impl FetchedPage {
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Single-shot GET over reqwest; no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> HttpFetcher {
        HttpFetcher { client, timeout }
    }
}

pub fn parse_target_url(url: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = parse_target_url(url)?;
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: target.to_string(),
            source,
        };

        log::debug!("fetching page {target}");
        let res = self
            .client
            .get(target.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let final_url = res.url().clone();
        if !status.is_success() {
            // body is best effort here, the status is what matters
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: final_url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        let body = res.bytes().await.map_err(transport)?;
        log::debug!("fetched {} bytes from {final_url}", body.len());
        Ok(FetchedPage { body, final_url })
    }
}
