use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

use crate::config::{FEED_REQUEST_TIMEOUT, FEED_USER_AGENT};

/// Errors from fetching an upstream page
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP status {0} from {1}")]
    Status(reqwest::StatusCode, String),
    #[error("Invalid response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Body(err.to_string())
    }
}

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(*FEED_REQUEST_TIMEOUT))
        .user_agent(FEED_USER_AGENT.as_str())
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build HTTP client, using defaults: {}", e);
            reqwest::Client::new()
        })
});

/// GET `url` and return the body as text; non-2xx statuses are errors
pub async fn fetch_text(url: &str) -> Result<String, FetchError> {
    tracing::debug!("Fetching {}", url);

    let response = HTTP_CLIENT.get(url).send().await?;

    if !response.status().is_success() {
        tracing::error!("Upstream {} answered with status {}", url, response.status());
        return Err(FetchError::Status(response.status(), url.to_string()));
    }

    let body = response.text().await?;
    tracing::debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}

/// GET `url` and decode the body as JSON
pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let body = fetch_text(url).await?;
    Ok(serde_json::from_str(&body)?)
}
