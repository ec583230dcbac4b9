//! HTTP client utilities.
//!
//! Provides the shared HTTP client and the status/JSON handling every API
//! call goes through. Non-success statuses become
//! [`CommandError::Transport`]; bodies that must be JSON and are not become
//! [`CommandError::PayloadDecode`]. Connection-level failures are left
//! unclassified.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde_json::Value;

use crate::error::{CommandError, Result};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("gcall/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CommandError::Other(anyhow::Error::new(e).context("cannot build HTTP client")))
}

/// A successful API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Body as text (lossy UTF-8).
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the body should be treated as JSON. A missing content type
    /// counts as JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

/// Send a request and check its status.
///
/// # Errors
///
/// - [`CommandError::Transport`] for non-2xx responses.
/// - [`CommandError::Other`] when the request could not be completed.
pub async fn send(request: RequestBuilder, url: &str) -> Result<ApiResponse> {
    let response = request.send().await.map_err(|e| connection_failure(e, url))?;

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|e| connection_failure(e, url))?
        .to_vec();

    tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "Received response");

    if !status.is_success() {
        return Err(CommandError::transport(status.as_u16(), body));
    }

    Ok(ApiResponse {
        status: status.as_u16(),
        content_type,
        body,
    })
}

fn connection_failure(err: reqwest::Error, url: &str) -> CommandError {
    let context = if err.is_timeout() {
        format!("request to {url} timed out")
    } else {
        format!("request to {url} failed")
    };
    CommandError::Other(anyhow::Error::new(err).context(context))
}

/// Parse text that must be JSON.
///
/// # Errors
///
/// Returns [`CommandError::PayloadDecode`] carrying the parser message and
/// the raw text.
pub fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| CommandError::payload_decode(e.to_string(), text))
}

/// Fetch JSON from a URL.
///
/// # Errors
///
/// Returns error on non-success status, network failure, or JSON parse
/// failure.
pub async fn fetch_json(client: &Client, url: &str, query: &[(&str, &str)]) -> Result<Value> {
    tracing::debug!(%url, "GET");
    let response = send(client.get(url).query(query), url).await?;
    parse_json(&response.text())
}
