//! Shared HTTP plumbing: client construction and GET helpers.

use std::time::Duration;

use crate::error::SourceError;

/// Build a client with the given request timeout.
///
/// # Errors
///
/// Returns [`SourceError::Client`] if the TLS backend fails to initialise.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("emoteguess/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SourceError::Client(e.to_string()))
}

/// Send `request` and return the body as text, failing on non-2xx.
pub(crate) async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, SourceError> {
    checked_send(request)
        .await?
        .text()
        .await
        .map_err(|e| SourceError::Network(format!("body read failed: {e}")))
}

async fn checked_send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, SourceError> {
    let response = request
        .send()
        .await
        .map_err(|e| SourceError::Network(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Network(format!(
            "{} returned {status}",
            response.url()
        )));
    }

    Ok(response)
}

/// Send `request` and decode the body as JSON, failing on non-2xx.
pub(crate) async fn fetch_json(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, SourceError> {
    checked_send(request)
        .await?
        .json::<serde_json::Value>()
        .await
        .map_err(|e| SourceError::Network(format!("response parse failed: {e}")))
}
