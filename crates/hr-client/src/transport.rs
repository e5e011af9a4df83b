//! Transport abstraction and the production HTTP implementation.
//!
//! The executor only knows the [`Transport`] trait; tests substitute
//! scripted implementations, production uses [`HttpTransport`] over
//! reqwest. The transport reports failures as [`RawFailure`] values and
//! leaves classification to the caller.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::errors::RawFailure;

/// Upper bound on response-body text carried into error messages.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Outbound channel to the HR provider.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request and return the parsed JSON payload.
    async fn send(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, RawFailure>;
}

/// HTTP transport over reqwest with a static API credential.
///
/// The credential is supplied at process start and attached to every
/// outbound call; there is no refresh flow.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Create a transport for the given provider base URL.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: &str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Value, RawFailure> {
        let method = Method::from_str(method).map_err(|_| RawFailure::Unexpected {
            message: format!("invalid HTTP method: {}", method),
        })?;

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, params = params.len(), "provider request");

        let response = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RawFailure::Timeout
                } else {
                    RawFailure::Transport {
                        message: format!("request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok()),
            );

            let body = response.text().await.unwrap_or_default();
            return Err(failure_for_status(status, &body, retry_after));
        }

        response.json::<Value>().await.map_err(|e| {
            RawFailure::Unexpected {
                message: format!("failed to parse response body: {}", e),
            }
        })
    }
}

/// Build the raw failure for a non-success status.
fn failure_for_status(status: StatusCode, body: &str, retry_after: Option<Duration>) -> RawFailure {
    let mut message = body.trim().to_string();
    if message.is_empty() {
        message = status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    if message.len() > MAX_ERROR_BODY_LEN {
        // Truncate on a char boundary; provider bodies are not always ASCII.
        message = message.chars().take(MAX_ERROR_BODY_LEN).collect();
    }

    RawFailure::Status {
        code: status.as_u16(),
        message,
        retry_after,
    }
}

/// Numeric `Retry-After` values above this are read as milliseconds.
///
/// The provider sends delay-seconds, but some upstream proxies report the
/// wait in milliseconds. A delay-seconds value above this threshold would
/// mean a wait of over 16 minutes, which no sane provider advises, so
/// larger values are treated as milliseconds.
const RETRY_AFTER_MS_THRESHOLD: u64 = 1000;

/// Parse a `Retry-After` header value.
///
/// Accepts delay-seconds and millisecond forms (disambiguated by
/// magnitude); HTTP-date forms are ignored rather than guessed at.
fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let n = value?.trim().parse::<u64>().ok()?;

    if n > RETRY_AFTER_MS_THRESHOLD {
        Some(Duration::from_millis(n))
    } else {
        Some(Duration::from_secs(n))
    }
}
