//! HTTP layer: status mapping and retry.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shelf_core::{ListError, ListResult};
use tracing::{debug, warn};
use url::Url;

use crate::types::CatalogConfig;

/// Cap for server-provided retry-after and computed backoff.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// A failed attempt, with the server's retry-after hint if it sent one.
#[derive(Debug)]
struct Failure {
    error: ListError,
    retry_after: Option<Duration>,
}

impl From<ListError> for Failure {
    fn from(error: ListError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

/// Map a reqwest transport error.
pub(crate) fn transport_error(err: reqwest::Error) -> ListError {
    if err.is_decode() {
        return ListError::InvalidResponse {
            message: err.to_string(),
        };
    }
    ListError::network(err.to_string())
}

/// HTTP backend for making requests (holds reqwest client and config).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) config: CatalogConfig,
}

impl HttpBackend {
    /// GET `url` and decode a JSON body, retrying transient failures.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> ListResult<T> {
        let response = self.get(url).await?;
        let body = response.text().await.map_err(transport_error)?;

        serde_json::from_str(&body).map_err(|e| ListError::InvalidResponse {
            message: format!("failed to parse response from {}: {}", url.path(), e),
        })
    }

    async fn get(&self, url: &Url) -> ListResult<reqwest::Response> {
        use rand::Rng;

        let mut retries = 0;
        let max_retries = self.config.max_retries;

        loop {
            match self.get_once(url).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.error.is_retryable() && retries < max_retries => {
                    retries += 1;

                    let backoff = match failure.retry_after {
                        Some(retry_after) => {
                            let capped = retry_after.min(MAX_BACKOFF);
                            let jitter_factor: f64 =
                                rand::thread_rng().gen_range(0.9_f64..=1.1_f64);
                            let jittered_ms =
                                ((capped.as_millis() as f64) * jitter_factor).round() as u64;
                            Duration::from_millis(jittered_ms.max(100))
                        }
                        None => {
                            let base = exponential_backoff(self.config.backoff_base_ms, retries);
                            let jittered_ms =
                                rand::thread_rng().gen_range(0..=base.as_millis() as u64);
                            Duration::from_millis(jittered_ms.max(10))
                        }
                    };

                    warn!(
                        error = %failure.error,
                        retry = retries,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying request"
                    );

                    tokio::time::sleep(backoff).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn get_once(&self, url: &Url) -> Result<reqwest::Response, Failure> {
        debug!(url = %url.path(), "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(ListError::not_found(url.path().to_string()).into()),

            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs);

                Err(Failure {
                    error: ListError::backend(Some(429), "rate limited"),
                    retry_after,
                })
            }

            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = error_message(&body).unwrap_or_else(|| status.to_string());
                Err(ListError::backend(Some(status.as_u16()), message).into())
            }
        }
    }
}

/// Pull `error.message` out of a JSON error body, or the first 200 chars of
/// a plain one.
fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return Some(message.to_string());
        }
    }
    Some(body.chars().take(200).collect())
}

/// `base_ms * 2^retries`, capped at `MAX_BACKOFF`.
fn exponential_backoff(base_ms: u64, retries: u32) -> Duration {
    let factor = 1u64.checked_shl(retries).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_BACKOFF)
}
