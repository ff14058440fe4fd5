//! HTTP transport for unary RPCs.
//!
//! Each call is sent as `POST {base_url}/{service}/{method}` with a JSON body.
//! Call metadata becomes request headers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::call::{Metadata, UnaryCall};
use super::error::RpcError;
use super::interceptor::UnaryFuture;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Terminal stage of the call pipeline: puts the call on the wire.
pub trait Transport: Send + Sync {
    fn unary(&self, call: UnaryCall) -> UnaryFuture<'_>;
}

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    initial_backoff: Duration,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the first rate-limit backoff delay; it doubles on each retry
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, call: &UnaryCall) -> String {
        format!("{}/{}", self.base_url, call.path())
    }

    fn headers(metadata: &Metadata) -> Result<HeaderMap, RpcError> {
        let mut headers = HeaderMap::new();
        for (key, value) in metadata.iter() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| RpcError::InvalidMetadata(key.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| RpcError::InvalidMetadata(key.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, RpcError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RpcError::from_status(status, &body))
        }
    }

    async fn parse_body(response: reqwest::Response) -> Result<Value, RpcError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            // An all-defaults message may come back as an empty body
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    async fn send(&self, call: UnaryCall) -> Result<Value, RpcError> {
        let url = self.url(&call);
        let headers = Self::headers(&call.metadata)?;
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(url = %url, "Dispatching unary call");
            let response = self
                .client
                .post(&url)
                .headers(headers.clone())
                .json(&call.input)
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Self::parse_body(response).await,
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(RpcError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }
}

impl Transport for HttpTransport {
    fn unary(&self, call: UnaryCall) -> UnaryFuture<'_> {
        Box::pin(self.send(call))
    }
}
