//! HTTP client for the streaming coach endpoint.

use std::pin::Pin;

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::config::CoachConfig;
use crate::error::{Error, Result};
use crate::observability;
use crate::sse::{StreamEvent, process_sse};
use crate::types::{ChatRequest, Turn};

/// Path of the streaming completion endpoint, relative to the base URL.
const COACH_ENDPOINT: &str = "functions/v1/ai-coach";

/// A pinned, boxed stream of decoded events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// The transport seam used by [`CoachSession`](crate::CoachSession).
///
/// [`CoachClient`] is the production implementation; tests substitute
/// scripted transports to exercise the exchange loop without a network.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Open a streaming completion request carrying the full turn history.
    async fn stream_completion(&self, history: &[Turn]) -> Result<EventStream>;
}

/// Client for the LevelUp coach backend.
#[derive(Debug, Clone)]
pub struct CoachClient {
    config: CoachConfig,
    client: ReqwestClient,
}

impl CoachClient {
    /// Create a new client from a configuration.
    pub fn new(config: CoachConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self { config, client })
    }

    /// Create a new client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(CoachConfig::from_env()?)
    }

    /// Create and return default headers for coach requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        let bearer = format!("Bearer {}", self.config.api_key());
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| {
                Error::config(
                    format!("publishable key is not a valid header value: {e}"),
                    Some("api_key".to_string()),
                )
            })?,
        );
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse error response body
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
            message: Option<String>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed_error = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let error_message = parsed_error
            .as_ref()
            .and_then(|e| {
                e.error
                    .as_ref()
                    .and_then(|detail| detail.message.clone())
                    .or_else(|| e.message.clone())
            })
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            429 => Error::rate_limit(error_message, retry_after),
            402 => Error::credits_exhausted(error_message),
            _ => Error::api(status_code, error_message, request_id),
        }
    }

    /// Open a streaming completion request and decode the response.
    ///
    /// Returns a stream of [`StreamEvent`]s that can be consumed
    /// incrementally. A non-success status is classified before any event
    /// is produced.
    pub async fn stream(&self, history: &[Turn]) -> Result<EventStream> {
        let url = format!("{}{}", self.config.base_url(), COACH_ENDPOINT);
        let body = ChatRequest::new(history);

        observability::CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {e}"),
                        Some(self.config.timeout().as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        let stream = response.bytes_stream();
        Ok(Box::pin(process_sse(stream)))
    }
}

#[async_trait::async_trait]
impl ChatTransport for CoachClient {
    async fn stream_completion(&self, history: &[Turn]) -> Result<EventStream> {
        self.stream(history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CoachConfig {
        CoachConfig::new("https://backend.example.com", "pk_test").unwrap()
    }

    #[test]
    fn client_creation() {
        let client = CoachClient::new(test_config()).unwrap();
        assert_eq!(client.config.base_url(), "https://backend.example.com/");
        assert_eq!(client.config.api_key(), "pk_test");
    }

    #[test]
    fn headers_carry_bearer_key() {
        let client = CoachClient::new(test_config()).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer pk_test"
        );
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "text/event-stream");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = CoachClient::new(test_config()).unwrap();
        let url = format!("{}{}", client.config.base_url(), COACH_ENDPOINT);
        assert_eq!(
            url,
            "https://backend.example.com/functions/v1/ai-coach"
        );
    }
}
