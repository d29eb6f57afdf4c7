//! JSON-over-HTTP transport to a Convex peer.
//!
//! The SDK talks to the peer through the [`Transport`] trait. [`HttpTransport`]
//! is the production implementation built on hyper with rustls; tests and
//! offline tools use [`crate::net::mock::MockTransport`].

use crate::error::{Result, SdkError};
use crate::net::config::ClientConfig;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, StatusCode, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// Longest slice of a response body quoted in an error message.
const MAX_DIAGNOSTIC_LENGTH: usize = 200;

/// HTTP method enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET method
    Get,
    /// POST method
    Post,
}

impl HttpMethod {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One JSON round trip to the peer.
///
/// Implementations return the parsed response body on a success status and
/// a transport error otherwise. They never inspect `errorCode`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, path: &str, body: Value) -> Result<Value>;

    async fn get(&self, path: &str) -> Result<Value>;
}

/// hyper-based transport with a per-request timeout.
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpTransport {
    /// Build a transport for the peer named in `config`.
    ///
    /// Call [`crate::init`] once at process start before creating one.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let https = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            base_url: config.peer_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            client,
        })
    }

    async fn request(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let uri =
            Uri::from_str(&url).map_err(|e| SdkError::Transport(format!("Invalid URL: {}", e)))?;

        let payload = match &body {
            Some(value) => Bytes::from(serde_json::to_vec(value)?),
            None => Bytes::new(),
        };

        let req = Request::builder()
            .uri(uri)
            .method(method.as_str())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(Full::new(payload))
            .map_err(|e| SdkError::Transport(format!("Failed to build request: {}", e)))?;

        tracing::debug!(method = method.as_str(), %url, "peer request");

        let exchange = async {
            let res = self
                .client
                .request(req)
                .await
                .map_err(|e| SdkError::Transport(format!("Request failed: {}", e)))?;

            let status = res.status();
            let bytes = res
                .into_body()
                .collect()
                .await
                .map_err(|e| SdkError::Transport(format!("Failed to read response body: {}", e)))?
                .to_bytes();

            Ok::<_, SdkError>((status, bytes))
        };

        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| SdkError::Timeout(self.timeout))??;

        parse_response(status, &bytes)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(HttpMethod::Get, path, None).await
    }
}

/// Turn a status and body into parsed JSON or a transport error.
pub(crate) fn parse_response(status: StatusCode, body: &[u8]) -> Result<Value> {
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "peer returned non-success status");
        return Err(SdkError::Transport(format!(
            "HTTP {}: {}",
            status.as_u16(),
            diagnostic(body)
        )));
    }

    serde_json::from_slice(body)
        .map_err(|e| SdkError::Transport(format!("Malformed JSON response: {}", e)))
}

/// Best-effort error text from a response body.
fn diagnostic(body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        for field in ["value", "error", "message", "errorCode"] {
            if let Some(Value::String(text)) = map.get(field) {
                return text.clone();
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_DIAGNOSTIC_LENGTH).collect()
}
