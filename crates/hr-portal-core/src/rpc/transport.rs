//! HTTP transport for ERP endpoints.
//!
//! Wraps reqwest with:
//! - a fixed request timeout, reported as `Transport { reason: "timeout" }`
//! - JSON content-type/accept headers and a user agent
//! - the session cookie when a session is active
//!
//! Non-2xx responses are only passed through when the body is an RPC error
//! envelope; everything else becomes a transport failure.

use crate::config::NetworkConfig;
use crate::session::Session;
use crate::{PortalError, Result};
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Sends JSON bodies to ERP endpoint paths.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the decoded JSON response body.
    async fn post_json(&self, path: &str, body: &Value, session: Option<&Session>)
        -> Result<Value>;

    /// GET a path and return the decoded JSON response body.
    async fn get_json(&self, path: &str, session: Option<&Session>) -> Result<Value>;
}

/// reqwest-backed transport bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default timeout.
    pub fn new(base_url: Url) -> Result<Self> {
        Self::with_timeout(base_url, NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom timeout.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(NetworkConfig::CONTENT_TYPE),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(NetworkConfig::CONTENT_TYPE),
        );

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| PortalError::Config {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| PortalError::Config {
            message: format!("Invalid endpoint path {}: {}", path, e),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, session: Option<&Session>) -> Result<Value> {
        let request = match session {
            Some(session) if !session.session_id.is_empty() => request.header(
                header::COOKIE,
                format!("session_id={}", session.session_id),
            ),
            _ => request,
        };

        let response = request.send().await?;
        read_body(response).await
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        session: Option<&Session>,
    ) -> Result<Value> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        self.send(self.client.post(url).json(body), session).await
    }

    async fn get_json(&self, path: &str, session: Option<&Session>) -> Result<Value> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        self.send(self.client.get(url), session).await
    }
}

/// Turn a response into a JSON body or a transport failure.
async fn read_body(response: Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().clone();
    let text = response.text().await?;

    if status.is_success() {
        return serde_json::from_str(&text).map_err(|e| PortalError::Transport {
            reason: format!("invalid JSON from {}: {}", url, e),
            status: Some(status.as_u16()),
        });
    }

    // A reachable backend may reject with a proper error envelope (e.g. 401 on login).
    if let Ok(body) = serde_json::from_str::<Value>(&text) {
        if body.get("error").is_some_and(Value::is_object) {
            debug!("{} returned {} with an error envelope", url, status);
            return Ok(body);
        }
    }

    Err(PortalError::Transport {
        reason: format!("HTTP {} from {}", status, url),
        status: Some(status.as_u16()),
    })
}
