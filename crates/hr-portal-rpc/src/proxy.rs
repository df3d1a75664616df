//! CORS forwarding proxy in front of the ERP backend.
//!
//! Every request is forwarded to the same path and query on the target with
//! its method, body, and end-to-end headers. The upstream status, content type,
//! and body come back unchanged; CORS headers are always the proxy's own.

use crate::server::{credentialed_cors, serve};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use hr_portal_core::NetworkConfig;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

/// Upper bound on requests forwarded at once.
const MAX_IN_FLIGHT: usize = 64;

/// Headers that belong to a single hop and are never forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Shared proxy state.
pub struct ProxyState {
    client: reqwest::Client,
    target: Url,
}

impl ProxyState {
    pub fn new(target: Url) -> anyhow::Result<Self> {
        Self::with_timeout(target, NetworkConfig::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(target: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, target })
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    fn upstream_url(&self, uri: &Uri) -> Result<Url, url::ParseError> {
        let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        self.target.join(path_and_query)
    }
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn is_cors_header(name: &HeaderName) -> bool {
    name.as_str().starts_with("access-control-")
}

fn forwardable(headers: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| keep(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn proxy_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({"error": "proxy error", "message": message.into()})),
    )
        .into_response()
}

/// Forward one request upstream.
async fn forward(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = match state.upstream_url(&uri) {
        Ok(url) => url,
        Err(e) => return proxy_error(format!("bad upstream path {}: {}", uri, e)),
    };
    info!("proxy {} {}", method, url);

    let upstream = state
        .client
        .request(method.clone(), url.clone())
        .headers(forwardable(&headers, |name| !is_hop_by_hop(name)))
        .body(body)
        .send()
        .await;

    let upstream = match upstream {
        Ok(response) => response,
        Err(e) => {
            warn!("proxy {} {} failed: {}", method, url, e);
            return proxy_error(e.to_string());
        }
    };

    let status = upstream.status();
    let response_headers = forwardable(upstream.headers(), |name| {
        !is_hop_by_hop(name) && !is_cors_header(name)
    });
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("proxy {} {} body read failed: {}", method, url, e);
            return proxy_error(e.to_string());
        }
    };
    info!("proxy {} {} -> {}", method, url, status.as_u16());

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    if !response.headers().contains_key(header::CONTENT_TYPE) {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
    }
    response
}

/// Build the proxy router. Preflight requests are answered by the CORS layer.
pub fn proxy_router(state: Arc<ProxyState>, allow_origin: &str) -> anyhow::Result<Router> {
    Ok(Router::new()
        .fallback(forward)
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(TraceLayer::new_for_http())
        .layer(credentialed_cors(allow_origin)?)
        .with_state(state))
}

/// Start the proxy.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_proxy(
    state: Arc<ProxyState>,
    host: &str,
    port: u16,
    allow_origin: &str,
) -> anyhow::Result<SocketAddr> {
    info!("Forwarding to {}", state.target());
    let app = proxy_router(state, allow_origin)?;
    serve(app, host, port, "proxy").await
}
