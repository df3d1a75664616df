//! Mock ERP backend server using Axum.

use crate::handler::{
    handle_authenticate, handle_call_kw, handle_database_list, handle_destroy, handle_health,
    handle_not_found,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use hr_portal_core::{DevConfig, Endpoints, MockBackend, Session};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// State shared across backend handlers.
pub struct BackendState {
    /// Seeded HR dataset
    pub backend: Mutex<MockBackend>,
    /// Sessions handed out by authenticate, keyed by session id
    pub sessions: RwLock<HashMap<String, Session>>,
    /// Database name reported by the list endpoint
    pub database: String,
}

impl BackendState {
    pub fn new(backend: MockBackend, database: impl Into<String>) -> Self {
        Self {
            backend: Mutex::new(backend),
            sessions: RwLock::new(HashMap::new()),
            database: database.into(),
        }
    }

    /// State over the seeded development dataset.
    pub fn seeded() -> Self {
        Self::new(MockBackend::seeded(), DevConfig::DATABASE)
    }
}

/// CORS for a single browser origin with credentials.
///
/// Credentialed CORS cannot use wildcards, so methods and headers are listed.
pub fn credentialed_cors(allow_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(allow_origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::HeaderName::from_static("x-requested-with"),
        ]))
}

/// Build the backend router.
pub fn backend_router(state: Arc<BackendState>, allow_origin: &str) -> anyhow::Result<Router> {
    Ok(Router::new()
        .route("/health", get(handle_health))
        .route(Endpoints::AUTHENTICATE, post(handle_authenticate))
        .route(Endpoints::DESTROY, post(handle_destroy))
        .route(Endpoints::DATABASE_LIST, get(handle_database_list).post(handle_database_list))
        .route(Endpoints::CALL_KW, post(handle_call_kw))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(credentialed_cors(allow_origin)?)
        .with_state(state))
}

/// Start the mock backend.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_backend(
    state: Arc<BackendState>,
    host: &str,
    port: u16,
    allow_origin: &str,
) -> anyhow::Result<SocketAddr> {
    let app = backend_router(state, allow_origin)?;
    serve(app, host, port, "mock backend").await
}

/// Bind `host:port` and serve `app` in the background.
pub(crate) async fn serve(
    app: Router,
    host: &str,
    port: u16,
    name: &'static str,
) -> anyhow::Result<SocketAddr> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("{} listening on {}", name, actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("{} stopped: {}", name, e);
        }
    });

    Ok(actual_addr)
}
