//! Mock ERP endpoint handlers.

use crate::server::BackendState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use hr_portal_core::rpc::decode_call;
use hr_portal_core::session::is_dev_credentials;
use hr_portal_core::{PortalError, RpcRequest, RpcResponse, Session};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Error code for refused credentials.
const AUTH_FAILED_CODE: i64 = -32001;

/// Health check endpoint.
pub async fn handle_health(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    let sessions = state.sessions.read().await.len();
    Json(json!({"status": "ok", "sessions": sessions}))
}

/// `POST /web/session/authenticate`
pub async fn handle_authenticate(
    State(state): State<Arc<BackendState>>,
    Json(request): Json<RpcRequest>,
) -> impl IntoResponse {
    let params = &request.params;
    let login = params.get("login").and_then(Value::as_str).unwrap_or_default();
    let password = params
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let database = params
        .get("db")
        .and_then(Value::as_str)
        .unwrap_or(&state.database);

    if !is_dev_credentials(login, password) {
        warn!("Refused login for '{}'", login);
        return (
            StatusCode::UNAUTHORIZED,
            Json(RpcResponse::error(
                request.id,
                AUTH_FAILED_CODE,
                "authentication failed",
            )),
        );
    }

    let session = Session {
        session_id: format!("mock_session_{}", Uuid::new_v4().simple()),
        ..Session::development(database)
    };
    info!("Login for '{}' in {} (uid {})", login, database, session.uid);

    let result = session.to_auth_result();
    state
        .sessions
        .write()
        .await
        .insert(session.session_id.clone(), session);

    (StatusCode::OK, Json(RpcResponse::success(request.id, result)))
}

/// `POST /web/session/destroy`
///
/// Always succeeds; drops the session named by the cookie if there is one.
pub async fn handle_destroy(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    request: Option<Json<RpcRequest>>,
) -> impl IntoResponse {
    let id = request.map(|Json(r)| r.id).unwrap_or(Value::Null);

    if let Some(session_id) = session_cookie(&headers) {
        if state.sessions.write().await.remove(&session_id).is_some() {
            info!("Session {} destroyed", session_id);
        }
    }

    Json(RpcResponse::success(id, Value::Bool(true)))
}

/// `GET /web/database/list`
pub async fn handle_database_list(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    Json(json!([state.database]))
}

/// `POST /web/dataset/call_kw`
pub async fn handle_call_kw(
    State(state): State<Arc<BackendState>>,
    Json(request): Json<RpcRequest>,
) -> impl IntoResponse {
    let id = request.id.clone();

    let result = match decode_call(&request.params) {
        Ok(call) => {
            info!("call_kw {}.{}", call.model(), call.method());
            debug!("args={:?} kwargs={:?}", call.args(), call.kwargs());
            state.backend.lock().await.resolve(&call)
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(value) => Json(RpcResponse::success(id, value.into_value())),
        Err(e) => {
            error!("call_kw failed: {}", e);
            Json(RpcResponse::from_error(id, &e))
        }
    }
}

/// `session_id` value from the Cookie header.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "session_id")
        .map(|(_, value)| value.to_string())
}

/// Fallback for unknown routes under the backend.
pub async fn handle_not_found() -> impl IntoResponse {
    let err = PortalError::Other("no such endpoint".to_string());
    (
        StatusCode::NOT_FOUND,
        Json(RpcResponse::from_error(Value::Null, &err)),
    )
}
