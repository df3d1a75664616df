//! Model method dispatcher.
//!
//! Routes every call through the envelope codec and transport. In fallback
//! mode a transport failure re-resolves the same call against the in-memory
//! dataset; RPC errors and validation errors always reach the caller.
//!
//! # Thread Safety
//!
//! The mock backend sits behind a tokio `Mutex` and the session behind a
//! `RwLock`; neither guard is held across a network await, so concurrent
//! dispatches interleave freely.

use crate::config::{ClientConfig, DispatchMode, Endpoints};
use crate::mock::MockBackend;
use crate::models::{CallDescriptor, CallResult, Record, SearchParams};
use crate::rpc::{decode_value, HttpTransport, RpcCodec, Transport};
use crate::session::{is_dev_credentials, Session};
use crate::{PortalError, Result};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Entry point for the UI collaborator.
pub struct Dispatcher {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    codec: RpcCodec,
    mock: Mutex<MockBackend>,
    session: RwLock<Option<Session>>,
}

impl Dispatcher {
    /// Dispatcher over HTTP with the seeded development dataset.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport =
            HttpTransport::with_timeout(config.endpoint().clone(), config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Dispatcher over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        info!(
            "Dispatcher ready: endpoint={} mode={}",
            config.endpoint(),
            config.mode()
        );
        Self {
            config,
            transport,
            codec: RpcCodec::new(),
            mock: Mutex::new(MockBackend::seeded()),
            session: RwLock::new(None),
        }
    }

    /// Replace the fallback dataset.
    pub fn with_mock(mut self, backend: MockBackend) -> Self {
        self.mock = Mutex::new(backend);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn mode(&self) -> DispatchMode {
        self.config.mode()
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Run a call against the backend, falling back per the dispatch mode.
    pub async fn dispatch(&self, call: &CallDescriptor) -> Result<CallResult> {
        call.validate()?;
        debug!("Dispatch {}.{}", call.model(), call.method());

        match self.call_remote(call).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_transport_failure() && self.mode() == DispatchMode::Fallback => {
                warn!(
                    "{}.{} unreachable ({}), serving development data",
                    call.model(),
                    call.method(),
                    e
                );
                self.mock.lock().await.resolve(call)
            }
            Err(e) => {
                debug!("{}.{} failed: {}", call.model(), call.method(), e);
                Err(e)
            }
        }
    }

    async fn call_remote(&self, call: &CallDescriptor) -> Result<CallResult> {
        let request = self.codec.encode_call(call);
        let body = serde_json::to_value(&request)?;
        let session = self.session().await;

        let raw = self
            .transport
            .post_json(Endpoints::CALL_KW, &body, session.as_ref())
            .await?;
        let result = decode_value(raw)?;
        CallResult::from_raw(call.method(), result)
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    pub async fn search_read(&self, model: &str, params: &SearchParams) -> Result<Vec<Record>> {
        let call = CallDescriptor::search_read(model, params);
        let result = self.dispatch(&call).await?;
        result.into_records().ok_or_else(|| unexpected(&call))
    }

    pub async fn create(&self, model: &str, values: Map<String, Value>) -> Result<i64> {
        let call = CallDescriptor::create(model, values);
        let result = self.dispatch(&call).await?;
        result.created_id().ok_or_else(|| unexpected(&call))
    }

    pub async fn write(&self, model: &str, ids: &[i64], values: Map<String, Value>) -> Result<bool> {
        let call = CallDescriptor::write(model, ids, values);
        success_flag(&call, self.dispatch(&call).await?)
    }

    pub async fn unlink(&self, model: &str, ids: &[i64]) -> Result<bool> {
        let call = CallDescriptor::unlink(model, ids);
        success_flag(&call, self.dispatch(&call).await?)
    }

    /// Generic `call_kw` for custom actions.
    pub async fn call_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<CallResult> {
        self.dispatch(&CallDescriptor::custom(model, method, args, kwargs))
            .await
    }

    // ========================================================================
    // Session endpoints
    // ========================================================================

    /// Authenticate and store the resulting session.
    ///
    /// In fallback mode the development credentials succeed without any
    /// network activity. Authentication never falls back otherwise.
    pub async fn login(&self, login: &str, password: &str) -> Result<Session> {
        if login.trim().is_empty() {
            return Err(PortalError::validation("login", "login must not be empty"));
        }
        let database = self.config.database();

        if self.mode() == DispatchMode::Fallback && is_dev_credentials(login, password) {
            let session = Session::development(database);
            info!("Development login for {} (uid {})", login, session.uid);
            *self.session.write().await = Some(session.clone());
            return Ok(session);
        }

        let request = self.codec.encode_params(json!({
            "db": database,
            "login": login,
            "password": password,
        }));
        let body = serde_json::to_value(&request)?;
        let raw = self
            .transport
            .post_json(Endpoints::AUTHENTICATE, &body, None)
            .await?;
        let result = decode_value(raw)?;
        let session = Session::from_auth_result(&result, database, login)?;

        info!("Authenticated {} (uid {})", login, session.uid);
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Destroy the session. Always clears local state; failures are only logged.
    pub async fn logout(&self) {
        let session = self.session.write().await.take();
        let Some(session) = session else {
            return;
        };

        let request = self.codec.encode_params(json!({}));
        let outcome = match serde_json::to_value(&request) {
            Ok(body) => self
                .transport
                .post_json(Endpoints::DESTROY, &body, Some(&session))
                .await
                .and_then(decode_value),
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(_) => info!("Logged out uid {}", session.uid),
            Err(e) => warn!("Logout for uid {} failed: {}", session.uid, e),
        }
    }

    /// Database names reported by the backend.
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        let session = self.session().await;
        let raw = self
            .transport
            .get_json(Endpoints::DATABASE_LIST, session.as_ref())
            .await?;

        let list = if raw.is_array() { raw } else { decode_value(raw)? };
        let names = list.as_array().ok_or_else(|| PortalError::Json {
            message: format!("database list is not an array: {}", list),
            source: None,
        })?;

        Ok(names
            .iter()
            .filter_map(|name| name.as_str().map(str::to_string))
            .collect())
    }

    /// Liveness probe.
    pub async fn check_connection(&self) -> bool {
        match self.list_databases().await {
            Ok(_) => true,
            Err(e) => {
                warn!("Backend at {} unreachable: {}", self.config.endpoint(), e);
                false
            }
        }
    }
}

fn unexpected(call: &CallDescriptor) -> PortalError {
    PortalError::Other(format!(
        "{}.{} produced a result of the wrong shape",
        call.model(),
        call.method()
    ))
}

fn success_flag(call: &CallDescriptor, result: CallResult) -> Result<bool> {
    match result {
        CallResult::Success(flag) => Ok(flag),
        _ => Err(unexpected(call)),
    }
}
