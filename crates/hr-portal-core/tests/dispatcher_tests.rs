//! Dispatch policy tests against a scripted transport.
//!
//! These tests pin down when development data may stand in for the backend:
//! only in fallback mode, and only when no response envelope exists.

use hr_portal_core::mock::MockBackend;
use hr_portal_core::{
    CallDescriptor, CallResult, ClientConfig, DispatchMode, Dispatcher, HrApi, MockDatasetStore,
    PortalError, Record, Result, SearchParams, Session, Transport,
};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&str, &Value) -> Result<Value> + Send + Sync>;

/// Transport double that records every request and answers via a closure.
struct ScriptedTransport {
    respond: Responder,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Value, Option<Session>)>>,
}

impl ScriptedTransport {
    fn new(respond: impl Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn unreachable() -> Arc<Self> {
        Self::new(|_, _| Err(PortalError::transport("connection refused")))
    }

    fn rpc_error(message: &'static str) -> Arc<Self> {
        Self::new(move |_, body| {
            Ok(json!({"jsonrpc": "2.0", "id": body["id"], "error": {"code": 200, "message": message}}))
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> (String, Value, Option<Session>) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post_json(&self, path: &str, body: &Value, session: Option<&Session>) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone(), session.cloned()));
        (self.respond)(path, body)
    }

    async fn get_json(&self, path: &str, session: Option<&Session>) -> Result<Value> {
        self.post_json(path, &Value::Null, session).await
    }
}

fn fallback_config() -> ClientConfig {
    ClientConfig::direct("http://localhost:8069").unwrap()
}

fn strict_config() -> ClientConfig {
    ClientConfig::proxied("http://localhost:8069", "http://localhost:8070").unwrap()
}

fn values(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_fallback_serves_dataset_when_unreachable() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport.clone());

    let employees = dispatcher
        .search_read("hr.employee", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(employees.len(), 5);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_fallback_on_timeout() {
    let transport = ScriptedTransport::new(|_, _| Err(PortalError::transport("timeout")));
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport);

    let departments = dispatcher
        .search_read("hr.department", &SearchParams::new())
        .await
        .unwrap();
    assert_eq!(departments.len(), 4);
}

#[tokio::test]
async fn test_fallback_never_masks_rpc_error() {
    let transport = ScriptedTransport::rpc_error("Access Denied");
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport);
    assert_eq!(dispatcher.mode(), DispatchMode::Fallback);

    let err = dispatcher
        .search_read("hr.employee", &SearchParams::new())
        .await
        .unwrap_err();

    match err {
        PortalError::Rpc { message, code } => {
            assert_eq!(message, "Access Denied");
            assert_eq!(code, Some(200));
        }
        other => panic!("Expected Rpc error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_strict_propagates_transport_failure() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(strict_config(), transport.clone());

    let err = dispatcher
        .search_read("hr.employee", &SearchParams::new())
        .await
        .unwrap_err();

    assert!(err.is_transport_failure());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_fallback_dev_login_skips_transport() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport.clone());

    let session = dispatcher.login("admin", "admin").await.unwrap();

    assert_eq!(session.uid, 1);
    assert_eq!(transport.calls(), 0);
    assert_eq!(dispatcher.session().await, Some(session));
}

#[tokio::test]
async fn test_strict_dev_login_goes_to_backend() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(strict_config(), transport.clone());

    let err = dispatcher.login("admin", "admin").await.unwrap_err();

    assert!(err.is_transport_failure());
    assert_eq!(transport.calls(), 1);
    assert_eq!(dispatcher.session().await, None);
}

#[tokio::test]
async fn test_fallback_login_failure_is_not_masked() {
    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());
    assert!(dispatcher
        .login("admin", "wrong")
        .await
        .unwrap_err()
        .is_transport_failure());

    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::rpc_error("bad credentials"));
    assert!(dispatcher.login("lee", "secret").await.unwrap_err().is_rpc_error());
    assert_eq!(dispatcher.session().await, None);
}

#[tokio::test]
async fn test_login_stores_backend_session() {
    let transport = ScriptedTransport::new(|path, body| {
        if path == "/web/session/authenticate" {
            assert_eq!(body["params"]["db"], "odoo_hr");
            assert_eq!(body["params"]["login"], "lee");
            return Ok(json!({
                "jsonrpc": "2.0",
                "id": body["id"],
                "result": {"uid": 7, "session_id": "abc", "username": "lee", "db": "odoo_hr"}
            }));
        }
        Ok(json!({"jsonrpc": "2.0", "id": body["id"], "result": []}))
    });
    let dispatcher = Dispatcher::with_transport(strict_config(), transport.clone());

    let session = dispatcher.login("lee", "secret").await.unwrap();
    assert_eq!(session.uid, 7);
    assert_eq!(session.session_id, "abc");

    dispatcher
        .search_read("hr.employee", &SearchParams::new())
        .await
        .unwrap();
    let (path, _, sent_session) = transport.last_request();
    assert_eq!(path, "/web/dataset/call_kw");
    assert_eq!(sent_session.map(|s| s.session_id), Some("abc".to_string()));
}

#[tokio::test]
async fn test_login_without_uid_is_refused() {
    let transport = ScriptedTransport::new(|_, body| {
        Ok(json!({"jsonrpc": "2.0", "id": body["id"], "result": {"uid": false}}))
    });
    let dispatcher = Dispatcher::with_transport(strict_config(), transport);

    assert!(dispatcher.login("lee", "nope").await.unwrap_err().is_rpc_error());
}

#[tokio::test]
async fn test_fallback_unknown_model_reads_empty() {
    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());

    let records = dispatcher
        .search_read("x.y", &SearchParams::new())
        .await
        .unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_fallback_create_is_monotonic_per_model() {
    let mut store = MockDatasetStore::new();
    store.load(
        "hr.employee",
        [1, 2, 5]
            .iter()
            .map(|id| Record::with_id(*id, &Map::new()))
            .collect(),
    );
    let dispatcher = Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable())
        .with_mock(MockBackend::new(store));

    let id = dispatcher
        .create("hr.employee", values(json!({"name": "A"})))
        .await
        .unwrap();

    assert!(id > 5);
}

#[tokio::test]
async fn test_fallback_mutations_succeed() {
    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());

    assert!(dispatcher
        .write("hr.employee", &[1], values(json!({"job_title": "CTO"})))
        .await
        .unwrap());
    assert!(dispatcher.unlink("hr.employee", &[2]).await.unwrap());
    assert!(dispatcher.unlink("hr.employee", &[2]).await.unwrap());

    let employees = dispatcher
        .search_read("hr.employee", &SearchParams::new().with_fields(["job_title"]))
        .await
        .unwrap();
    assert_eq!(employees.len(), 4);
    assert_eq!(employees[0].get("job_title"), Some(&json!("CTO")));
}

#[tokio::test]
async fn test_validation_fails_before_network() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport.clone());

    let err = dispatcher
        .search_read("", &SearchParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Validation { .. }));

    let bad_write = CallDescriptor::custom("hr.employee", "write", vec![json!("1")], Map::new());
    assert!(matches!(
        dispatcher.dispatch(&bad_write).await,
        Err(PortalError::Validation { .. })
    ));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_remote_success_and_envelope_shape() {
    let transport = ScriptedTransport::new(|_, body| {
        Ok(json!({
            "jsonrpc": "2.0",
            "id": body["id"],
            "result": [{"id": 1, "name": "Kim Dev", "department_id": [1, "Engineering"]}]
        }))
    });
    let dispatcher = Dispatcher::with_transport(strict_config(), transport.clone());

    let employees = dispatcher
        .search_read("hr.employee", &SearchParams::new().with_fields(["name", "department_id"]))
        .await
        .unwrap();
    assert_eq!(employees[0].reference("department_id").unwrap().label, "Engineering");

    let (path, body, _) = transport.last_request();
    assert_eq!(path, "/web/dataset/call_kw");
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["method"], "call");
    assert_eq!(body["params"]["model"], "hr.employee");
    assert_eq!(body["params"]["method"], "search_read");
    assert_eq!(body["params"]["args"], json!([]));
    assert_eq!(body["params"]["kwargs"]["fields"], json!(["name", "department_id"]));
}

#[tokio::test]
async fn test_custom_read_same_shape_remote_and_fallback() {
    let remote = ScriptedTransport::new(|_, body| {
        Ok(json!({
            "jsonrpc": "2.0",
            "id": body["id"],
            "result": [{"id": 1, "name": "Administrator", "login": "admin"}]
        }))
    });
    let online = Dispatcher::with_transport(strict_config(), remote);
    let offline = Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());

    let kwargs = values(json!({"fields": ["name", "login"]}));
    let from_backend = online
        .call_kw("res.users", "read", vec![json!([1])], kwargs.clone())
        .await
        .unwrap();
    let from_dataset = offline
        .call_kw("res.users", "read", vec![json!([1])], kwargs)
        .await
        .unwrap();

    assert!(matches!(from_backend, CallResult::Records(_)));
    assert_eq!(from_backend, from_dataset);
}

#[tokio::test]
async fn test_remote_wrong_shape_is_not_masked() {
    let transport = ScriptedTransport::new(|_, body| {
        Ok(json!({"jsonrpc": "2.0", "id": body["id"], "result": "nope"}))
    });
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport);

    let err = dispatcher.unlink("hr.employee", &[1]).await.unwrap_err();
    assert!(matches!(err, PortalError::Json { .. }));
}

#[tokio::test]
async fn test_logout_clears_session_even_on_failure() {
    let transport = ScriptedTransport::unreachable();
    let dispatcher = Dispatcher::with_transport(fallback_config(), transport.clone());
    dispatcher.login("admin", "admin").await.unwrap();

    dispatcher.logout().await;

    assert_eq!(dispatcher.session().await, None);
    let (path, _, session) = transport.last_request();
    assert_eq!(path, "/web/session/destroy");
    assert!(session.is_some());
}

#[tokio::test]
async fn test_list_databases_accepts_both_shapes() {
    let bare = ScriptedTransport::new(|_, _| Ok(json!(["odoo_hr"])));
    let dispatcher = Dispatcher::with_transport(strict_config(), bare);
    assert_eq!(dispatcher.list_databases().await.unwrap(), vec!["odoo_hr"]);
    assert!(dispatcher.check_connection().await);

    let enveloped = ScriptedTransport::new(|_, _| Ok(json!({"jsonrpc": "2.0", "id": 1, "result": ["a", "b"]})));
    let dispatcher = Dispatcher::with_transport(strict_config(), enveloped);
    assert_eq!(dispatcher.list_databases().await.unwrap(), vec!["a", "b"]);

    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());
    assert!(!dispatcher.check_connection().await);
}

#[tokio::test]
async fn test_concurrent_fallback_creates_get_distinct_ids() {
    let dispatcher = Arc::new(Dispatcher::with_transport(
        fallback_config(),
        ScriptedTransport::unreachable(),
    ));

    let creates = (0..10).map(|i| {
        let dispatcher = dispatcher.clone();
        async move {
            dispatcher
                .create("hr.employee", values(json!({"name": format!("N{}", i)})))
                .await
                .unwrap()
        }
    });
    let mut ids = futures::future::join_all(creates).await;

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 10);
    assert!(ids.iter().all(|id| *id > 5));
}

#[tokio::test]
async fn test_hr_api_over_fallback() {
    let dispatcher =
        Dispatcher::with_transport(fallback_config(), ScriptedTransport::unreachable());
    let hr = HrApi::new(&dispatcher);

    assert_eq!(hr.current_user().await.unwrap(), None);
    dispatcher.login("admin", "admin").await.unwrap();
    let user = hr.current_user().await.unwrap().unwrap();
    assert_eq!(user.get("login"), Some(&json!("admin")));

    let attendance = hr.attendance(Some(1)).await.unwrap();
    assert_eq!(attendance.len(), 1);
    assert_eq!(attendance[0].reference("employee_id").unwrap().id, 1);

    let id = hr
        .create_employee(values(json!({"name": "New Hire"})))
        .await
        .unwrap();
    assert!(hr.update_employee(id, values(json!({"job_title": "Intern"}))).await.unwrap());
    assert!(hr.delete_employee(id).await.unwrap());

    assert_eq!(hr.check_in(1).await.unwrap(), CallResult::Value(json!(true)));
    assert_eq!(hr.payslips().await.unwrap().len(), 3);
}
