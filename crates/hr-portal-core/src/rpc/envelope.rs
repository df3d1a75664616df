//! JSON-RPC envelope types and codec.
//!
//! ```text
//! request:  {"jsonrpc": "2.0", "method": "call",
//!            "params": {"model", "method", "args", "kwargs"}, "id": <token>}
//! response: {"jsonrpc": "2.0", "id": <token>, "result": ...}
//!         | {"jsonrpc": "2.0", "id": <token>, "error": {"message": ...}}
//! ```

use crate::models::{CallDescriptor, ModelMethod};
use crate::{PortalError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

pub const JSONRPC_VERSION: &str = "2.0";
pub const CALL_METHOD: &str = "call";
const DEFAULT_ERROR_MESSAGE: &str = "RPC call failed";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

impl RpcRequest {
    /// Create a `call` request carrying `params`.
    pub fn call(params: Value, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: CALL_METHOD.to_string(),
            params,
            id: Value::from(id),
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
    #[serde(default)]
    pub id: Value,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcErrorBody {
                code: Some(code),
                message: Some(message.into()),
                data: None,
            }),
            id,
        }
    }

    /// Error response built from a portal error.
    pub fn from_error(id: Value, err: &PortalError) -> Self {
        let message = match err {
            PortalError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::error(id, err.to_rpc_error_code(), message)
    }
}

/// JSON-RPC error object. The ERP fills `data` with a debug payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorBody {
    /// Best available human-readable message.
    pub fn message(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| {
                self.data
                    .as_ref()
                    .and_then(|d| d.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
    }
}

/// Request encoder with a per-client correlation counter.
///
/// Ids are never matched against pending requests; they only help reading logs.
#[derive(Debug)]
pub struct RpcCodec {
    next_id: AtomicU64,
}

impl Default for RpcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcCodec {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Wrap a model method call.
    pub fn encode_call(&self, call: &CallDescriptor) -> RpcRequest {
        let params = json!({
            "model": call.model(),
            "method": call.method().as_str(),
            "args": call.args(),
            "kwargs": call.kwargs(),
        });
        RpcRequest::call(params, self.next_id())
    }

    /// Wrap arbitrary params (session endpoints).
    pub fn encode_params(&self, params: Value) -> RpcRequest {
        RpcRequest::call(params, self.next_id())
    }
}

/// Rebuild a call descriptor from `call_kw` params (server side of `encode_call`).
///
/// Missing `args`/`kwargs` default to empty; the result is validated.
pub fn decode_call(params: &Value) -> Result<CallDescriptor> {
    let model = params
        .get("model")
        .and_then(Value::as_str)
        .ok_or_else(|| PortalError::validation("model", "missing model name"))?;
    let method = params
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| PortalError::validation("method", "missing method name"))?;
    let args = match params.get("args") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(args)) => args.clone(),
        Some(_) => return Err(PortalError::validation("args", "expected a list")),
    };
    let kwargs = match params.get("kwargs") {
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(Value::Object(kwargs)) => kwargs.clone(),
        Some(_) => return Err(PortalError::validation("kwargs", "expected a mapping")),
    };

    let call = CallDescriptor::new(model, ModelMethod::parse(method), args, kwargs);
    call.validate()?;
    Ok(call)
}

/// Unwrap a response envelope.
///
/// An `error` member wins over everything else; `result` is returned untouched.
pub fn decode_response(response: RpcResponse) -> Result<Value> {
    if let Some(error) = response.error {
        return Err(PortalError::Rpc {
            message: error.message(),
            code: error.code,
        });
    }
    Ok(response.result.unwrap_or(Value::Null))
}

/// Unwrap a raw JSON body as a response envelope.
pub fn decode_value(body: Value) -> Result<Value> {
    if !body.is_object() {
        return Err(PortalError::transport(format!(
            "malformed response envelope: {}",
            body
        )));
    }
    let response: RpcResponse = serde_json::from_value(body)
        .map_err(|e| PortalError::transport(format!("malformed response envelope: {}", e)))?;
    decode_response(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchParams;

    #[test]
    fn test_encode_call_envelope() {
        let codec = RpcCodec::new();
        let call = CallDescriptor::unlink("hr.employee", &[3, 4]);
        let request = serde_json::to_value(codec.encode_call(&call)).unwrap();

        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["method"], "call");
        assert_eq!(request["params"]["model"], "hr.employee");
        assert_eq!(request["params"]["method"], "unlink");
        assert_eq!(request["params"]["args"], json!([[3, 4]]));
        assert_eq!(request["params"]["kwargs"], json!({}));
        assert!(request["id"].is_u64());
    }

    #[test]
    fn test_correlation_ids_advance() {
        let codec = RpcCodec::new();
        let call = CallDescriptor::search_read("hr.employee", &SearchParams::new());
        let first = codec.encode_call(&call).id;
        let second = codec.encode_params(json!({})).id;
        assert_ne!(first, second);
    }

    #[test]
    fn test_decode_call_mirrors_encode_call() {
        let codec = RpcCodec::new();
        let call = CallDescriptor::write(
            "hr.employee",
            &[1],
            json!({"name": "A"}).as_object().cloned().unwrap(),
        );
        let request = codec.encode_call(&call);

        assert_eq!(decode_call(&request.params).unwrap(), call);
    }

    #[test]
    fn test_decode_call_rejects_malformed_params() {
        assert!(decode_call(&json!({"method": "search_read"})).is_err());
        assert!(decode_call(&json!({"model": "hr.employee"})).is_err());
        assert!(decode_call(&json!({"model": "hr.employee", "method": "read", "args": {}})).is_err());

        let minimal = decode_call(&json!({"model": "hr.employee", "method": "search_read"})).unwrap();
        assert!(minimal.args().is_empty());
        assert!(minimal.kwargs().is_empty());
    }

    #[test]
    fn test_decode_error_wins_over_result() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [1, 2],
            "error": {"code": 200, "message": "Odoo Server Error"}
        });
        match decode_value(body) {
            Err(PortalError::Rpc { message, code }) => {
                assert_eq!(message, "Odoo Server Error");
                assert_eq!(code, Some(200));
            }
            other => panic!("Expected Rpc error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_message_fallbacks() {
        let from_data = json!({"error": {"data": {"message": "Access Denied"}}});
        assert!(matches!(
            decode_value(from_data),
            Err(PortalError::Rpc { message, .. }) if message == "Access Denied"
        ));

        let bare = json!({"error": {}});
        assert!(matches!(
            decode_value(bare),
            Err(PortalError::Rpc { message, .. }) if message == "RPC call failed"
        ));
    }

    #[test]
    fn test_decode_result_untouched() {
        let body = json!({"jsonrpc": "2.0", "id": 9, "result": {"anything": [true]}});
        assert_eq!(decode_value(body).unwrap(), json!({"anything": [true]}));

        let empty = json!({"jsonrpc": "2.0", "id": 9});
        assert_eq!(decode_value(empty).unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_non_envelope_is_transport_failure() {
        let err = decode_value(json!(["odoo_hr"])).unwrap_err();
        assert!(err.is_transport_failure());
    }

    #[test]
    fn test_error_response_serialization() {
        let resp = RpcResponse::error(json!(1), -32602, "bad args");
        let json = serde_json::to_string(&resp).unwrap();

        assert!(!json.contains("\"result\""));
        assert!(json.contains("\"error\""));
        assert!(json.contains("-32602"));
    }
}
