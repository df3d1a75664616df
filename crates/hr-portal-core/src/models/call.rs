//! Call descriptors and result shapes for model method calls.

use super::record::Record;
use crate::{PortalError, Result};
use serde_json::{Map, Value};

/// The ERP model method being invoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelMethod {
    SearchRead,
    Create,
    Write,
    Unlink,
    /// Any other named action (`read`, `attendance_manual`, ...).
    Custom(String),
}

impl ModelMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ModelMethod::SearchRead => "search_read",
            ModelMethod::Create => "create",
            ModelMethod::Write => "write",
            ModelMethod::Unlink => "unlink",
            ModelMethod::Custom(name) => name,
        }
    }

    /// Parse a wire method name. Unknown names become `Custom`.
    pub fn parse(name: &str) -> Self {
        match name {
            "search_read" => ModelMethod::SearchRead,
            "create" => ModelMethod::Create,
            "write" => ModelMethod::Write,
            "unlink" => ModelMethod::Unlink,
            other => ModelMethod::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for ModelMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword arguments of a `search_read` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Domain terms, e.g. `[["employee_id", "=", 1]]`.
    pub domain: Vec<Value>,
    /// Fields to return; empty means all.
    pub fields: Vec<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            domain: Vec::new(),
            fields: Vec::new(),
            limit: Some(Self::DEFAULT_LIMIT),
            offset: 0,
        }
    }
}

impl SearchParams {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Vec<Value>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn to_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("domain".into(), Value::Array(self.domain.clone()));
        kwargs.insert(
            "fields".into(),
            Value::Array(self.fields.iter().cloned().map(Value::from).collect()),
        );
        kwargs.insert(
            "limit".into(),
            self.limit.map_or(Value::Bool(false), Value::from),
        );
        kwargs.insert("offset".into(), Value::from(self.offset));
        kwargs
    }

    /// Recover search parameters from a call's arguments.
    ///
    /// Keyword arguments win; a positional domain in `args[0]` is accepted too.
    /// A missing or non-numeric limit means "no limit".
    pub fn from_call(args: &[Value], kwargs: &Map<String, Value>) -> Self {
        let domain = kwargs
            .get("domain")
            .or_else(|| args.first())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let fields = kwargs
            .get("fields")
            .or_else(|| args.get(1))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        let limit = kwargs
            .get("limit")
            .and_then(Value::as_u64)
            .map(|l| l as usize);
        let offset = kwargs
            .get("offset")
            .and_then(Value::as_u64)
            .map_or(0, |o| o as usize);

        Self {
            domain,
            fields,
            limit,
            offset,
        }
    }
}

/// An immutable description of one model method call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    model: String,
    method: ModelMethod,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl CallDescriptor {
    pub fn new(
        model: impl Into<String>,
        method: ModelMethod,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self {
            model: model.into(),
            method,
            args,
            kwargs,
        }
    }

    pub fn search_read(model: impl Into<String>, params: &SearchParams) -> Self {
        Self::new(model, ModelMethod::SearchRead, Vec::new(), params.to_kwargs())
    }

    pub fn create(model: impl Into<String>, values: Map<String, Value>) -> Self {
        Self::new(
            model,
            ModelMethod::Create,
            vec![Value::Object(values)],
            Map::new(),
        )
    }

    pub fn write(model: impl Into<String>, ids: &[i64], values: Map<String, Value>) -> Self {
        Self::new(
            model,
            ModelMethod::Write,
            vec![ids_value(ids), Value::Object(values)],
            Map::new(),
        )
    }

    pub fn unlink(model: impl Into<String>, ids: &[i64]) -> Self {
        Self::new(model, ModelMethod::Unlink, vec![ids_value(ids)], Map::new())
    }

    pub fn custom(
        model: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self::new(model, ModelMethod::parse(&method.into()), args, kwargs)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn method(&self) -> &ModelMethod {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    pub fn search_params(&self) -> SearchParams {
        SearchParams::from_call(&self.args, &self.kwargs)
    }

    /// Check the descriptor before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(PortalError::validation("model", "model name must not be empty"));
        }
        if self.model.chars().any(char::is_whitespace) {
            return Err(PortalError::validation(
                "model",
                format!("model name must not contain whitespace: {:?}", self.model),
            ));
        }

        match &self.method {
            ModelMethod::SearchRead => Ok(()),
            ModelMethod::Create => self.values_arg(0).map(|_| ()),
            ModelMethod::Write => {
                self.ids_arg(0)?;
                self.values_arg(1).map(|_| ())
            }
            ModelMethod::Unlink => self.ids_arg(0).map(|_| ()),
            ModelMethod::Custom(name) if name.trim().is_empty() => Err(PortalError::validation(
                "method",
                "method name must not be empty",
            )),
            ModelMethod::Custom(_) => Ok(()),
        }
    }

    /// Positional argument `index` as a list of record ids.
    pub fn ids_arg(&self, index: usize) -> Result<Vec<i64>> {
        let field = format!("args[{}]", index);
        let ids = self
            .args
            .get(index)
            .and_then(Value::as_array)
            .ok_or_else(|| PortalError::validation(&field, "expected a list of record ids"))?;

        ids.iter()
            .map(|id| {
                id.as_i64().ok_or_else(|| {
                    PortalError::validation(&field, format!("record id must be an integer, got {}", id))
                })
            })
            .collect()
    }

    /// Positional argument `index` as a field/value mapping.
    pub fn values_arg(&self, index: usize) -> Result<&Map<String, Value>> {
        self.args
            .get(index)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                PortalError::validation(format!("args[{}]", index), "expected a field/value mapping")
            })
    }
}

fn ids_value(ids: &[i64]) -> Value {
    Value::Array(ids.iter().copied().map(Value::from).collect())
}

/// The outcome of a dispatched call. The variant is chosen by the method.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Records(Vec<Record>),
    Created(i64),
    Success(bool),
    Value(Value),
}

impl CallResult {
    /// Shape a raw `result` payload according to the method that produced it.
    pub fn from_raw(method: &ModelMethod, raw: Value) -> Result<Self> {
        match method {
            ModelMethod::SearchRead => records_from_raw(method, raw),
            ModelMethod::Create => match &raw {
                Value::Number(n) => n
                    .as_i64()
                    .map(CallResult::Created)
                    .ok_or_else(|| shape_error(method, "an integer id", &raw)),
                // Batch create returns a list of ids; a single-values call yields one.
                Value::Array(ids) if ids.len() == 1 => ids[0]
                    .as_i64()
                    .map(CallResult::Created)
                    .ok_or_else(|| shape_error(method, "an integer id", &raw)),
                _ => Err(shape_error(method, "an integer id", &raw)),
            },
            ModelMethod::Write | ModelMethod::Unlink => match raw {
                Value::Bool(flag) => Ok(CallResult::Success(flag)),
                other => Err(shape_error(method, "a boolean", &other)),
            },
            // `read` answers with records just like `search_read`.
            ModelMethod::Custom(name) if name == "read" => records_from_raw(method, raw),
            ModelMethod::Custom(_) => Ok(CallResult::Value(raw)),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            CallResult::Records(records) => {
                Value::Array(records.into_iter().map(Record::into_value).collect())
            }
            CallResult::Created(id) => Value::from(id),
            CallResult::Success(flag) => Value::Bool(flag),
            CallResult::Value(value) => value,
        }
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            CallResult::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            CallResult::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn created_id(&self) -> Option<i64> {
        match self {
            CallResult::Created(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(true))
    }
}

fn records_from_raw(method: &ModelMethod, raw: Value) -> Result<CallResult> {
    match raw {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(Record::from_map(map)),
                other => Err(shape_error(method, "record objects", &other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(CallResult::Records),
        other => Err(shape_error(method, "a list of records", &other)),
    }
}

fn shape_error(method: &ModelMethod, expected: &str, got: &Value) -> PortalError {
    PortalError::Json {
        message: format!("{} returned unexpected result, expected {}: {}", method, expected, got),
        source: None,
    }
}
