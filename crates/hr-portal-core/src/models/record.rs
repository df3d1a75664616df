//! Records and many2one references.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A denormalized reference to a related record.
///
/// Serialized exactly as the ERP does: a two-element array `[id, label]`.
/// Display code unpacks the pair positionally, so the order is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, String)", into = "(i64, String)")]
pub struct ForeignKeyRef {
    pub id: i64,
    pub label: String,
}

impl ForeignKeyRef {
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Parse a wire value. Returns `None` for `false`, `null` or any other shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        match pair.as_slice() {
            [id, label] => Some(Self::new(id.as_i64()?, label.as_str()?)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Array(vec![Value::from(self.id), Value::from(self.label.clone())])
    }

    /// Wire value for an optional reference; unset references are `false`.
    pub fn optional_value(reference: Option<&ForeignKeyRef>) -> Value {
        reference.map_or(Value::Bool(false), ForeignKeyRef::to_value)
    }
}

impl From<(i64, String)> for ForeignKeyRef {
    fn from((id, label): (i64, String)) -> Self {
        Self { id, label }
    }
}

impl From<ForeignKeyRef> for (i64, String) {
    fn from(reference: ForeignKeyRef) -> Self {
        (reference.id, reference.label)
    }
}

/// A single record: field name to JSON value.
///
/// Persisted records always carry an integer `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub const ID_FIELD: &'static str = "id";

    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a record with the given id and fields. A stray `id` in `fields` is ignored.
    pub fn with_id(id: i64, fields: &Map<String, Value>) -> Self {
        let mut map = Map::new();
        map.insert(Self::ID_FIELD.to_string(), Value::from(id));
        for (key, value) in fields {
            if key != Self::ID_FIELD {
                map.insert(key.clone(), value.clone());
            }
        }
        Self(map)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get(Self::ID_FIELD).and_then(Value::as_i64)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Read a many2one field.
    pub fn reference(&self, field: &str) -> Option<ForeignKeyRef> {
        self.0.get(field).and_then(ForeignKeyRef::from_value)
    }

    /// Shallow-merge `patch` into this record, leaving unlisted fields alone.
    ///
    /// The `id` field is never overwritten.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key != Self::ID_FIELD {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Copy of this record restricted to `fields` plus `id`.
    ///
    /// An empty field list keeps every field.
    pub fn project(&self, fields: &[String]) -> Record {
        if fields.is_empty() {
            return self.clone();
        }
        let mut map = Map::new();
        if let Some(id) = self.0.get(Self::ID_FIELD) {
            map.insert(Self::ID_FIELD.to_string(), id.clone());
        }
        for field in fields {
            if let Some(value) = self.0.get(field) {
                map.insert(field.clone(), value.clone());
            }
        }
        Record(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
