//! Dynamically shaped OData records and their flattened, tabular form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A record as returned in an OData `value` array.
///
/// Fields keep the order they had in the response body.
pub type RawRecord = IndexMap<String, RecordValue>;

/// A flattened record: every value is a scalar, columns in insertion order.
pub type FlatRecord = IndexMap<String, Scalar>;

/// Any JSON value an OData record field can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum RecordValue {
    /// JSON `null`.
    Null,
    /// JSON `true` or `false`.
    Bool(bool),
    /// Integer or floating-point number, kept exactly as parsed.
    Number(Number),
    /// JSON string.
    Text(String),
    /// A nested object, e.g. an expanded navigation property.
    Nested(RawRecord),
    /// An array of any values; never unrolled by the flattener.
    List(Vec<RecordValue>),
}

impl RecordValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RecordValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compact JSON text for this value.
    pub fn to_json_text(&self) -> String {
        Value::from(self.clone()).to_string()
    }
}

impl From<Value> for RecordValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RecordValue::Null,
            Value::Bool(b) => RecordValue::Bool(b),
            Value::Number(n) => RecordValue::Number(n),
            Value::String(s) => RecordValue::Text(s),
            Value::Array(items) => {
                RecordValue::List(items.into_iter().map(RecordValue::from).collect())
            }
            Value::Object(fields) => RecordValue::Nested(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, RecordValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<RecordValue> for Value {
    fn from(value: RecordValue) -> Self {
        match value {
            RecordValue::Null => Value::Null,
            RecordValue::Bool(b) => Value::Bool(b),
            RecordValue::Number(n) => Value::Number(n),
            RecordValue::Text(s) => Value::String(s),
            RecordValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            RecordValue::Nested(fields) => Value::Object(
                fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(s: String) -> Self {
        RecordValue::Text(s)
    }
}

impl From<bool> for RecordValue {
    fn from(b: bool) -> Self {
        RecordValue::Bool(b)
    }
}

impl From<i64> for RecordValue {
    fn from(n: i64) -> Self {
        RecordValue::Number(n.into())
    }
}

/// A single cell of a flattened record.
///
/// Serializes as the bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Null source field.
    Null,
    /// Boolean source field.
    Bool(bool),
    /// Numeric source field.
    Number(Number),
    /// Text field, or the JSON text of an array.
    Text(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}
