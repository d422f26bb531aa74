//! Cache-client value representation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A value as the cache client stores and transmits it.
///
/// The serde form is adjacently tagged so that every variant survives a JSON
/// round trip unambiguously (an `Int64` stays an `Int64`, `Bytes` stay bytes):
///
/// ```
/// use regionbox_core::NativeValue;
///
/// let json = serde_json::to_string(&NativeValue::Int64(7)).unwrap();
/// assert_eq!(json, r#"{"type":"int64","value":7}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NativeValue {
    /// Stored null.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 64-bit signed integer, produced by clients with an integer type.
    Int64(i64),
    /// Double precision number.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Opaque byte array.
    Bytes(Vec<u8>),
    /// List of values.
    Array(Vec<NativeValue>),
    /// Field map of a structured object, in field order.
    Object(IndexMap<String, NativeValue>),
}

impl NativeValue {
    /// Short type name used in log fields.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Int64(_) => "int64",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}

impl From<f64> for NativeValue {
    fn from(n: f64) -> Self {
        Self::Double(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_keeps_field_order_in_json() {
        let mut fields = IndexMap::new();
        fields.insert("z".to_string(), NativeValue::Null);
        fields.insert("a".to_string(), NativeValue::Bytes(vec![1, 2]));
        let json = serde_json::to_string(&NativeValue::Object(fields)).unwrap();
        assert_eq!(
            json,
            r#"{"type":"object","value":{"z":{"type":"null"},"a":{"type":"bytes","value":[1,2]}}}"#
        );
    }

    #[test]
    fn test_type_name() {
        assert_eq!(NativeValue::from("x").type_name(), "string");
        assert_eq!(NativeValue::from(1.5).type_name(), "double");
    }
}
