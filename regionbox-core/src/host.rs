//! Host-native values.
//!
//! [`HostValue`] models the values a dynamically typed host application
//! passes to and receives from a region. Not every host value can be stored
//! in a cache: functions and `undefined` have no stored form, and a value
//! converter reports them as unsupported.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// A host-native value.
///
/// [`HostValue::Undefined`] doubles as the "no value" sentinel returned by
/// region reads for absent keys.
///
/// # Example
/// ```
/// use regionbox_core::HostValue;
/// use serde_json::json;
///
/// let value = HostValue::from(json!({ "foo": "bar" }));
/// assert!(value.is_object());
/// assert_eq!(HostValue::from("bar").as_str(), Some("bar"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// Absence of a value.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number; the host has a single floating point number type.
    Number(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    Array(Vec<HostValue>),
    /// Object with insertion-ordered properties.
    Object(IndexMap<String, HostValue>),
    /// Opaque callable, identified by its name.
    Function(SmolStr),
}

impl HostValue {
    /// Returns `true` for the "no value" sentinel.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for [`HostValue::Object`].
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns the string slice of a [`HostValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the value to the string the host would use as a property key.
    ///
    /// Strings are taken verbatim; everything else uses its display form.
    pub fn to_key_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

/// Detail form used in error messages, e.g. `Unable to put value undefined`.
impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => fmt_number(*n, f),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match item {
                        Self::Undefined | Self::Null => {}
                        other => write!(f, "{}", other)?,
                    }
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("#<Object>"),
            Self::Function(name) => write!(f, "function {}() {{ [native code] }}", name),
        }
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(items: Vec<HostValue>) -> Self {
        Self::Array(items)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
