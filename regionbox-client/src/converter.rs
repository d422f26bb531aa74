use regionbox_core::{HostValue, NativeValue};

/// Bidirectional value conversion between the host and the cache client.
///
/// `to_native` reports values the client cannot represent by returning
/// `None`; it must not panic. `to_host` is total: every stored value has a
/// host form.
pub trait ValueConverter: Send + Sync {
    /// Converts a host value into its stored form, or `None` if unsupported.
    fn to_native(&self, value: &HostValue) -> Option<NativeValue>;

    /// Converts a stored value into its host form.
    fn to_host(&self, value: &NativeValue) -> HostValue;
}

/// Structural converter.
///
/// - numbers are stored as doubles; non-finite numbers are unsupported
/// - arrays and objects convert element-wise and are unsupported if any
///   element is
/// - `undefined` and functions are unsupported
/// - stored integers and byte arrays come back as numbers and number arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl ValueConverter for DefaultConverter {
    fn to_native(&self, value: &HostValue) -> Option<NativeValue> {
        match value {
            HostValue::Undefined | HostValue::Function(_) => None,
            HostValue::Null => Some(NativeValue::Null),
            HostValue::Bool(b) => Some(NativeValue::Boolean(*b)),
            HostValue::Number(n) if n.is_finite() => Some(NativeValue::Double(*n)),
            HostValue::Number(_) => None,
            HostValue::String(s) => Some(NativeValue::String(s.clone())),
            HostValue::Array(items) => items
                .iter()
                .map(|item| self.to_native(item))
                .collect::<Option<Vec<_>>>()
                .map(NativeValue::Array),
            HostValue::Object(fields) => fields
                .iter()
                .map(|(k, v)| self.to_native(v).map(|v| (k.clone(), v)))
                .collect::<Option<_>>()
                .map(NativeValue::Object),
        }
    }

    fn to_host(&self, value: &NativeValue) -> HostValue {
        match value {
            NativeValue::Null => HostValue::Null,
            NativeValue::Boolean(b) => HostValue::Bool(*b),
            NativeValue::Int64(n) => HostValue::Number(*n as f64),
            NativeValue::Double(n) => HostValue::Number(*n),
            NativeValue::String(s) => HostValue::String(s.clone()),
            NativeValue::Bytes(bytes) => HostValue::Array(
                bytes
                    .iter()
                    .map(|b| HostValue::Number(f64::from(*b)))
                    .collect(),
            ),
            NativeValue::Array(items) => {
                HostValue::Array(items.iter().map(|item| self.to_host(item)).collect())
            }
            NativeValue::Object(fields) => HostValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.to_host(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_supported_values_come_back_equal() {
        let values = [
            HostValue::Null,
            HostValue::from("bar"),
            HostValue::from(true),
            HostValue::from(-12.25),
            HostValue::from(json!({ "foo": "bar", "nested": [1, { "x": null }] })),
        ];
        for value in values {
            let native = DefaultConverter.to_native(&value).expect("supported");
            assert_eq!(DefaultConverter.to_host(&native), value);
        }
    }

    #[test]
    fn test_unsupported_values() {
        assert_eq!(DefaultConverter.to_native(&HostValue::Undefined), None);
        assert_eq!(
            DefaultConverter.to_native(&HostValue::Function("f".into())),
            None
        );
        assert_eq!(DefaultConverter.to_native(&HostValue::Number(f64::INFINITY)), None);
        assert_eq!(
            DefaultConverter.to_native(&HostValue::Array(vec![
                HostValue::Null,
                HostValue::Undefined
            ])),
            None
        );
    }

    #[test]
    fn test_foreign_values_to_host() {
        assert_eq!(
            DefaultConverter.to_host(&NativeValue::Int64(5)),
            HostValue::Number(5.0)
        );
        assert_eq!(
            DefaultConverter.to_host(&NativeValue::Bytes(vec![1, 255])),
            HostValue::from(json!([1, 255]))
        );
    }
}
