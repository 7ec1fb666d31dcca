//! Structured-or-raw model output.

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

/// Result of asking a model for structured output.
///
/// A reply that could not be recovered as JSON of the expected shape is kept
/// verbatim as `Unstructured`. This is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Parsed and typed content.
    Structured(T),
    /// Raw reply text.
    Unstructured(String),
}

impl<T> Payload<T> {
    /// True when the reply parsed into `T`.
    pub fn is_structured(&self) -> bool {
        matches!(self, Payload::Structured(_))
    }

    /// Borrow the typed content.
    pub fn structured(&self) -> Option<&T> {
        match self {
            Payload::Structured(value) => Some(value),
            Payload::Unstructured(_) => None,
        }
    }

    /// Take the typed content.
    pub fn into_structured(self) -> Option<T> {
        match self {
            Payload::Structured(value) => Some(value),
            Payload::Unstructured(_) => None,
        }
    }

    /// Raw text when unstructured.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Payload::Structured(_) => None,
            Payload::Unstructured(text) => Some(text),
        }
    }

    /// Map the structured side.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Payload<U> {
        match self {
            Payload::Structured(value) => Payload::Structured(f(value)),
            Payload::Unstructured(text) => Payload::Unstructured(text),
        }
    }
}

impl<T: Serialize> Payload<T> {
    /// Transport form: the structured value, or `{"raw": text}`.
    pub fn into_value(self) -> Value {
        match self {
            Payload::Structured(value) => {
                serde_json::to_value(value).unwrap_or(Value::Null)
            }
            Payload::Unstructured(text) => json!({ "raw": text }),
        }
    }
}

impl<T: Serialize> Serialize for Payload<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Structured(value) => value.serialize(serializer),
            Payload::Unstructured(text) => json!({ "raw": text }).serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unstructured_serializes_as_raw_object() {
        let payload: Payload<Vec<String>> = Payload::Unstructured("prose".into());
        assert_eq!(payload.into_value(), json!({"raw": "prose"}));
    }

    #[test]
    fn structured_serializes_transparently() {
        let payload = Payload::Structured(vec!["a".to_string()]);
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!(["a"]));
    }
}
