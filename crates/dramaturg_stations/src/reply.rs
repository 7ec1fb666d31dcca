//! Lenient readers for model JSON.
//!
//! Models wrap lists in objects, rename keys and quote numbers. These helpers
//! accept all of that and return empty values instead of failing.

use dramaturg_core::Language;
use dramaturg_models::Payload;
use serde_json::Value;

/// The array itself, or the first array found under one of `keys`.
pub(crate) fn array<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => keys
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .or_else(|| map.values().find_map(Value::as_array)),
        _ => None,
    }
}

/// Text of a list item: a string, or the `name`/`title`/`text` of an object.
pub(crate) fn item_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Object(_) => str_field(item, &["name", "title", "text", "value", "statement"])?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Strings from a structured list, or bullet lines from prose.
pub(crate) fn string_list(payload: &Payload<Value>, keys: &[&str]) -> Vec<String> {
    match payload {
        Payload::Structured(value) => array(value, keys)
            .map(|items| items.iter().filter_map(item_text).collect())
            .or_else(|| value.as_str().map(|s| vec![s.trim().to_string()]))
            .unwrap_or_default(),
        Payload::Unstructured(raw) => prose_lines(raw),
    }
}

/// Non-empty lines of prose with list markers removed.
pub(crate) fn prose_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '-' | '*' | '+' | '.' | ')' | '•')
                })
                .trim()
                .trim_matches('*')
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .collect()
}

/// First non-empty string under one of `keys`.
pub(crate) fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First integer under one of `keys`, accepting numeric strings and floats.
pub(crate) fn int_field(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match value.get(*key) {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .map(|f| f.round() as i64),
        _ => None,
    })
}

/// First number under one of `keys`, accepting numeric strings.
pub(crate) fn float_field(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match value.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Strings under one of `keys`; a single string becomes a one-item list.
pub(crate) fn list_field(value: &Value, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .find_map(|key| match value.get(*key) {
            Some(Value::Array(items)) => Some(items.iter().filter_map(item_text).collect()),
            Some(Value::String(s)) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
            _ => None,
        })
        .unwrap_or_default()
}

/// Scalar text, or the language placeholder when empty.
pub(crate) fn or_undetermined(text: Option<String>, language: Language) -> String {
    text.filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| language.undetermined().to_string())
}

/// List, or a single `N/A` entry when empty.
pub(crate) fn or_not_available(list: Vec<String>, language: Language) -> Vec<String> {
    if list.is_empty() {
        vec![language.not_available().to_string()]
    } else {
        list
    }
}

/// Whether a scalar or list field holds a placeholder.
pub(crate) fn is_placeholder(text: &str, language: Language) -> bool {
    text == language.undetermined() || text == language.not_available()
}

/// Whether a list is a lone placeholder.
pub(crate) fn is_placeholder_list(list: &[String], language: Language) -> bool {
    matches!(list, [only] if is_placeholder(only, language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_lists_under_any_key() {
        let wrapped = json!({"genres": ["drama", {"name": "thriller"}, "  "]});
        let payload = Payload::Structured(wrapped);
        assert_eq!(string_list(&payload, &["genres"]), vec!["drama", "thriller"]);

        let renamed = Payload::Structured(json!({"items": ["a"]}));
        assert_eq!(string_list(&renamed, &["genres"]), vec!["a"]);
    }

    #[test]
    fn prose_becomes_bullets() {
        let payload = Payload::Unstructured("Characters:\n1. Layla\n- **Omar**\n\n* Salma".into());
        assert_eq!(string_list(&payload, &[]), vec!["Layla", "Omar", "Salma"]);
    }

    #[test]
    fn numeric_fields_are_lenient() {
        let item = json!({"strength": "7", "weight": 0.4, "score": 6.6});
        assert_eq!(int_field(&item, &["strength"]), Some(7));
        assert_eq!(int_field(&item, &["score"]), Some(7));
        assert_eq!(float_field(&item, &["weight"]), Some(0.4));
        assert_eq!(int_field(&item, &["missing"]), None);
    }

    #[test]
    fn placeholders_fill_gaps() {
        assert_eq!(or_undetermined(Some(" ".into()), Language::En), "not determined");
        assert_eq!(or_not_available(vec![], Language::Ar), vec!["N/A"]);
        assert!(is_placeholder_list(&["N/A".to_string()], Language::Ar));
        assert!(!is_placeholder_list(&["x".to_string()], Language::Ar));
    }
}
