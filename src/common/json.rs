use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum number of characters of a raw body kept for diagnostics.
pub(crate) const PREVIEW_CHARS: usize = 200;

/// Bounded, lossy UTF-8 preview of a raw response body.
pub(crate) fn preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}

/// True if the body is an HTML page rather than JSON.
/// Checks the content type first, then the first non-whitespace byte.
pub(crate) fn looks_like_html(bytes: &[u8], content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        if ct.to_ascii_lowercase().contains("text/html") {
            return true;
        }
    }
    bytes.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'<')
}

/// Parse a JSON body, attaching a bounded preview to the error.
pub(crate) fn parse_json<T: DeserializeOwned>(source_name: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
        preview: preview(bytes),
    })
}

/// Upstream ids arrive as numbers or numeric strings depending on the file.
pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Loose truthiness: null, false, 0 and "" are false, everything else true.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Name of a JSON value's kind, for shape errors.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_is_bounded() {
        let body = "x".repeat(5000);
        assert_eq!(preview(body.as_bytes()).chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn preview_respects_multibyte_chars() {
        let body = "म".repeat(300);
        let p = preview(body.as_bytes());
        assert_eq!(p.chars().count(), PREVIEW_CHARS);
        assert!(p.chars().all(|c| c == 'म'));
    }

    #[test]
    fn html_sniffing() {
        assert!(looks_like_html(b"  <!DOCTYPE html><html>", None));
        assert!(looks_like_html(b"[]", Some("text/html; charset=utf-8")));
        assert!(!looks_like_html(b"[{\"a\":1}]", Some("application/json")));
        assert!(!looks_like_html(b"", None));
    }

    #[test]
    fn ids_from_numbers_and_strings() {
        assert_eq!(value_as_u64(&json!(27)), Some(27));
        assert_eq!(value_as_u64(&json!("27")), Some(27));
        assert_eq!(value_as_u64(&json!(27.0)), Some(27));
        assert_eq!(value_as_u64(&json!(2.5)), None);
        assert_eq!(value_as_u64(&json!(null)), None);
        assert_eq!(value_as_u64(&json!("abc")), None);
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("Elected")));
        assert!(is_truthy(&json!(1)));
    }

    #[test]
    fn parse_error_carries_preview() {
        let err = parse_json::<Value>("test", b"<html>oops</html>").unwrap_err();
        match err {
            Error::Parse { preview, .. } => assert!(preview.starts_with("<html>")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
