//! Error message extraction for non-2xx responses.

use serde_json::Value;

pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.contains("application/json"))
}

/// Human-readable message for a failed response.
///
/// JSON bodies prefer `detail` (a string as-is, an array joined with
/// spaces), then `message`, then the serialized body. Anything else falls
/// back to `Request failed with status <code>`.
pub fn describe_failure(status: u16, content_type: Option<&str>, body: &[u8]) -> String {
    let fallback = || format!("Request failed with status {status}");

    if !is_json_content_type(content_type) {
        return fallback();
    }
    let Ok(payload) = serde_json::from_slice::<Value>(body) else {
        return fallback();
    };
    if payload.is_null() {
        return fallback();
    }

    let message = match payload.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => items.iter().map(text_of).collect::<Vec<_>>().join(" "),
        _ => match payload.get("message") {
            Some(message) if !message.is_null() => text_of(message),
            _ => payload.to_string(),
        },
    };

    if message.is_empty() {
        fallback()
    } else {
        message
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn detail_string_is_used_directly() {
        let body = br#"{"detail": "Invalid credentials"}"#;
        assert_eq!(describe_failure(401, JSON, body), "Invalid credentials");
    }

    #[test]
    fn detail_array_is_joined_with_spaces() {
        let body = br#"{"detail": ["Too short.", "Too common."]}"#;
        assert_eq!(describe_failure(400, JSON, body), "Too short. Too common.");
    }

    #[test]
    fn message_field_is_second_choice() {
        let body = br#"{"detail": 5, "message": "Backend unavailable"}"#;
        assert_eq!(
            describe_failure(503, Some("application/json; charset=utf-8"), body),
            "Backend unavailable"
        );
    }

    #[test]
    fn field_errors_are_serialized_in_order() {
        let body = br#"{"email":["A user with this email already exists."],"password":["x"]}"#;
        assert_eq!(
            describe_failure(400, JSON, body),
            r#"{"email":["A user with this email already exists."],"password":["x"]}"#
        );
    }

    #[test]
    fn non_json_body_uses_generic_message() {
        assert_eq!(
            describe_failure(502, Some("text/html"), b"<html>bad gateway</html>"),
            "Request failed with status 502"
        );
        assert_eq!(describe_failure(500, None, b""), "Request failed with status 500");
    }

    #[test]
    fn unparsable_or_empty_json_uses_generic_message() {
        assert_eq!(
            describe_failure(500, JSON, b"{not json"),
            "Request failed with status 500"
        );
        assert_eq!(describe_failure(500, JSON, b"null"), "Request failed with status 500");
        assert_eq!(
            describe_failure(400, JSON, br#"{"detail": ""}"#),
            "Request failed with status 400"
        );
    }
}
