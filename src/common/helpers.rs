// Helper functions for safe logging and JSON list columns

use serde::{Serialize, Serializer};

/// Masks email addresses for safe logging
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first = parts[0].chars().next().unwrap_or('*');
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Parses a JSON array column into a list of strings, tolerating bad data.
pub fn parse_json_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|r| serde_json::from_str::<Vec<String>>(r).ok())
        .unwrap_or_default()
}

/// Encodes a list for storage in a JSON text column.
pub fn to_json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Serializes a JSON text column as an array for API responses
pub fn serialize_json_list<S>(raw: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    parse_json_list(raw.as_deref()).serialize(serializer)
}

/// Accepts either a JSON array of strings or anything else (treated as empty),
/// mirroring how form payloads send lists loosely.
pub fn coerce_string_list(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Numbers and strings become trimmed strings; anything else is `None`.
pub fn coerce_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch, used in generated file names.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
