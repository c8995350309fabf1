//! Lenient parsing of JSON embedded in model replies
//!
//! Models wrap JSON in markdown fences or surround it with prose. We try the
//! whole reply first and then fall back to the first balanced object or array.

use serde_json::Value;

/// Removes a surrounding ```json ... ``` fence if present
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json", "JSON", ...) up to the first newline
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Finds the first balanced `{...}` or `[...]` span, honouring string literals
pub fn first_balanced(raw: &str, open: char) -> Option<&str> {
    let close = match open {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };

    let start = raw.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parses a model reply into JSON: whole reply, else first object, else first array
pub fn parse_ai_json(raw: &str) -> Option<Value> {
    let cleaned = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }

    let object_first = match (cleaned.find('{'), cleaned.find('[')) {
        (Some(o), Some(a)) => o < a,
        (Some(_), None) => true,
        _ => false,
    };
    let order = if object_first { ['{', '['] } else { ['[', '{'] };

    order
        .iter()
        .filter_map(|open| first_balanced(cleaned, *open))
        .find_map(|span| serde_json::from_str::<Value>(span).ok())
}

/// First JSON object in the reply, ignoring arrays
pub fn parse_ai_object(raw: &str) -> Option<serde_json::Map<String, Value>> {
    let cleaned = strip_code_fences(raw);
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(cleaned) {
        return Some(map);
    }
    match serde_json::from_str::<Value>(first_balanced(cleaned, '{')?) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
