//! Reply normalization
//!
//! Model backends and SDK wrappers hand back text in many shapes: a bare
//! string, a message object, a list of parts, OpenAI `choices`, Gemini
//! `candidates`, or any of those wrapped in `value` / `inner_content`.
//! Everything that needs text out of a reply goes through [`extract_text`].

use serde_json::{Map, Value};

/// Keys checked on an object, in order. The first one yielding non-empty text wins.
const TEXT_KEYS: [&str; 9] = [
    "content",
    "text",
    "message",
    "delta",
    "inner_content",
    "choices",
    "candidates",
    "parts",
    "value",
];

/// Extract the first non-empty text from a reply of unknown shape.
pub fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(extract_text),
        Value::Object(map) => extract_from_object(map),
        _ => None,
    }
}

fn extract_from_object(map: &Map<String, Value>) -> Option<String> {
    for key in TEXT_KEYS {
        let Some(inner) = map.get(key) else {
            continue;
        };

        let text = if key == "parts" {
            join_parts(inner)
        } else {
            extract_text(inner)
        };

        if text.is_some() {
            return text;
        }
    }
    None
}

/// Gemini splits one answer across `parts`; they are concatenated, not alternatives.
fn join_parts(parts: &Value) -> Option<String> {
    let Value::Array(items) = parts else {
        return extract_text(parts);
    };

    let joined: String = items.iter().filter_map(extract_text).collect();
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Remove a surrounding markdown code fence (```json ... ```) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.split_once('\n') {
            Some((tag, remainder)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                remainder
            }
            _ => rest
                .strip_prefix("json")
                .or_else(|| rest.strip_prefix("JSON"))
                .unwrap_or(rest),
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_string() {
        assert_eq!(extract_text(&json!("hello")), Some("hello".to_string()));
        assert_eq!(extract_text(&json!("   ")), None);
    }

    #[test]
    fn test_openai_choices() {
        let reply = json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Paris"}}]
        });
        assert_eq!(extract_text(&reply), Some("Paris".to_string()));
    }

    #[test]
    fn test_stream_delta() {
        let chunk = json!({"choices": [{"delta": {"content": "Par"}}]});
        assert_eq!(extract_text(&chunk), Some("Par".to_string()));

        let role_only = json!({"choices": [{"delta": {"role": "assistant"}}]});
        assert_eq!(extract_text(&role_only), None);
    }

    #[test]
    fn test_list_prefers_first_non_empty() {
        let reply = json!([{"content": ""}, {"content": "second"}, {"content": "third"}]);
        assert_eq!(extract_text(&reply), Some("second".to_string()));
    }

    #[test]
    fn test_inner_content_with_choices() {
        let reply = json!({
            "content": null,
            "inner_content": {"choices": [{"message": {"content": "wrapped"}}]}
        });
        assert_eq!(extract_text(&reply), Some("wrapped".to_string()));
    }

    #[test]
    fn test_value_wrapper() {
        let reply = json!({"value": [{"items": [], "content": "from value"}]});
        assert_eq!(extract_text(&reply), Some("from value".to_string()));
    }

    #[test]
    fn test_gemini_candidates_join_parts() {
        let reply = json!({
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        });
        assert_eq!(extract_text(&reply), Some("Hello, world".to_string()));
    }

    #[test]
    fn test_content_parts_array() {
        let reply = json!({"content": [{"type": "text", "text": "part one"}]});
        assert_eq!(extract_text(&reply), Some("part one".to_string()));
    }

    #[test]
    fn test_nothing_to_extract() {
        assert_eq!(extract_text(&json!({"choices": []})), None);
        assert_eq!(extract_text(&json!(42)), None);
        assert_eq!(extract_text(&Value::Null), None);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\nplain\n```"), "plain");
        assert_eq!(strip_code_fences("```json{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  no fences  "), "no fences");
    }
}
