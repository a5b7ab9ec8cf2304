// JSON extraction from model replies
//
// Models asked for JSON routinely wrap it in prose or code fences. Rather
// than trusting the reply to be a bare object, scan for the first balanced
// top-level object and parse that.

use serde::de::DeserializeOwned;

/// Return the first balanced `{...}` object in `text`, if any.
///
/// Brace counting is string-aware: braces inside JSON string literals
/// (including escaped quotes) do not affect nesting depth.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a typed value out of a model reply.
///
/// Tries the whole reply first, then the first embedded JSON object.
/// Returns `None` when neither parses; callers degrade to defaults.
pub fn parse_llm_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Some(value);
    }

    let object = extract_json_object(text)?;
    serde_json::from_str(object).ok()
}
