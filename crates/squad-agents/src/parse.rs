//! Recovery of JSON objects from free-text decision responses.
//!
//! Language models are asked for a bare JSON object but often wrap it in a
//! markdown fence, surround it with prose, or leave a trailing comma. This
//! module tries, in order:
//! 1. Direct `serde_json` parse
//! 2. The body of a markdown code block
//! 3. The outermost `{ ... }` span in the text
//! 4. Each of the above with trailing commas stripped
//!
//! The first candidate that parses wins.

use serde_json::Value;

/// Recover a JSON value from raw text, or `None` if every strategy fails.
pub fn recover_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidates = [
        Some(trimmed),
        extract_codeblock(trimmed),
        extract_braced(trimmed),
    ];

    for candidate in candidates.iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            return Some(value);
        }
    }
    for candidate in candidates.iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(&strip_trailing_commas(candidate)) {
            return Some(value);
        }
    }
    None
}

/// The trimmed body of the first markdown code block, with or without a
/// language tag.
fn extract_codeblock(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    // Skip the language tag line (`json`, `JSON`, or nothing).
    let body_start = after_fence.find('\n').map_or(0, |nl| nl.saturating_add(1));
    let body = after_fence.get(body_start..)?;
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

/// The span from the first `{` to the last `}`.
fn extract_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Remove commas that directly precede a closing brace or bracket, leaving
/// string literals untouched.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let rest = text.get(idx.saturating_add(1)..).unwrap_or_default();
                let next = rest.trim_start().chars().next();
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_of(value: Option<Value>) -> Option<String> {
        value
            .as_ref()
            .and_then(|v| v.get("action"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    #[test]
    fn parses_clean_json() {
        let value = recover_json(r#"{"action": "move", "target": "Corridor", "reasoning": "go"}"#);
        assert_eq!(action_of(value).as_deref(), Some("move"));
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "Sure thing, boss.\n```json\n{\"action\": \"search\", \"reasoning\": \"look\"}\n```\nOver.";
        assert_eq!(action_of(recover_json(raw)).as_deref(), Some("search"));
    }

    #[test]
    fn parses_plain_fence() {
        let raw = "```\n{\"action\": \"cover\", \"reasoning\": \"down\"}\n```";
        assert_eq!(action_of(recover_json(raw)).as_deref(), Some("cover"));
    }

    #[test]
    fn parses_json_inside_prose() {
        let raw = "I think {\"action\": \"report\", \"reasoning\": \"status\"} is best";
        assert_eq!(action_of(recover_json(raw)).as_deref(), Some("report"));
    }

    #[test]
    fn strips_trailing_commas() {
        let raw = r#"{"action": "attack", "target": "alien", "reasoning": "now",}"#;
        assert_eq!(action_of(recover_json(raw)).as_deref(), Some("attack"));
    }

    #[test]
    fn commas_inside_strings_survive() {
        assert_eq!(strip_trailing_commas(r#"{"a": "x,}", }"#), r#"{"a": "x,}" }"#);
    }

    #[test]
    fn garbage_is_none() {
        assert!(recover_json("").is_none());
        assert!(recover_json("the squad is moving out").is_none());
        assert!(recover_json("} nothing {").is_none());
    }
}
