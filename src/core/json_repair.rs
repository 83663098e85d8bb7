//! # Model JSON Decoding
//!
//! Hosted models sometimes wrap JSON in a Markdown fence or stop mid-object
//! when they hit their output limit. `parse_model_json` strips the fence,
//! parses, and if that fails tries exactly one repair pass before giving up.
//!
//! The repair is a heuristic, not a parser: it closes an unterminated string
//! and then appends the closers for every unmatched `{` / `[`. Anything else
//! wrong with the text is reported as malformed output.

use std::fmt;

use log::{debug, warn};
use serde::de::DeserializeOwned;

/// The model's answer could not be decoded, even after repair.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedOutput {
    pub reason: String,
    pub raw: String,
}

impl fmt::Display for MalformedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model returned malformed JSON: {}", self.reason)
    }
}

impl std::error::Error for MalformedOutput {}

/// Returns the content of a leading Markdown code fence, or the trimmed text.
/// A missing closing fence (truncated answer) is tolerated.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag line
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => return trimmed,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Closes whatever a truncated JSON document left open.
pub fn repair_truncated_json(text: &str) -> String {
    let mut fixed = text.trim().to_string();
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in fixed.chars() {
        if in_string {
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
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.last() == Some(&c) {
                    closers.pop();
                }
            }
            _ => {}
        }
    }

    if in_string {
        // A dangling escape would swallow the closing quote
        if escaped {
            fixed.pop();
        }
        fixed.push('"');
    }
    while let Some(closer) = closers.pop() {
        fixed.push(closer);
    }
    fixed
}

/// Decodes a model answer into `T`, with one repair attempt.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, MalformedOutput> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(MalformedOutput {
            reason: "empty response".to_string(),
            raw: text.to_string(),
        });
    }

    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            debug!("Direct parse failed ({first}), attempting repair");
            let repaired = repair_truncated_json(body);
            serde_json::from_str::<T>(&repaired).map_err(|second| {
                warn!("Model JSON still invalid after repair: {second}");
                MalformedOutput {
                    reason: second.to_string(),
                    raw: text.to_string(),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::Value;

    fn balanced(text: &str) -> bool {
        serde_json::from_str::<Value>(text).is_ok()
    }

    #[test]
    fn test_repair_leaves_valid_json_alone() {
        let text = r#"{"a":[1,2],"b":"x"}"#;
        assert_eq!(repair_truncated_json(text), text);
    }

    #[test]
    fn test_repair_closes_open_string_and_objects() {
        let repaired = repair_truncated_json(r#"{"aboutMe":"Experienced accou"#);
        assert_eq!(repaired, r#"{"aboutMe":"Experienced accou"}"#);
        assert!(balanced(&repaired));
    }

    #[test]
    fn test_repair_closes_nested_in_reverse_order() {
        let repaired = repair_truncated_json(r#"{"experience":[{"title":"Auditor","period":"2020"#);
        assert_eq!(repaired, r#"{"experience":[{"title":"Auditor","period":"2020"}]}"#);
        assert!(balanced(&repaired));
    }

    #[test]
    fn test_repair_ignores_brackets_inside_strings() {
        let repaired = repair_truncated_json(r#"{"note":"use {braces} and [x"#);
        assert!(balanced(&repaired));
        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value["note"], "use {braces} and [x");
    }

    #[test]
    fn test_repair_handles_escaped_quotes() {
        let repaired = repair_truncated_json(r#"{"q":"he said \"hi\" and"#);
        assert!(balanced(&repaired));

        let dangling = repair_truncated_json(r#"{"q":"ends with \"#);
        assert!(balanced(&dangling));
    }

    #[test]
    fn test_repair_any_prefix_missing_only_closers() {
        let full = r#"{"a":[1,{"b":"x"},[2,3]],"c":{"d":[]}}"#;
        // Drop trailing closers one at a time: each prefix must repair to valid JSON.
        let mut prefix = full.to_string();
        while prefix.ends_with(['}', ']']) {
            assert!(balanced(&repair_truncated_json(&prefix)), "failed for {prefix}");
            prefix.pop();
        }
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fence("```json\n{\"a\":"), "{\"a\":");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Tips {
        tips: Vec<String>,
    }

    #[test]
    fn test_parse_model_json_repairs_truncation() {
        let parsed: Tips = parse_model_json(r#"{"tips":["Be early","Research the comp"#).unwrap();
        assert_eq!(parsed.tips, vec!["Be early", "Research the comp"]);
    }

    #[test]
    fn test_parse_model_json_reports_unrepairable() {
        let err = parse_model_json::<Tips>("Sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.raw, "Sorry, I can't help with that.");

        let err = parse_model_json::<Tips>("   ").unwrap_err();
        assert_eq!(err.reason, "empty response");
    }
}
