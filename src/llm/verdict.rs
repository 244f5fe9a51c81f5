//! Parsing of `{"score": "yes" | "no"}` grader replies.

use crate::error::{Result, GroundragError};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // non-greedy: the verdict object is flat
        Regex::new(r"(?s)\{.*?\}").expect("Invalid regex pattern")
    })
}

/// Extract the binary `score` from a grader reply.
///
/// Accepts surrounding prose or a fenced code block; the first JSON object in
/// `raw` is parsed. `score` must be "yes"/"no" (any case) or a JSON boolean.
pub fn parse_binary_score(judge: &'static str, raw: &str) -> Result<bool> {
    let malformed = || GroundragError::MalformedVerdict {
        judge,
        raw: raw.to_string(),
    };

    let object = json_object_pattern().find(raw).ok_or_else(malformed)?;
    let value: Value = serde_json::from_str(object.as_str()).map_err(|_| malformed())?;

    match value.get("score") {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(score)) => match score.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            _ => Err(malformed()),
        },
        _ => Err(malformed()),
    }
}
