//! Recover JSON from model replies that wrap it in prose or markdown fences.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, PartialEq)]
pub enum ExtractionError {
    Empty,
    NotFound,
    Incomplete,
    Invalid(String),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::Empty => write!(f, "Empty response from model"),
            ExtractionError::NotFound => write!(f, "No JSON value found in response"),
            ExtractionError::Incomplete => write!(f, "Incomplete JSON value in response"),
            ExtractionError::Invalid(msg) => write!(f, "Invalid JSON in response: {}", msg),
        }
    }
}

impl std::error::Error for ExtractionError {}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^```(?:json)?\s*|\s*```\s*$").expect("valid fence pattern"))
}

/// Strip a leading ```` ```json ```` fence and a trailing ```` ``` ````.
pub fn strip_code_fences(raw: &str) -> String {
    fence_pattern().replace_all(raw.trim(), "").trim().to_string()
}

/// Slice out the first balanced `{...}` or `[...]`, honouring strings and escapes.
pub fn extract_json_value(raw: &str) -> Result<&str, ExtractionError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let start = text.find(['{', '[']).ok_or(ExtractionError::NotFound)?;
    let bytes = text.as_bytes();
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;

    for (index, &byte) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escape {
                escape = false;
            } else if byte == b'\\' {
                escape = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[start..=index]);
                }
            }
            _ => {}
        }
    }
    Err(ExtractionError::Incomplete)
}

/// Parse a model reply as `T`, falling back to fence stripping and extraction.
pub fn parse_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractionError> {
    if raw.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    if let Ok(value) = serde_json::from_str::<T>(raw) {
        return Ok(value);
    }

    let unfenced = strip_code_fences(raw);
    if let Ok(value) = serde_json::from_str::<T>(&unfenced) {
        return Ok(value);
    }

    log::debug!("Raw model reply needed extraction: {}", raw);
    let candidate = extract_json_value(&unfenced)?;
    serde_json::from_str::<T>(candidate).map_err(|e| ExtractionError::Invalid(e.to_string()))
}
