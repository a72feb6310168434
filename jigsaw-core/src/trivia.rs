//! Shared pieces of the artwork-fact lookup.
//!
//! The HTTP call itself belongs to each front end; they all build the same
//! request body and read the reply the same way, and they all fall back to
//! [`FALLBACK_FACT`] on any failure.

use serde_json::{Value, json};

pub const DEFAULT_FACT_MODEL: &str = "gemini-3-flash-preview";
pub const FACT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Returned when the service is unreachable, unconfigured or misbehaving.
pub const FALLBACK_FACT: &str = "The Mona Lisa's expression has fascinated viewers for centuries.";
/// Returned when the service answers without any text.
pub const EMPTY_FACT: &str = "The Mona Lisa is the most famous portrait in the world.";

pub fn fact_prompt(title: &str) -> String {
    format!(
        "Provide a single, fascinating, one-sentence secret or fact about the painting \"{title}\" that most people don't know. Keep it engaging for a museum game audience."
    )
}

pub fn fact_endpoint(base: &str, model: &str) -> String {
    format!("{}/models/{}:generateContent", base.trim_end_matches('/'), model)
}

pub fn fact_request_body(title: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": fact_prompt(title) }] }]
    })
}

/// Pull the text out of a `generateContent` reply. `None` when the reply has
/// no usable text.
pub fn parse_fact_response(body: &Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Da Vinci painted it on poplar.\n" }] }
            }]
        });
        assert_eq!(
            parse_fact_response(&body).as_deref(),
            Some("Da Vinci painted it on poplar.")
        );
    }

    #[test]
    fn blank_or_malformed_replies_yield_none() {
        assert_eq!(parse_fact_response(&json!({})), None);
        assert_eq!(parse_fact_response(&json!({ "candidates": [] })), None);
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert_eq!(parse_fact_response(&blank), None);
    }

    #[test]
    fn request_embeds_title_in_prompt() {
        let body = fact_request_body("Mona Lisa");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"Mona Lisa\""));
        assert_eq!(
            fact_endpoint("https://x.test/v1beta/", "m"),
            "https://x.test/v1beta/models/m:generateContent"
        );
    }
}
