//! Common test helpers and JSON builders

use serde_json::{json, Value};

// ─── Request builders ────────────────────────────────────────────────────────

/// Build a /generate request body
pub fn prompt_request(prompt: &str) -> Value {
    json!({ "prompt": prompt })
}

/// The payload the proxy must send upstream for a given prompt value
pub fn expected_payload(prompt: Value) -> Value {
    json!({ "contents": [ { "parts": [ { "text": prompt } ] } ] })
}

// ─── Response builders ────────────────────────────────────────────────────────

/// Build a normal generateContent response from the "upstream"
pub fn upstream_text_response(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }],
                "role": "model"
            },
            "finishReason": "STOP",
            "index": 0,
            "safetyRatings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "probability": "NEGLIGIBLE" }
            ]
        }],
        "usageMetadata": {
            "promptTokenCount": 4,
            "candidatesTokenCount": 7,
            "totalTokenCount": 11
        }
    })
    .to_string()
}

/// Build the error body Gemini returns for a rejected API key
pub fn upstream_invalid_key_response() -> String {
    json!({
        "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT"
        }
    })
    .to_string()
}

// ─── Assertion helpers ────────────────────────────────────────────────────────

/// Assert two strings are equal, with context on failure
pub fn assert_eq_str(actual: &str, expected: &str, label: &str) -> anyhow::Result<()> {
    if actual != expected {
        Err(anyhow::anyhow!("{label}: expected {:?} but got {:?}", expected, actual))
    } else {
        Ok(())
    }
}

/// Assert condition is true, with message
pub fn assert_true(cond: bool, msg: &str) -> anyhow::Result<()> {
    if !cond {
        Err(anyhow::anyhow!("{}", msg))
    } else {
        Ok(())
    }
}
