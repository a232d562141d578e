//! Inbound `/generate` request

use serde_json::Value;

use crate::error::ProxyError;

/// Body of `POST /generate`
///
/// Only `prompt` is read; other keys are ignored. Neither presence nor type of
/// `prompt` is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: Value,
}

impl GenerateRequest {
    /// Parse a raw request body. The body must be a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ProxyError::BadRequest(format!("Request body is not valid JSON: {}", e)))?;

        match value {
            Value::Object(mut map) => Ok(Self {
                prompt: map.remove("prompt").unwrap_or(Value::Null),
            }),
            other => Err(ProxyError::BadRequest(format!(
                "Request body must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Prompt as text, when it is a string
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt.as_str()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
