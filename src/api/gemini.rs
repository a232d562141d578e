//! Gemini `generateContent` request types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound `generateContent` request body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// A content part. `text` carries the caller's prompt untouched, so it may be
/// `null` or even a non-string value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Part {
    pub text: Value,
}

impl GenerateContentRequest {
    /// Wrap a prompt into a single-turn, single-part request
    pub fn from_prompt(prompt: Value) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

/// Subset of the `generateContent` response read for request stats.
/// The proxy itself never reshapes the upstream body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentSummary {
    #[serde(default)]
    pub candidates: Vec<CandidateSummary>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub model_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CandidateSummary {
    /// Concatenated length of all text parts in this candidate
    pub fn text_len(&self) -> usize {
        self.content
            .as_ref()
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .map(|t| t.chars().count())
                    .sum()
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
    #[serde(default)]
    pub total_token_count: u64,
}
