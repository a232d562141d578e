//! Metrics collection from Gemini responses

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::GenerateContentSummary;

/// Collected metrics from a request/response cycle
#[derive(Debug, Clone, Serialize)]
pub struct RequestMetrics {
    /// Unique request ID
    pub request_id: String,
    /// Timestamp of the request
    pub timestamp: DateTime<Utc>,
    /// Configured model, or the upstream's reported model version
    pub model: String,
    /// Status code returned by the upstream
    pub upstream_status: u16,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Number of candidates returned
    pub candidates: usize,
    /// Prompt length (characters)
    pub input_len: usize,
    /// Text length of the first candidate (characters)
    pub output_len: usize,
    /// Finish reason of the first candidate
    pub finish_reason: String,
    /// Request duration in ms
    pub duration_ms: f64,
}

impl RequestMetrics {
    /// Create a new metrics instance with defaults
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            model: "unknown".to_string(),
            upstream_status: 0,
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            candidates: 0,
            input_len: 0,
            output_len: 0,
            finish_reason: "unknown".to_string(),
            duration_ms: 0.0,
        }
    }

    /// Extract metrics from an upstream response body
    pub fn from_response(
        response: &Value,
        model: &str,
        input_len: usize,
        upstream_status: u16,
        duration_ms: f64,
    ) -> Self {
        let mut metrics = Self::new();
        metrics.model = model.to_string();
        metrics.input_len = input_len;
        metrics.upstream_status = upstream_status;
        metrics.duration_ms = duration_ms;

        // Error bodies and unexpected shapes just leave the defaults in place
        let summary: GenerateContentSummary =
            serde_json::from_value(response.clone()).unwrap_or_default();

        if let Some(version) = summary.model_version {
            metrics.model = version;
        }

        if let Some(usage) = summary.usage_metadata {
            metrics.prompt_tokens = usage.prompt_token_count;
            metrics.completion_tokens = usage.candidates_token_count;
            metrics.total_tokens = usage.total_token_count;
        }

        metrics.candidates = summary.candidates.len();
        if let Some(first) = summary.candidates.first() {
            metrics.output_len = first.text_len();
            if let Some(ref reason) = first.finish_reason {
                metrics.finish_reason = reason.clone();
            }
        }

        metrics
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}
