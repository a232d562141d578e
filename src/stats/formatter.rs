//! Stats formatting for different output formats

use super::RequestMetrics;
use crate::config::StatsFormat;

/// Format metrics according to the configured format
pub fn format_metrics(metrics: &RequestMetrics, format: StatsFormat) -> String {
    match format {
        StatsFormat::Pretty => format_pretty(metrics),
        StatsFormat::Json => format_json(metrics),
        StatsFormat::Compact => format_compact(metrics),
    }
}

/// Pretty box format for terminal output
fn format_pretty(m: &RequestMetrics) -> String {
    format!(
        r#"┌──────────────────────────────────────────────────────────────────┐
│ Gemini Request Metrics                                           │
├──────────────────────────────────────────────────────────────────┤
│ Model:  {:56}│
│ Time:   {:56}│
│ Status: {:56}│
├──────────────────────────────────────────────────────────────────┤
│ Tokens                                                           │
│   Input: {:6} │ Output: {:6} │ Total: {:6}                   │
├──────────────────────────────────────────────────────────────────┤
│ Candidates: {:52}│
│ Finish: {:56}│
│ Duration: {:52.1}ms│
└──────────────────────────────────────────────────────────────────┘
"#,
        truncate(&m.model, 56),
        m.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        m.upstream_status,
        m.prompt_tokens,
        m.completion_tokens,
        m.total_tokens,
        m.candidates,
        truncate(&m.finish_reason, 56),
        m.duration_ms,
    )
}

/// JSON format for structured logging
fn format_json(m: &RequestMetrics) -> String {
    serde_json::to_string(m).unwrap_or_else(|_| "{}".to_string())
}

/// Compact single-line format
fn format_compact(m: &RequestMetrics) -> String {
    format!(
        "[{}] model={} status={} tokens={}/{}/{} candidates={} out={} finish={} dur={:.1}ms",
        m.timestamp.format("%H:%M:%S"),
        m.model,
        m.upstream_status,
        m.prompt_tokens,
        m.completion_tokens,
        m.total_tokens,
        m.candidates,
        m.output_len,
        m.finish_reason,
        m.duration_ms
    )
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
