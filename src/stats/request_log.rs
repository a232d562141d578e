//! Request logging formatter

use serde_json::Value;

/// Format a one-line summary of an inbound `/generate` request
pub fn format_request_log(model: &str, prompt: &Value) -> String {
    let prompt_str = match prompt {
        Value::Null => "prompt=<missing>".to_string(),
        Value::String(s) => format!("\"{}\"", truncate_message(&normalize_whitespace(s))),
        other => format!("prompt=<{}>", truncate_message(&other.to_string())),
    };

    format!("→ model={} {}", model, prompt_str)
}

/// Convert newlines and tabs to single spaces, collapse multiple spaces
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate message according to rules:
/// - If <= 100 chars: show all
/// - If > 100 chars: first 25 + " ... " + last 75
fn truncate_message(s: &str) -> String {
    const MAX_TOTAL: usize = 100;
    const PREFIX_LEN: usize = 25;
    const SUFFIX_LEN: usize = 75;
    const ELLIPSIS: &str = " ... ";

    let char_count = s.chars().count();
    if char_count <= MAX_TOTAL {
        return s.to_string();
    }

    let prefix: String = s.chars().take(PREFIX_LEN).collect();
    let suffix: String = s.chars().skip(char_count - SUFFIX_LEN).collect();

    format!("{}{}{}", prefix, ELLIPSIS, suffix)
}
