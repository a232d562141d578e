//! Upstream generative-language API

mod gemini;

pub use gemini::{build_http_client, GeminiClient, UpstreamResponse};
