//! gemini-proxy: HTTP proxy for the Gemini generateContent API
//!
//! Features:
//! - `POST /generate` wraps a prompt into a Gemini request and relays the reply
//! - API key injected once at start-up from `GEMINI_API_KEY`
//! - Open CORS and per-request stats logging

pub mod api;
pub mod config;
pub mod error;
pub mod proxy;
pub mod stats;
pub mod upstream;

pub use config::{ApiKey, AppConfig};
pub use error::ProxyError;
pub use proxy::run_server;
pub use upstream::GeminiClient;
