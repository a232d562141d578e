//! Request and response types for the proxy and the Gemini API

mod gemini;
mod inbound;

pub use gemini::*;
pub use inbound::*;
