//! HTTP proxy server

mod handler;
pub mod server;

pub use handler::ProxyHandler;
pub use server::{build_router, run_server, ProxyState};
