//! Main proxy server implementation

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handler::ProxyHandler;
use crate::config::AppConfig;
use crate::upstream::GeminiClient;

/// Shared state for the proxy
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<AppConfig>,
    pub upstream: GeminiClient,
}

impl ProxyState {
    /// Build state from a fully loaded configuration (API key included)
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let upstream = GeminiClient::from_config(&config.upstream)?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}

/// Build the router: `/generate`, `/health`, open CORS, request tracing
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/generate", post(generate_handler))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the proxy server
pub async fn run_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    if config.upstream.api_key.is_empty() {
        tracing::warn!(
            "{} is not set; upstream calls will be sent with an empty key",
            crate::config::API_KEY_ENV
        );
    }

    let state = ProxyState::from_config(config)?;
    let upstream = state.upstream.redacted_endpoint();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("gemini-proxy listening on {}", addr);
    tracing::info!("Proxying to {}", upstream);

    Ok(axum::serve(listener, app).await?)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// `POST /generate`
async fn generate_handler(
    State(state): State<ProxyState>,
    req: axum::extract::Request,
) -> axum::response::Response {
    let handler = ProxyHandler::new(state);
    handler.handle(req).await
}
