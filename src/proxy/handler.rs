//! Request/response handler for `/generate`

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use std::error::Error as _;
use std::time::Instant;

use super::server::ProxyState;
use crate::api::{GenerateContentRequest, GenerateRequest};
use crate::error::ProxyError;
use crate::stats::{format_metrics, format_request_log, RequestMetrics};
use crate::upstream::UpstreamResponse;

/// Largest accepted inbound body
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Proxy request handler
pub struct ProxyHandler {
    state: ProxyState,
}

impl ProxyHandler {
    pub fn new(state: ProxyState) -> Self {
        Self { state }
    }

    /// Handle an incoming request
    pub async fn handle(&self, req: Request<Body>) -> Response {
        match self.forward(req).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Request failed");
                e.into_response()
            }
        }
    }

    async fn forward(&self, req: Request<Body>) -> Result<Response, ProxyError> {
        let start = Instant::now();

        let body_bytes = to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(body_read_error)?;

        let request = GenerateRequest::from_slice(&body_bytes)?;
        let model = self.state.upstream.model();

        tracing::info!("{}", format_request_log(model, &request.prompt));

        let input_len = request.prompt_text().map(|p| p.chars().count()).unwrap_or(0);
        let payload = GenerateContentRequest::from_prompt(request.prompt);

        let upstream = self.state.upstream.generate_content(&payload).await?;

        self.respond(upstream, input_len, start)
    }

    /// Relay the upstream body unchanged. It must at least be JSON.
    fn respond(
        &self,
        upstream: UpstreamResponse,
        input_len: usize,
        start: Instant,
    ) -> Result<Response, ProxyError> {
        let UpstreamResponse { status, body } = upstream;

        let json: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
            let preview = String::from_utf8_lossy(&body[..body.len().min(200)]);
            tracing::debug!(status = %status, body_preview = %preview, "Upstream body is not JSON");
            ProxyError::UpstreamError(format!("body is not JSON (status {}): {}", status, e))
        })?;

        if status.is_client_error() || status.is_server_error() {
            tracing::warn!(
                status = %status,
                error_body = %String::from_utf8_lossy(&body),
                "Upstream returned error response"
            );
        }

        if self.state.config.stats.enabled {
            let metrics = RequestMetrics::from_response(
                &json,
                self.state.upstream.model(),
                input_len,
                status.as_u16(),
                start.elapsed().as_secs_f64() * 1000.0,
            );
            let formatted = format_metrics(&metrics, self.state.config.stats.format);
            if formatted.contains('\n') {
                tracing::info!("\n{}", formatted);
            } else {
                tracing::info!("{}", formatted);
            }
        }

        let reply_status = if self.state.config.upstream.forward_status {
            status
        } else {
            StatusCode::OK
        };

        Ok((
            reply_status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response())
    }
}

/// `to_bytes` wraps the length-limit failure, so look through the source chain
fn body_read_error(err: axum::Error) -> ProxyError {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<LengthLimitError>() {
            return ProxyError::PayloadTooLarge(format!("limit is {} bytes", MAX_BODY_BYTES));
        }
        source = inner.source();
    }
    ProxyError::BadRequest(format!("Failed to read request body: {}", err))
}
