//! Mock Gemini API
//!
//! Serves queued `generateContent` replies and records every call so tests
//! can check exactly what the proxy sent.

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Reply served for the next `generateContent` call
#[derive(Debug, Clone)]
pub struct MockReply {
    status: u16,
    content_type: &'static str,
    body: String,
}

impl MockReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into(),
        }
    }

    /// JSON error body with a non-2xx status, the way Gemini rejects calls
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.into(),
        }
    }

    /// HTML page, as served by a misconfigured gateway
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body: body.into(),
        }
    }
}

/// One `generateContent` call as the mock saw it
#[derive(Debug, Clone)]
pub struct Call {
    /// Path including the `:generateContent` suffix
    pub path: String,
    /// Decoded `key` query parameter; `None` when the parameter is absent
    pub key: Option<String>,
    pub content_type: Option<String>,
    /// Body exactly as sent
    pub raw_body: String,
    pub body: serde_json::Value,
}

#[derive(Debug, Default)]
struct Inner {
    replies: VecDeque<MockReply>,
    calls: Vec<Call>,
}

/// Handle shared between the mock server and the tests
#[derive(Clone, Default)]
pub struct MockGemini {
    inner: Arc<Mutex<Inner>>,
}

impl MockGemini {
    pub fn queue(&self, reply: MockReply) {
        self.inner.lock().unwrap().replies.push_back(reply);
    }

    /// Calls received since the last `take_calls` or `reset`
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.inner.lock().unwrap().calls)
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.replies.clear();
        inner.calls.clear();
    }

    fn record(&self, call: Call) -> MockReply {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        inner.replies.pop_front().unwrap_or_else(fallback_reply)
    }
}

/// Served when a test queued nothing
fn fallback_reply() -> MockReply {
    MockReply::ok(
        r#"{"candidates":[{"content":{"parts":[{"text":"Default response (no mock queued)"}],"role":"model"},"finishReason":"STOP","index":0}],"usageMetadata":{"promptTokenCount":4,"candidatesTokenCount":5,"totalTokenCount":9}}"#,
    )
}

/// POST /v1beta/models/{model}:generateContent
async fn generate_content(
    State(mock): State<MockGemini>,
    Path(method): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let call = Call {
        path: format!("/v1beta/models/{}", method),
        key: params.get("key").cloned(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        raw_body: String::from_utf8_lossy(&body).into_owned(),
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    };

    let reply = mock.record(call);
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, reply.content_type)], Body::from(reply.body)).into_response()
}

/// GET /v1beta/models/{model}, used by `gemini-proxy test-upstream`
async fn model_info(Path(model): Path<String>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        format!(r#"{{"name":"models/{model}","displayName":"Mock {model}","inputTokenLimit":30720}}"#),
    )
}

/// Bind the mock on 127.0.0.1:`port` and serve it in the background
pub async fn start(port: u16) -> anyhow::Result<MockGemini> {
    let mock = MockGemini::default();

    let app = Router::new()
        .route("/v1beta/models/:method", post(generate_content).get(model_info))
        .route("/health", get(|| async { "OK" }))
        .with_state(mock.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind mock Gemini to {}: {}", addr, e))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("mock Gemini stopped: {}", e);
        }
    });

    Ok(mock)
}
