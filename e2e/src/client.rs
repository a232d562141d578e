//! Front-end side of the tests: talks to the spawned proxy over HTTP

use reqwest::{header::HeaderMap, Client, Method};
use serde_json::Value;

/// What the proxy answered
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: HeaderMap,
    pub raw_body: String,
    /// Parsed body; a non-JSON body is kept as a JSON string
    pub body: Value,
}

impl Reply {
    /// Walk the body with a dotted path, e.g. `candidates.0.finishReason`
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.body, |value, part| match part.parse::<usize>() {
            Ok(idx) => value.as_array()?.get(idx),
            Err(_) => value.as_object()?.get(part),
        })
    }

    pub fn field_str(&self, path: &str) -> Option<&str> {
        self.field(path)?.as_str()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Client bound to one running proxy
#[derive(Clone)]
pub struct ProxyClient {
    http: Client,
    base: String,
}

impl ProxyClient {
    pub fn new(addr: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base: format!("http://{}", addr),
        })
    }

    /// POST /generate with a JSON body
    pub async fn generate(&self, body: Value) -> anyhow::Result<Reply> {
        self.generate_raw(body.to_string()).await
    }

    /// POST /generate with arbitrary bytes labelled as JSON
    pub async fn generate_raw(&self, body: impl Into<String>) -> anyhow::Result<Reply> {
        let resp = self
            .http
            .post(format!("{}/generate", self.base))
            .header("Content-Type", "application/json")
            .body(body.into())
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("POST /generate failed: {}", e))?;
        read(resp).await
    }

    /// Browser-style CORS preflight for POST /generate
    pub async fn preflight(&self, origin: &str) -> anyhow::Result<Reply> {
        let resp = self
            .http
            .request(Method::OPTIONS, format!("{}/generate", self.base))
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("OPTIONS /generate failed: {}", e))?;
        read(resp).await
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Reply> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("GET {} failed: {}", path, e))?;
        read(resp).await
    }
}

async fn read(resp: reqwest::Response) -> anyhow::Result<Reply> {
    let status = resp.status().as_u16();
    let headers = resp.headers().clone();
    let raw_body = resp.text().await?;
    let body = serde_json::from_str(&raw_body).unwrap_or_else(|_| Value::String(raw_body.clone()));

    Ok(Reply {
        status,
        headers,
        raw_body,
        body,
    })
}
