//! Client for the Gemini `generateContent` endpoint

use bytes::Bytes;
use reqwest::{header, StatusCode};
use std::time::Duration;
use url::Url;

use crate::api::GenerateContentRequest;
use crate::config::{ApiKey, UpstreamConfig};
use crate::error::ProxyError;

/// Raw upstream reply: status plus the decoded body bytes
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Gemini API client bound to one model and one credential
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: ApiKey,
}

/// Build an HTTP client for upstream connections
pub fn build_http_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut client_builder = reqwest::Client::builder().pool_max_idle_per_host(10);

    if let Some(secs) = config.timeout_seconds {
        client_builder = client_builder.timeout(Duration::from_secs(secs));
    }

    client_builder.build()
}

impl GeminiClient {
    pub fn new(http_client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url().to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Build a client with its own HTTP connection pool
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{base}/models/{model}:generateContent?key={api_key}`
    pub fn endpoint(&self) -> Result<Url, ProxyError> {
        self.model_url(":generateContent")
    }

    /// `{base}/models/{model}?key={api_key}`
    pub fn model_info_url(&self) -> Result<Url, ProxyError> {
        self.model_url("")
    }

    fn model_url(&self, method: &str) -> Result<Url, ProxyError> {
        let raw = format!("{}/models/{}{}", self.base_url, self.model, method);
        let mut url = Url::parse(&raw).map_err(|e| {
            ProxyError::UpstreamUnavailable(format!("invalid upstream URL '{}': {}", raw, e))
        })?;
        url.query_pairs_mut().append_pair("key", self.api_key.expose());
        Ok(url)
    }

    /// Endpoint with the key masked, for logging
    pub fn redacted_endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key=<redacted>",
            self.base_url, self.model
        )
    }

    /// Send one `generateContent` call. No retry.
    pub async fn generate_content(
        &self,
        payload: &GenerateContentRequest,
    ) -> Result<UpstreamResponse, ProxyError> {
        let url = self.endpoint()?;
        let body = serde_json::to_vec(payload)?;

        tracing::debug!(
            upstream = %self.redacted_endpoint(),
            body_size = body.len(),
            "Sending request to upstream"
        );

        let response = self
            .http_client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(ProxyError::from_transport)?;

        tracing::debug!(
            status = %status,
            body_size = body.len(),
            "Received response from upstream"
        );

        Ok(UpstreamResponse { status, body })
    }

    /// Fetch model metadata, used to check connectivity and credentials
    pub async fn model_info(&self) -> Result<UpstreamResponse, ProxyError> {
        let url = self.model_info_url()?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(ProxyError::from_transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(ProxyError::from_transport)?;
        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str, key: &str) -> GeminiClient {
        let config = UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: ApiKey::new(key),
            ..UpstreamConfig::default()
        };
        GeminiClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_endpoint_default() {
        let c = client("https://generativelanguage.googleapis.com/v1beta", "abc");
        assert_eq!(
            c.endpoint().unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent?key=abc"
        );
    }

    #[test]
    fn test_endpoint_empty_key() {
        let c = client("https://generativelanguage.googleapis.com/v1beta", "");
        assert!(c.endpoint().unwrap().as_str().ends_with(":generateContent?key="));
    }

    #[test]
    fn test_endpoint_key_is_encoded() {
        let c = client("http://127.0.0.1:9/v1beta/", "a b&c");
        let url = c.endpoint().unwrap();
        let key = url
            .query_pairs()
            .find(|(k, _)| k == "key")
            .map(|(_, v)| v.into_owned());
        assert_eq!(key.as_deref(), Some("a b&c"));
        assert_eq!(url.path(), "/v1beta/models/gemini-pro:generateContent");
    }

    #[test]
    fn test_model_info_url() {
        let c = client("http://127.0.0.1:9/v1beta", "k");
        assert_eq!(
            c.model_info_url().unwrap().as_str(),
            "http://127.0.0.1:9/v1beta/models/gemini-pro?key=k"
        );
    }

    #[test]
    fn test_redacted_endpoint_hides_key() {
        let c = client("http://127.0.0.1:9/v1beta", "secret-key");
        let redacted = c.redacted_endpoint();
        assert!(!redacted.contains("secret-key"));
        assert!(redacted.ends_with("key=<redacted>"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_error_hides_key() {
        // Port 9 (discard) is closed on test hosts
        let c = client("http://127.0.0.1:9/v1beta", "secret-key");
        let payload = GenerateContentRequest::from_prompt(serde_json::json!("hi"));

        let err = c.generate_content(&payload).await.unwrap_err();
        assert!(matches!(err, ProxyError::UpstreamUnavailable(_)));
        assert!(!err.to_string().contains("secret-key"));
    }
}
