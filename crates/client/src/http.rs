//! HTTP implementation of the backend seam
//!
//! `ApiClient` wraps a `reqwest::Client`, joins endpoint paths onto the
//! configured base URL and attaches the bearer token to every request.

use async_trait::async_trait;
use jobtrack_core::{EngineResult, RecordId};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::backend::{Backend, collection_path, download_path, record_path};
use crate::config::ClientConfig;
use crate::error::ClientError;

// ============================================================================
// API Client
// ============================================================================

/// HTTP client for the job tracker REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying reqwest HTTP client
    client: Client,
    /// Base URL of the backend API; always ends with `/`
    base_url: Url,
    /// Optional bearer token for authenticated requests
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("bad base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
        })
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Clear the bearer token
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build the full URL for a path relative to the base URL
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidRequest(format!("bad path '{}': {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    // ========================================================================
    // Generic request helpers
    // ========================================================================

    /// Send a request and return the raw successful response
    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = req.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let code = status.as_u16();
            let reason = status.canonical_reason();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Backend returned {} ({})", code, reason.unwrap_or("unknown"));
            Err(ClientError::from_response(code, reason, &body))
        }
    }

    /// Send a request and parse the JSON body (empty body is `null`)
    async fn send_json(&self, req: RequestBuilder) -> Result<Value, ClientError> {
        let response = self.send(req).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait(?Send)]
impl Backend for ApiClient {
    async fn list(&self, endpoint: &str, query: &[(&str, &str)]) -> EngineResult<Vec<Value>> {
        let url = self.url(&collection_path(endpoint), query)?;
        tracing::debug!("GET {}", url);
        match self.send_json(self.request(Method::GET, url)).await? {
            Value::Array(items) => Ok(items),
            // Paginated responses carry the rows under `results`
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(ClientError::Parse("expected a list of records".to_string()).into()),
            },
            Value::Null => Ok(Vec::new()),
            _ => Err(ClientError::Parse("expected a list of records".to_string()).into()),
        }
    }

    async fn get(&self, endpoint: &str, id: &RecordId) -> EngineResult<Value> {
        let url = self.url(&record_path(endpoint, id), &[])?;
        tracing::debug!("GET {}", url);
        Ok(self.send_json(self.request(Method::GET, url)).await?)
    }

    async fn create(&self, endpoint: &str, body: &Value) -> EngineResult<Value> {
        let url = self.url(&collection_path(endpoint), &[])?;
        tracing::debug!("POST {}", url);
        Ok(self
            .send_json(self.request(Method::POST, url).json(body))
            .await?)
    }

    async fn update(&self, endpoint: &str, id: &RecordId, body: &Value) -> EngineResult<Value> {
        let url = self.url(&record_path(endpoint, id), &[])?;
        tracing::debug!("PUT {}", url);
        Ok(self
            .send_json(self.request(Method::PUT, url).json(body))
            .await?)
    }

    async fn delete(&self, endpoint: &str, id: &RecordId) -> EngineResult<()> {
        let url = self.url(&record_path(endpoint, id), &[])?;
        tracing::debug!("DELETE {}", url);
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn download_file(&self, id: &RecordId) -> EngineResult<Vec<u8>> {
        let url = self.url(&download_path(id), &[])?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.request(Method::GET, url)).await?;
        let bytes = response.bytes().await.map_err(ClientError::from)?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::default().with_base_url(base);
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_joins_onto_base() {
        let api = client("http://localhost:8000/api/");
        let url = api.url("applications/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/applications/");

        let url = api.url("files/3/download", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/files/3/download");
    }

    #[test]
    fn test_url_encodes_query() {
        let api = client("http://localhost:8000/api/");
        let url = api
            .url("contacts/", &[("company", "4"), ("search", "jane doe")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/contacts/?company=4&search=jane+doe"
        );
    }

    #[test]
    fn test_token_from_config() {
        let config = ClientConfig::default().with_token("secret");
        let api = ApiClient::new(&config).unwrap();
        assert_eq!(api.token.as_deref(), Some("secret"));

        let mut api = api;
        api.clear_token();
        assert!(api.token.is_none());
    }
}
