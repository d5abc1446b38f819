//! Shared REST plumbing for API-backed backends.

use crate::authentication::Authentication;
use crate::error::BackendError;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    authentication: Option<Arc<dyn Authentication>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.authentication.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authentication: None,
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Attach credentials to every outbound request.
    pub fn with_authentication(mut self, authentication: Arc<dyn Authentication>) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `path` relative to the base URL. Absolute URLs are returned unchanged.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_end_matches('/');
        if path.starts_with("http://") || path.starts_with("https://") || self.base_url.is_empty() {
            return path.to_string();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, method: &Method, url: &str, body: Option<&Value>) -> Result<reqwest::Response, BackendError> {
        let mut request = self.client.request(method.clone(), url);
        if let Some(authentication) = &self.authentication {
            for (name, value) in authentication.headers()? {
                request = request.header(name, value);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Execute a request and parse the JSON response. An empty body parses as null.
    /// With `retry_auth`, a 401 clears cached credentials and the request is tried once more.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        retry_auth: bool,
    ) -> Result<Value, BackendError> {
        tracing::debug!(%method, url, "api request");
        let mut response = self.send(&method, url, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED && retry_auth {
            if let Some(authentication) = &self.authentication {
                tracing::debug!(url, "retrying api request after clearing credentials");
                authentication.clear_credential_cache();
                response = self.send(&method, url, body).await?;
            }
        }

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::RequestFailed {
                status: status.as_u16(),
                message: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| BackendError::UnexpectedResponse(format!("Response from {} was not valid JSON: {}", url, e)))
    }
}
