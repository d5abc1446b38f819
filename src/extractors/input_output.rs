//! Request context handed to authentication and handlers: headers, query parameters, the raw
//! body and whatever identity authentication attached.

use crate::error::{AppError, ClientError};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Bytes},
    extract::{FromRequest, Query, Request},
    http::{header::HeaderName, HeaderMap, HeaderValue, Method},
};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct InputOutput {
    method: Method,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Bytes,
    authorization_data: Map<String, Value>,
}

impl InputOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Headers that are not valid HTTP are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json_body(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query_parameters(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Header lookup is case-insensitive.
    pub fn request_header(&self, name: &str, required: bool) -> Result<Option<String>, ClientError> {
        let value = self
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match value {
            None if required => Err(ClientError::new(format!("Missing required header '{}'", name))),
            other => Ok(other),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parsed JSON body. An empty body is `None`, or an error when `required`.
    pub fn json_body(&self, required: bool) -> Result<Option<Value>, ClientError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            if required {
                return Err(ClientError::new("Request body was not valid JSON"));
            }
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|_| ClientError::new("Request body was not valid JSON"))
    }

    pub fn set_authorization_data(&mut self, data: Map<String, Value>) {
        self.authorization_data = data;
    }

    pub fn authorization_data(&self) -> &Map<String, Value> {
        &self.authorization_data
    }
}

#[async_trait]
impl<S> FromRequest<S> for InputOutput
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        let body = to_bytes(body, usize::MAX)
            .await
            .map_err(|e| ClientError::new(format!("Could not read request body: {}", e)))?;
        Ok(InputOutput {
            method: parts.method,
            headers: parts.headers,
            query,
            body,
            authorization_data: Map::new(),
        })
    }
}
