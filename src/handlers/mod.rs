//! Handlers: one HTTP endpoint each. The shared [`Handler::call`] runs authentication and
//! authorization, then the handler's own logic, and maps errors onto the response envelope.

pub mod advanced_search;

pub use advanced_search::{AdvancedSearch, AdvancedSearchConfig};

use crate::authentication::{Authentication, Authorization, Public};
use crate::autodoc::RequestDoc;
use crate::case::{CaseMapping, Casing};
use crate::error::{AppError, ConfigError};
use crate::extractors::InputOutput;
use crate::response::{self, HandlerResponse};
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
];

/// Settings every handler shares. The builder methods are the declarative "decorators":
/// `HandlerConfig::new(auth).casing(..).response_header(..)`.
#[derive(Clone)]
pub struct HandlerConfig {
    pub authentication: Arc<dyn Authentication>,
    pub authorization: Option<Arc<dyn Authorization>>,
    pub casing: CaseMapping,
    pub response_headers: Vec<(HeaderName, HeaderValue)>,
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("authentication", &self.authentication.documentation_security_scheme_name())
            .field("authorization", &self.authorization.is_some())
            .field("casing", &self.casing)
            .field("response_headers", &self.response_headers)
            .finish()
    }
}

impl HandlerConfig {
    pub fn new(authentication: Arc<dyn Authentication>) -> Self {
        HandlerConfig {
            authentication,
            authorization: None,
            casing: CaseMapping::default(),
            response_headers: Vec::new(),
        }
    }

    pub fn public() -> Self {
        HandlerConfig::new(Arc::new(Public))
    }

    pub fn authorization(mut self, authorization: Arc<dyn Authorization>) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn casing(mut self, internal: Casing, external: Casing) -> Self {
        self.casing = CaseMapping::new(internal, external);
        self
    }

    pub fn response_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let header_name = HeaderName::try_from(name)
            .map_err(|_| ConfigError::Invalid(format!("Invalid response header name '{}'", name)))?;
        let header_value = HeaderValue::try_from(value).map_err(|_| {
            ConfigError::Invalid(format!("Invalid value for response header '{}'", name))
        })?;
        self.response_headers.push((header_name, header_value));
        Ok(self)
    }

    /// Hardening headers for JSON APIs. Any header already configured keeps its value.
    pub fn security_headers(mut self) -> Self {
        for (name, value) in SECURITY_HEADERS {
            let name = HeaderName::from_static(name);
            if !self.response_headers.iter().any(|(existing, _)| *existing == name) {
                self.response_headers.push((name, HeaderValue::from_static(value)));
            }
        }
        self
    }

    /// Security scheme name and definition for the docs, when the scheme documents itself.
    pub fn security_schemes(&self) -> Vec<(String, Value)> {
        match (
            self.authentication.documentation_security_scheme_name(),
            self.authentication.documentation_security_scheme(),
        ) {
            (Some(name), Some(scheme)) => vec![(name, scheme)],
            _ => Vec::new(),
        }
    }
}

#[async_trait]
pub trait Handler: Send + Sync {
    fn config(&self) -> &HandlerConfig;

    fn request_methods(&self) -> Vec<Method>;

    /// Handler-specific work, after authentication and authorization passed.
    async fn handle(&self, input_output: &mut InputOutput) -> Result<HandlerResponse, AppError>;

    fn documentation(&self) -> Vec<RequestDoc>;

    fn documentation_security_schemes(&self) -> Vec<(String, Value)> {
        self.config().security_schemes()
    }

    /// Full request cycle. Never fails: every error becomes an enveloped response.
    async fn call(&self, mut input_output: InputOutput) -> HandlerResponse {
        let config = self.config();
        let casing = &config.casing;
        let response = match config.authentication.authenticate(&mut input_output).await {
            Ok(false) => {
                tracing::warn!("request was not authenticated");
                response::client_error("Not Authenticated", StatusCode::UNAUTHORIZED, casing)
            }
            Err(AppError::Client(e)) => {
                tracing::warn!(error = %e, "authentication rejected request");
                response::client_error(&e.0, StatusCode::UNAUTHORIZED, casing)
            }
            Err(e) => {
                tracing::error!(error = %e, "authentication failed");
                response::failure(casing)
            }
            Ok(true) => {
                let authorized = config
                    .authorization
                    .as_ref()
                    .map_or(true, |a| a.gate(input_output.authorization_data()));
                if authorized {
                    match self.handle(&mut input_output).await {
                        Ok(response) => response,
                        Err(AppError::Client(e)) => {
                            response::client_error(&e.0, StatusCode::BAD_REQUEST, casing)
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "handler failed");
                            response::failure(casing)
                        }
                    }
                } else {
                    tracing::warn!("request was not authorized");
                    response::client_error("Not Authorized", StatusCode::UNAUTHORIZED, casing)
                }
            }
        };
        response.with_headers(&config.response_headers)
    }
}
