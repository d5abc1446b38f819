//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::case::CaseMapping;
use crate::response::envelope;

/// Mistakes in how columns, models, handlers or the environment were wired together.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
    #[error("unknown column '{column}' for model '{model}'")]
    UnknownColumn { model: String, column: String },
    #[error("Could not find requested environment variable '{0}'")]
    MissingEnvironment(String),
    #[error("environment file: {0}")]
    EnvironmentFile(String),
}

/// A problem with the caller's request. The message is shown to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ClientError(pub String);

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        ClientError(message.into())
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed request. Status code: {status}, message: {message}")]
    RequestFailed { status: u16, message: String },
    #[error("{0}")]
    UnexpectedResponse(String),
    #[error("{0}")]
    Unsupported(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Client(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status string and caller-facing message. Server-side details stay in the logs.
    pub fn public_parts(&self) -> (&'static str, String) {
        match self {
            AppError::Client(e) => ("client_error", e.to_string()),
            AppError::Config(_) | AppError::Backend(_) => ("failure", "Internal server error".to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !matches!(self, AppError::Client(_)) {
            tracing::error!(error = %self, "request failed");
        }
        let (status_name, message) = self.public_parts();
        let body = envelope(status_name, &message, &CaseMapping::default());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_display_is_verbatim() {
        let e = ClientError::new("No matching keys found");
        assert_eq!("No matching keys found", e.to_string());
        let app: AppError = e.into();
        assert_eq!(StatusCode::BAD_REQUEST, app.status());
        assert_eq!(("client_error", "No matching keys found".to_string()), app.public_parts());
    }

    #[test]
    fn backend_errors_hide_details() {
        let app: AppError = BackendError::UnexpectedResponse("Unexpected response from records request".into()).into();
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, app.status());
        assert_eq!("Internal server error", app.public_parts().1);
    }
}
