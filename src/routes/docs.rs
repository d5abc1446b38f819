//! Serves the rendered OpenAPI document.

use crate::autodoc::OpenApiDocument;
use crate::error::ConfigError;
use axum::{routing::get, Json, Router};
use std::sync::Arc;

/// Serve `document` as JSON at `path`. Rendered once, up front.
pub fn docs_routes(path: &str, document: &OpenApiDocument) -> Result<Router, ConfigError> {
    let rendered = Arc::new(document.to_value()?);
    Ok(Router::new().route(
        path,
        get(move || {
            let rendered = rendered.clone();
            async move { Json((*rendered).clone()) }
        }),
    ))
}
