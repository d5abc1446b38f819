//! Service routes that sit beside the handlers: liveness and a description of what is mounted.

use crate::autodoc::OpenApiDocument;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /health and GET /version. The version body names this crate, the API described by
/// `document` and the endpoints it documents.
pub fn common_routes(document: &OpenApiDocument) -> Router {
    let endpoints: Vec<Value> = document
        .endpoint_methods()
        .into_iter()
        .map(|(path, methods)| json!({"path": path, "methods": methods}))
        .collect();
    let version = Arc::new(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "api": {"title": document.title(), "version": document.version()},
        "endpoints": endpoints,
    }));
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route(
            "/version",
            get(move || {
                let version = version.clone();
                async move { Json((*version).clone()) }
            }),
        )
}
