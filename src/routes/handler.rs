//! Mounting handlers on a router.

use crate::error::ConfigError;
use crate::extractors::InputOutput;
use crate::handlers::Handler;
use axum::{
    routing::{on, MethodFilter},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest request body a handler accepts by default.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

fn method_filter(handler: &dyn Handler) -> Result<MethodFilter, ConfigError> {
    let mut filter: Option<MethodFilter> = None;
    for method in handler.request_methods() {
        let next = MethodFilter::try_from(method.clone())
            .map_err(|_| ConfigError::Invalid(format!("Unsupported request method '{}'", method)))?;
        filter = Some(match filter {
            Some(existing) => existing.or(next),
            None => next,
        });
    }
    filter.ok_or_else(|| ConfigError::Invalid("Handler does not accept any request methods".into()))
}

/// Mount `handler` at `path` for its request methods.
pub fn handler_routes(path: &str, handler: Arc<dyn Handler>) -> Result<Router, ConfigError> {
    handler_routes_with_limit(path, handler, DEFAULT_BODY_LIMIT)
}

pub fn handler_routes_with_limit(
    path: &str,
    handler: Arc<dyn Handler>,
    body_limit: usize,
) -> Result<Router, ConfigError> {
    let filter = method_filter(handler.as_ref())?;
    let route = on(filter, move |input_output: InputOutput| {
        let handler = handler.clone();
        async move { handler.call(input_output).await }
    });
    Ok(Router::new()
        .route(path, route)
        .layer(RequestBodyLimitLayer::new(body_limit)))
}
