//! Router builders: one per handler, the OpenAPI document and the service routes.

pub mod common;
pub mod docs;
pub mod handler;

pub use common::common_routes;
pub use docs::docs_routes;
pub use handler::{handler_routes, handler_routes_with_limit, DEFAULT_BODY_LIMIT};
