//! Auto-documentation: schema trees produced by columns, handlers and backends, and their
//! rendering as an OpenAPI document.

pub mod openapi;
pub mod request;
pub mod schema;

pub use openapi::OpenApiDocument;
pub use request::{Parameter, ParameterLocation, RequestDoc, ResponseDoc};
pub use schema::{Schema, SchemaType};
