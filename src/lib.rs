//! Declarest: declarative models, typed columns, authentication schemes and search handlers
//! on top of axum.

pub mod authentication;
pub mod autodoc;
pub mod backends;
pub mod case;
pub mod column_types;
pub mod columns;
pub mod config;
pub mod environment;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod input_requirements;
pub mod model;
pub mod query;
pub mod response;
pub mod routes;

pub use authentication::{Auth0Jwks, Authentication, Authorization, Jwks, Public, SecretBearer};
pub use autodoc::OpenApiDocument;
pub use backends::{ApiClient, Backend, MemoryBackend, RestfulApiAdvancedSearchBackend};
pub use case::{CaseMapping, Casing};
pub use column_types::{Column, ColumnKind};
pub use columns::Columns;
pub use config::{ColumnDefinition, InputRequirementSpec};
pub use environment::Environment;
pub use error::{AppError, BackendError, ClientError, ConfigError};
pub use extractors::InputOutput;
pub use handlers::{AdvancedSearch, AdvancedSearchConfig, Handler, HandlerConfig};
pub use model::{Model, ModelSchema, Models};
pub use query::{Condition, QueryConfiguration, Sort, SortDirection};
pub use response::HandlerResponse;
pub use routes::{common_routes, docs_routes, handler_routes};
