//! Demo server: a `users` model on the memory backend, searchable through AdvancedSearch,
//! with the OpenAPI document at /docs.
//!
//! Set `API_SECRET` (process environment or `.env`) to require a bearer token.

use declarest::{
    common_routes, docs_routes, handler_routes, AdvancedSearch, AdvancedSearchConfig, Authentication,
    Casing, ColumnDefinition, Columns, Environment, Handler, HandlerConfig, MemoryBackend, ModelSchema,
    Models, OpenApiDocument, Public, SecretBearer,
};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn user_columns() -> Result<Columns, Box<dyn std::error::Error>> {
    let definitions: Vec<(String, ColumnDefinition)> = serde_json::from_value(json!([
        ["id", {"class": "integer"}],
        ["name", {"class": "string", "input_requirements": ["required", ["maximum_length", 255]]}],
        ["email", {"class": "email", "input_requirements": ["required"]}],
        ["age", {"class": "integer", "input_requirements": [["minimum_value", 0]]}],
        ["created_at", {"class": "datetime"}]
    ]))?;
    Ok(Columns::configure(&definitions, &[])?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("declarest=info".parse()?))
        .init();

    let environment = Arc::new(if std::path::Path::new(".env").exists() {
        Environment::from_env_file(".env")?
    } else {
        Environment::new()
    });
    let authentication: Arc<dyn Authentication> = match environment.get("API_SECRET", true)? {
        Some(_) => Arc::new(SecretBearer::from_environment(environment.clone(), "API_SECRET")),
        None => Arc::new(Public),
    };

    let users = Models::new(ModelSchema::new("users", user_columns()?), Arc::new(MemoryBackend::new()));
    for (name, email, age) in [
        ("ronoc", "cmancone1@example.com", 6),
        ("conor", "cmancone2@example.com", 8),
        ("ronoc", "cmancone3@example.com", 25),
    ] {
        let data = json!({"name": name, "email": email, "age": age, "created_at": "2024-01-01T00:00:00Z"});
        users.create(data.as_object().cloned().unwrap_or_default()).await?;
    }

    let search: Arc<dyn Handler> = Arc::new(AdvancedSearch::configure(
        AdvancedSearchConfig::new(users, ["id", "name", "email", "age", "created_at"], ["name", "email", "age"], "name"),
        HandlerConfig::new(authentication)
            .casing(Casing::Snake, Casing::Camel)
            .response_header("cache-control", "no-store")?,
    )?);
    let document = OpenApiDocument::new("declarest demo", env!("CARGO_PKG_VERSION"))
        .with_handler("/users/search", search.as_ref());

    let app = Router::new()
        .merge(common_routes(&document))
        .merge(docs_routes("/docs", &document)?)
        .merge(handler_routes("/users/search", search)?);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
