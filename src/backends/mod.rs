//! Storage adapters. A [`Backend`] turns model operations into calls against some store.

mod api;
mod memory;
mod restful_api_advanced_search;

pub use api::ApiClient;
pub use memory::MemoryBackend;
pub use restful_api_advanced_search::RestfulApiAdvancedSearchBackend;

use crate::autodoc::Schema;
use crate::case::CaseMapping;
use crate::error::BackendError;
use crate::model::ModelSchema;
use crate::query::QueryConfiguration;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Store a new record and return it as stored.
    async fn create(&self, data: Map<String, Value>, model: &ModelSchema) -> Result<Map<String, Value>, BackendError>;

    /// Apply `data` to the record `id`. `existing` is the record's current backend data.
    async fn update(
        &self,
        id: &Value,
        data: Map<String, Value>,
        existing: &Map<String, Value>,
        model: &ModelSchema,
    ) -> Result<Map<String, Value>, BackendError>;

    async fn delete(&self, id: &Value, model: &ModelSchema) -> Result<(), BackendError>;

    async fn count(&self, query: &QueryConfiguration, model: &ModelSchema) -> Result<usize, BackendError>;

    /// Matching records. When `next_page` is given it receives the pagination data for the
    /// following page, and is left empty on the last page.
    async fn records(
        &self,
        query: &QueryConfiguration,
        model: &ModelSchema,
        next_page: Option<&mut Map<String, Value>>,
    ) -> Result<Vec<Map<String, Value>>, BackendError>;

    fn allowed_pagination_keys(&self) -> Vec<&'static str> {
        vec!["start"]
    }

    /// Empty string when `data` (internally cased) is acceptable pagination input.
    fn validate_pagination_data(&self, data: &Map<String, Value>, casing: &CaseMapping) -> String {
        let allowed = self.allowed_pagination_keys();
        let extra: Vec<String> = data
            .keys()
            .filter(|k| !allowed.contains(&k.as_str()))
            .map(|k| format!("'{}'", casing.to_external(k)))
            .collect();
        if !extra.is_empty() {
            return format!(
                "Invalid pagination key(s): {}. Only '{}' is allowed",
                extra.join(", "),
                casing.to_external("start")
            );
        }
        match data.get("start") {
            None => String::new(),
            Some(Value::Number(n)) if n.is_u64() => String::new(),
            Some(Value::String(s)) if s.trim().parse::<u64>().is_ok() => String::new(),
            Some(_) => format!(
                "Invalid pagination data: '{}' must be a non-negative integer",
                casing.to_external("start")
            ),
        }
    }

    /// Children of the `next_page` object in responses.
    fn documentation_pagination_next_page_response(&self, casing: &CaseMapping) -> Vec<Schema> {
        vec![Schema::integer(casing.to_external("start")).with_example(Value::from(0))]
    }

    /// Request parameters that select a page, with their descriptions.
    fn documentation_pagination_parameters(&self, casing: &CaseMapping) -> Vec<(Schema, String)> {
        vec![(
            Schema::integer(casing.to_external("start")).with_example(Value::from(0)),
            "The zero-indexed record number to start listing results from".to_string(),
        )]
    }
}
