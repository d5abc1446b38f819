//! Models bound to a backend: [`Models`] builds queries, [`Model`] is one record.

use crate::backends::Backend;
use crate::columns::Columns;
use crate::error::{BackendError, ConfigError};
use crate::query::{Condition, QueryConfiguration, Sort, SortDirection};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Static description of a model: its columns and where its records live.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSchema {
    pub name: String,
    /// Table for storage backends; resource URL or path for API backends.
    pub table_name: String,
    pub id_column_name: String,
    pub columns: Columns,
}

impl ModelSchema {
    pub fn new(name: impl Into<String>, columns: Columns) -> Self {
        let name = name.into();
        ModelSchema {
            table_name: name.clone(),
            name,
            id_column_name: "id".to_string(),
            columns,
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    pub fn with_id_column_name(mut self, id_column_name: impl Into<String>) -> Self {
        self.id_column_name = id_column_name.into();
        self
    }

    fn check_column(&self, column: &str) -> Result<(), ConfigError> {
        if column == self.id_column_name || self.columns.contains(column) {
            Ok(())
        } else {
            Err(ConfigError::UnknownColumn {
                model: self.name.clone(),
                column: column.to_string(),
            })
        }
    }
}

/// Query builder for one model. Every builder method returns a new value, so a configured
/// `Models` can be shared and refined without affecting other users.
#[derive(Clone)]
pub struct Models {
    schema: Arc<ModelSchema>,
    backend: Arc<dyn Backend>,
    query: QueryConfiguration,
}

impl fmt::Debug for Models {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Models")
            .field("model", &self.schema.name)
            .field("query", &self.query)
            .finish()
    }
}

impl Models {
    pub fn new(schema: ModelSchema, backend: Arc<dyn Backend>) -> Self {
        Models {
            schema: Arc::new(schema),
            backend,
            query: QueryConfiguration::default(),
        }
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn query(&self) -> &QueryConfiguration {
        &self.query
    }

    fn with_query(&self, query: QueryConfiguration) -> Self {
        Models {
            schema: self.schema.clone(),
            backend: self.backend.clone(),
            query,
        }
    }

    /// Add a condition written as a string, e.g. `age<=25`.
    pub fn where_(&self, condition: &str) -> Result<Self, ConfigError> {
        self.where_condition(Condition::parse(condition)?)
    }

    pub fn where_condition(&self, condition: Condition) -> Result<Self, ConfigError> {
        self.schema.check_column(&condition.column)?;
        let mut query = self.query.clone();
        query.wheres.push(condition);
        Ok(self.with_query(query))
    }

    /// Replace any existing sort.
    pub fn sort_by(&self, column: &str, direction: SortDirection) -> Result<Self, ConfigError> {
        self.schema.check_column(column)?;
        let mut query = self.query.clone();
        query.sorts = vec![Sort::new(column, direction)];
        Ok(self.with_query(query))
    }

    /// Add a lower-priority sort after the existing ones.
    pub fn then_sort_by(&self, column: &str, direction: SortDirection) -> Result<Self, ConfigError> {
        self.schema.check_column(column)?;
        let mut query = self.query.clone();
        query.sorts.push(Sort::new(column, direction));
        Ok(self.with_query(query))
    }

    pub fn limit(&self, limit: usize) -> Self {
        let mut query = self.query.clone();
        query.limit = Some(limit);
        self.with_query(query)
    }

    pub fn pagination(&self, pagination: Map<String, Value>) -> Self {
        let mut query = self.query.clone();
        query.pagination = pagination;
        self.with_query(query)
    }

    fn wrap(&self, data: Map<String, Value>) -> Model {
        Model {
            schema: self.schema.clone(),
            backend: self.backend.clone(),
            data,
        }
    }

    pub async fn records(&self) -> Result<Vec<Model>, BackendError> {
        let rows = self.backend.records(&self.query, &self.schema, None).await?;
        Ok(rows.into_iter().map(|row| self.wrap(row)).collect())
    }

    /// Records plus the pagination data for the next page (empty when this is the last page).
    pub async fn records_with_next_page(&self) -> Result<(Vec<Model>, Map<String, Value>), BackendError> {
        let mut next_page = Map::new();
        let rows = self
            .backend
            .records(&self.query, &self.schema, Some(&mut next_page))
            .await?;
        Ok((rows.into_iter().map(|row| self.wrap(row)).collect(), next_page))
    }

    pub async fn count(&self) -> Result<usize, BackendError> {
        self.backend.count(&self.query, &self.schema).await
    }

    pub async fn first(&self) -> Result<Option<Model>, BackendError> {
        Ok(self.limit(1).records().await?.into_iter().next())
    }

    pub async fn find(&self, condition: &str) -> Result<Option<Model>, BackendError> {
        self.where_(condition)?.first().await
    }

    pub fn empty_model(&self) -> Model {
        self.wrap(Map::new())
    }

    pub async fn create(&self, data: Map<String, Value>) -> Result<Model, BackendError> {
        let mut model = self.empty_model();
        model.save(data).await?;
        Ok(model)
    }
}

/// One record. Data is held in backend form and converted on the way out.
#[derive(Clone)]
pub struct Model {
    schema: Arc<ModelSchema>,
    backend: Arc<dyn Backend>,
    data: Map<String, Value>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("model", &self.schema.name)
            .field("data", &self.data)
            .finish()
    }
}

impl Model {
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn id(&self) -> Option<&Value> {
        self.data.get(&self.schema.id_column_name).filter(|v| !v.is_null())
    }

    pub fn exists(&self) -> bool {
        self.id().is_some()
    }

    /// Application value for `key`; null when unset.
    pub fn get(&self, key: &str) -> Value {
        match (self.data.get(key), self.schema.columns.get(key)) {
            (Some(value), Some(column)) => column.from_backend(value),
            (Some(value), None) => value.clone(),
            (None, _) => Value::Null,
        }
    }

    pub fn data(&self) -> Map<String, Value> {
        self.schema.columns.from_backend(self.data.clone())
    }

    pub fn raw_data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn input_errors(&self, data: &Map<String, Value>) -> HashMap<String, String> {
        self.schema.columns.input_errors(data, self.exists())
    }

    /// Create or update. Input is not validated here; callers check `input_errors` first.
    pub async fn save(&mut self, data: Map<String, Value>) -> Result<(), BackendError> {
        let data = self.schema.columns.to_backend(data);
        let saved = match self.id().cloned() {
            Some(id) => self.backend.update(&id, data, &self.data, &self.schema).await?,
            None => self.backend.create(data, &self.schema).await?,
        };
        self.data = saved;
        Ok(())
    }

    pub async fn delete(&mut self) -> Result<(), BackendError> {
        let Some(id) = self.id().cloned() else {
            return Err(BackendError::NotFound(format!(
                "cannot delete a {} that was never saved",
                self.schema.name
            )));
        };
        self.backend.delete(&id, &self.schema).await?;
        self.data = Map::new();
        Ok(())
    }
}
