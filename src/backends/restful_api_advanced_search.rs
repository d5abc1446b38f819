//! Backend for REST APIs that expose an advanced-search endpoint:
//! `POST <resource>/search`, `POST <resource>`, `PATCH|DELETE <resource>/<id>`.

use super::{ApiClient, Backend};
use crate::column_types::condition_value;
use crate::error::BackendError;
use crate::model::ModelSchema;
use crate::query::QueryConfiguration;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};

#[derive(Clone, Debug)]
pub struct RestfulApiAdvancedSearchBackend {
    api: ApiClient,
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn object(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

impl RestfulApiAdvancedSearchBackend {
    pub fn new(api: ApiClient) -> Self {
        RestfulApiAdvancedSearchBackend { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn resource_url(&self, model: &ModelSchema) -> String {
        self.api.url(&model.table_name)
    }

    fn record_url(&self, id: &Value, model: &ModelSchema) -> String {
        format!("{}/{}", self.resource_url(model), condition_value(id))
    }

    fn search_url(&self, model: &ModelSchema) -> String {
        format!("{}/search", self.resource_url(model))
    }

    fn check_query(query: &QueryConfiguration) -> Result<(), BackendError> {
        let mut unsupported = Vec::new();
        if query.group_by_column.is_some() {
            unsupported.push("group_by_column");
        }
        if !query.selects.is_empty() {
            unsupported.push("selects");
        }
        if !query.joins.is_empty() {
            unsupported.push("joins");
        }
        if unsupported.is_empty() {
            Ok(())
        } else {
            Err(BackendError::Unsupported(format!(
                "RestfulApiAdvancedSearchBackend does not support: {}",
                unsupported.join(", ")
            )))
        }
    }

    /// Search request body. Empty lists, a zero start and a missing limit are left out.
    pub fn as_post_data(query: &QueryConfiguration) -> Map<String, Value> {
        let wheres: Vec<Value> = query
            .wheres
            .iter()
            .map(|condition| {
                let mut entry = Map::new();
                entry.insert("column".into(), Value::String(condition.column.clone()));
                entry.insert("operator".into(), Value::String(condition.operator.clone()));
                entry.insert("value".into(), condition.value().cloned().unwrap_or(Value::Null));
                Value::Object(entry)
            })
            .collect();
        let sorts: Vec<Value> = query
            .sorts
            .iter()
            .map(|sort| {
                let mut entry = Map::new();
                entry.insert("column".into(), Value::String(sort.column.clone()));
                entry.insert("direction".into(), Value::String(sort.direction.as_str().to_string()));
                Value::Object(entry)
            })
            .collect();
        let candidates = [
            ("where", Value::Array(wheres)),
            ("sort", Value::Array(sorts)),
            ("start", Value::from(query.start())),
            ("limit", query.limit.map(Value::from).unwrap_or(Value::Null)),
        ];
        candidates
            .into_iter()
            .filter(|(_, value)| is_truthy(value))
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[async_trait]
impl Backend for RestfulApiAdvancedSearchBackend {
    async fn create(&self, data: Map<String, Value>, model: &ModelSchema) -> Result<Map<String, Value>, BackendError> {
        let response = self
            .api
            .execute(Method::POST, &self.resource_url(model), Some(&Value::Object(data)), false)
            .await?;
        object(response)
            .and_then(|mut r| r.remove("data"))
            .and_then(object)
            .ok_or_else(|| BackendError::UnexpectedResponse("Unexpected API response to create request".into()))
    }

    async fn update(
        &self,
        id: &Value,
        data: Map<String, Value>,
        existing: &Map<String, Value>,
        model: &ModelSchema,
    ) -> Result<Map<String, Value>, BackendError> {
        let body = Value::Object(data.clone());
        let response = self
            .api
            .execute(Method::PATCH, &self.record_url(id, model), Some(&body), false)
            .await?;
        if response.is_null() {
            let mut merged = existing.clone();
            merged.extend(data);
            return Ok(merged);
        }
        object(response)
            .and_then(|mut r| r.remove("data"))
            .and_then(object)
            .ok_or_else(|| BackendError::UnexpectedResponse("Unexpected API response to update request".into()))
    }

    async fn delete(&self, id: &Value, model: &ModelSchema) -> Result<(), BackendError> {
        let response = self
            .api
            .execute(Method::DELETE, &self.record_url(id, model), Some(&Value::Object(Map::new())), false)
            .await?;
        match response.get("status") {
            Some(status) if status == "success" => Ok(()),
            Some(status) => Err(BackendError::RequestFailed {
                status: 200,
                message: format!("delete reported status {}", status),
            }),
            None => Err(BackendError::UnexpectedResponse(
                "Unexpected response to delete API request".into(),
            )),
        }
    }

    async fn count(&self, query: &QueryConfiguration, model: &ModelSchema) -> Result<usize, BackendError> {
        Self::check_query(query)?;
        let mut body = Map::new();
        body.insert("count_only".into(), Value::Bool(true));
        body.extend(Self::as_post_data(query));
        let response = self
            .api
            .execute(Method::POST, &self.search_url(model), Some(&Value::Object(body)), true)
            .await?;
        response
            .get("total_matches")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| {
                BackendError::UnexpectedResponse("Unexpected API response when executing count request".into())
            })
    }

    async fn records(
        &self,
        query: &QueryConfiguration,
        model: &ModelSchema,
        next_page: Option<&mut Map<String, Value>>,
    ) -> Result<Vec<Map<String, Value>>, BackendError> {
        Self::check_query(query)?;
        let body = Value::Object(Self::as_post_data(query));
        let response = self
            .api
            .execute(Method::POST, &self.search_url(model), Some(&body), true)
            .await?;
        let unexpected = || BackendError::UnexpectedResponse("Unexpected response from records request".into());
        let rows = match object(response).and_then(|mut r| r.remove("data")) {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .map(|row| object(row).ok_or_else(unexpected))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(unexpected()),
        };
        if let (Some(next_page), Some(limit)) = (next_page, query.limit) {
            if limit > 0 && rows.len() == limit {
                if let Some(start) = query.start().checked_add(limit) {
                    next_page.insert("start".into(), Value::from(start));
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Condition, Sort, SortDirection};
    use serde_json::json;

    #[test]
    fn post_data_drops_empty_entries() {
        assert!(RestfulApiAdvancedSearchBackend::as_post_data(&QueryConfiguration::default()).is_empty());

        let query = QueryConfiguration {
            wheres: vec![Condition::new("age", "<", vec![json!(7)])],
            sorts: vec![Sort::new("email", SortDirection::Desc)],
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            json!({
                "where": [{"column": "age", "operator": "<", "value": 7}],
                "sort": [{"column": "email", "direction": "DESC"}],
                "limit": 10
            }),
            Value::Object(RestfulApiAdvancedSearchBackend::as_post_data(&query))
        );
    }

    #[test]
    fn unsupported_query_features() {
        let query = QueryConfiguration {
            selects: vec!["count(*)".into()],
            group_by_column: Some("age".into()),
            ..Default::default()
        };
        let err = RestfulApiAdvancedSearchBackend::check_query(&query).unwrap_err();
        assert_eq!(
            "RestfulApiAdvancedSearchBackend does not support: group_by_column, selects",
            err.to_string()
        );
    }
}
