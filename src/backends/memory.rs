//! In-process backend: rows kept per table behind a lock. Used for tests and demos.

use super::Backend;
use crate::error::BackendError;
use crate::model::ModelSchema;
use crate::query::{Condition, QueryConfiguration, SortDirection};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Map<String, Value>>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Table>>,
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Storage("memory backend lock poisoned".into())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numbers (and numeric strings) compare numerically, everything else by its string form.
/// Null sorts before any value.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) if a.is_number() || b.is_number() => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => crate::column_types::condition_value(a).cmp(&crate::column_types::condition_value(b)),
        },
    }
}

fn like_pattern(pattern: &str) -> Result<Regex, BackendError> {
    let mut expression = String::from("^");
    for c in pattern.chars() {
        match c {
            '%' => expression.push_str(".*"),
            '_' => expression.push('.'),
            other => expression.push_str(&regex::escape(&other.to_string())),
        }
    }
    expression.push('$');
    RegexBuilder::new(&expression)
        .case_insensitive(true)
        .build()
        .map_err(|e| BackendError::Unsupported(format!("invalid LIKE pattern '{}': {}", pattern, e)))
}

/// A condition ready to be evaluated against rows.
enum Filter<'a> {
    Compare(&'a Condition),
    Like(&'a str, Regex),
}

impl<'a> Filter<'a> {
    fn build(condition: &'a Condition) -> Result<Self, BackendError> {
        match condition.operator.as_str() {
            "LIKE" => {
                let pattern = condition.value().map(crate::column_types::condition_value).unwrap_or_default();
                Ok(Filter::Like(&condition.column, like_pattern(&pattern)?))
            }
            "=" | "!=" | "<" | ">" | "<=" | ">=" | "IN" | "IS NULL" | "IS NOT NULL" => Ok(Filter::Compare(condition)),
            other => Err(BackendError::Unsupported(format!(
                "operator '{}' is not supported by the memory backend",
                other
            ))),
        }
    }

    fn matches(&self, row: &Map<String, Value>) -> bool {
        match self {
            Filter::Like(column, regex) => match row.get(*column) {
                None | Some(Value::Null) => false,
                Some(value) => regex.is_match(&crate::column_types::condition_value(value)),
            },
            Filter::Compare(condition) => {
                let value = row.get(&condition.column).unwrap_or(&Value::Null);
                let target = condition.value().unwrap_or(&Value::Null);
                match condition.operator.as_str() {
                    "IS NULL" => value.is_null(),
                    "IS NOT NULL" => !value.is_null(),
                    "IN" => condition.values.iter().any(|v| compare(value, v) == Ordering::Equal),
                    _ if value.is_null() => false,
                    "=" => compare(value, target) == Ordering::Equal,
                    "!=" => compare(value, target) != Ordering::Equal,
                    "<" => compare(value, target) == Ordering::Less,
                    ">" => compare(value, target) == Ordering::Greater,
                    "<=" => compare(value, target) != Ordering::Greater,
                    ">=" => compare(value, target) != Ordering::Less,
                    _ => false,
                }
            }
        }
    }
}

fn same_id(row: &Map<String, Value>, id_column: &str, id: &Value) -> bool {
    row.get(id_column).is_some_and(|v| compare(v, id) == Ordering::Equal)
}

fn check_unsupported(query: &QueryConfiguration) -> Result<(), BackendError> {
    if query.group_by_column.is_some() || !query.selects.is_empty() || !query.joins.is_empty() {
        return Err(BackendError::Unsupported(
            "the memory backend does not support group_by, selects or joins".into(),
        ));
    }
    Ok(())
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, query: &QueryConfiguration, model: &ModelSchema) -> Result<Vec<Map<String, Value>>, BackendError> {
        check_unsupported(query)?;
        let filters = query.wheres.iter().map(Filter::build).collect::<Result<Vec<_>, _>>()?;
        let tables = self.tables.read().map_err(poisoned)?;
        let Some(table) = tables.get(&model.table_name) else {
            return Ok(Vec::new());
        };
        Ok(table
            .rows
            .iter()
            .filter(|row| filters.iter().all(|f| f.matches(row)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create(&self, mut data: Map<String, Value>, model: &ModelSchema) -> Result<Map<String, Value>, BackendError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.entry(model.table_name.clone()).or_default();
        let id_column = &model.id_column_name;
        match data.get(id_column).filter(|v| !v.is_null()) {
            Some(id) => {
                if let Some(n) = id.as_i64() {
                    table.next_id = table.next_id.max(n);
                }
            }
            None => {
                table.next_id += 1;
                data.insert(id_column.clone(), Value::from(table.next_id));
            }
        }
        table.rows.push(data.clone());
        Ok(data)
    }

    async fn update(
        &self,
        id: &Value,
        data: Map<String, Value>,
        _existing: &Map<String, Value>,
        model: &ModelSchema,
    ) -> Result<Map<String, Value>, BackendError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let row = tables
            .get_mut(&model.table_name)
            .and_then(|t| t.rows.iter_mut().find(|row| same_id(row, &model.id_column_name, id)))
            .ok_or_else(|| BackendError::NotFound(format!("{} {}", model.name, id)))?;
        row.extend(data);
        Ok(row.clone())
    }

    async fn delete(&self, id: &Value, model: &ModelSchema) -> Result<(), BackendError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables
            .get_mut(&model.table_name)
            .ok_or_else(|| BackendError::NotFound(format!("{} {}", model.name, id)))?;
        let before = table.rows.len();
        table.rows.retain(|row| !same_id(row, &model.id_column_name, id));
        if table.rows.len() == before {
            return Err(BackendError::NotFound(format!("{} {}", model.name, id)));
        }
        Ok(())
    }

    async fn count(&self, query: &QueryConfiguration, model: &ModelSchema) -> Result<usize, BackendError> {
        Ok(self.matching(query, model)?.len())
    }

    async fn records(
        &self,
        query: &QueryConfiguration,
        model: &ModelSchema,
        next_page: Option<&mut Map<String, Value>>,
    ) -> Result<Vec<Map<String, Value>>, BackendError> {
        let mut rows = self.matching(query, model)?;
        rows.sort_by(|a, b| {
            query
                .sorts
                .iter()
                .map(|sort| {
                    let ordering = compare(
                        a.get(&sort.column).unwrap_or(&Value::Null),
                        b.get(&sort.column).unwrap_or(&Value::Null),
                    );
                    match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let total = rows.len();
        let start = query.start().min(total);
        let end = query.limit.map_or(total, |limit| start.saturating_add(limit).min(total));
        if let Some(next_page) = next_page {
            if end < total {
                next_page.insert("start".to_string(), Value::from(end));
            }
        }
        tracing::debug!(table = %model.table_name, total, start, end, "memory records");
        Ok(rows.drain(start..end).collect())
    }
}
