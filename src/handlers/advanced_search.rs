//! AdvancedSearch: `POST` a JSON body of `where`/`sort`/`limit`/pagination, get back the
//! readable columns of the matching records.

use super::{Handler, HandlerConfig};
use crate::autodoc::{Parameter, RequestDoc, ResponseDoc, Schema};
use crate::case::CaseMapping;
use crate::column_types::Column;
use crate::config::validate_advanced_search;
use crate::error::{AppError, ClientError, ConfigError};
use crate::extractors::InputOutput;
use crate::model::{Model, Models};
use crate::query::{Condition, SortDirection};
use crate::response::{self, HandlerResponse, ENVELOPE_KEYS, STATUS_CLIENT_ERROR, STATUS_SUCCESS};
use async_trait::async_trait;
use axum::http::Method;
use serde_json::{Map, Value};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAXIMUM_LIMIT: usize = 200;

#[derive(Clone, Debug)]
pub struct AdvancedSearchConfig {
    pub models: Models,
    pub readable_columns: Vec<String>,
    pub searchable_columns: Vec<String>,
    /// Defaults to the readable columns.
    pub sortable_columns: Option<Vec<String>>,
    pub default_sort_column: String,
    pub default_sort_direction: SortDirection,
    pub default_limit: usize,
    pub maximum_limit: usize,
    /// Conditions applied to every search, e.g. `status=active`.
    pub where_: Vec<String>,
    pub description: String,
}

fn strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl AdvancedSearchConfig {
    pub fn new<R, S>(
        models: Models,
        readable_columns: R,
        searchable_columns: S,
        default_sort_column: impl Into<String>,
    ) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        AdvancedSearchConfig {
            models,
            readable_columns: strings(readable_columns),
            searchable_columns: strings(searchable_columns),
            sortable_columns: None,
            default_sort_column: default_sort_column.into(),
            default_sort_direction: SortDirection::Asc,
            default_limit: DEFAULT_LIMIT,
            maximum_limit: MAXIMUM_LIMIT,
            where_: Vec::new(),
            description: String::new(),
        }
    }

    pub fn sortable_columns(&self) -> &[String] {
        self.sortable_columns.as_deref().unwrap_or(&self.readable_columns)
    }

    pub fn with_searchable_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable_columns = strings(columns);
        self
    }

    pub fn with_sortable_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable_columns = Some(strings(columns));
        self
    }

    pub fn with_default_sort_direction(mut self, direction: SortDirection) -> Self {
        self.default_sort_direction = direction;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_maximum_limit(mut self, limit: usize) -> Self {
        self.maximum_limit = limit;
        self
    }

    pub fn with_where(mut self, condition: impl Into<String>) -> Self {
        self.where_.push(condition.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[derive(Debug)]
pub struct AdvancedSearch {
    config: HandlerConfig,
    search: AdvancedSearchConfig,
    /// `search.models` with the fixed conditions applied.
    models: Models,
}

/// One validated `where` entry, internally cased.
struct WhereEntry<'a> {
    column: &'a Column,
    operator: String,
    value: Value,
}

fn invalid(message: impl AsRef<str>) -> ClientError {
    ClientError::new(format!("Invalid request: {}", message.as_ref()))
}

fn entries(value: Value, what: &str, casing: &CaseMapping) -> Result<Vec<Map<String, Value>>, ClientError> {
    let Value::Array(items) = value else {
        return Err(invalid(format!("'{}' must be a list", casing.to_external(what))));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(entry) => Ok(casing.object_to_internal(entry)),
            _ => Err(invalid(format!(
                "{} entry #{} must be an object",
                casing.to_external(what),
                i + 1
            ))),
        })
        .collect()
}

impl AdvancedSearch {
    pub fn configure(search: AdvancedSearchConfig, config: HandlerConfig) -> Result<Self, ConfigError> {
        validate_advanced_search(&search)?;
        let mut models = search.models.clone();
        for condition in &search.where_ {
            models = models.where_(condition)?;
        }
        Ok(AdvancedSearch { config, search, models })
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.models.schema().columns.get(name)
    }

    fn casing(&self) -> &CaseMapping {
        &self.config.casing
    }

    fn searchable(&self, name: &str) -> Option<&Column> {
        self.search
            .searchable_columns
            .iter()
            .any(|c| c == name)
            .then(|| self.column(name))
            .flatten()
    }

    fn parse_where<'a>(&'a self, index: usize, entry: &Map<String, Value>) -> Result<WhereEntry<'a>, ClientError> {
        let number = index + 1;
        let column = entry
            .get("column")
            .and_then(Value::as_str)
            .map(|c| self.casing().to_internal(c))
            .and_then(|c| self.searchable(&c))
            .ok_or_else(|| invalid(format!("invalid search column specified in where entry #{}", number)))?;
        let operator = match entry.get("operator") {
            None | Some(Value::Null) => "=".to_string(),
            Some(Value::String(op)) if column.is_allowed_operator(op) => op.trim().to_uppercase(),
            Some(_) => {
                return Err(invalid(format!(
                    "invalid operator specified in where entry #{}",
                    number
                )))
            }
        };
        let Some(value) = entry.get("value") else {
            return Err(invalid(format!("missing value in where entry #{}", number)));
        };
        let error = column.check_search_value(value);
        if !error.is_empty() {
            return Err(invalid(format!("invalid value in where entry #{}: {}", number, error)));
        }
        let value = column.kind().column_type().to_backend(value);
        Ok(WhereEntry {
            column,
            operator,
            value,
        })
    }

    fn parse_sort(&self, index: usize, entry: &Map<String, Value>) -> Result<(String, SortDirection), ClientError> {
        let number = index + 1;
        let column = entry
            .get("column")
            .and_then(Value::as_str)
            .map(|c| self.casing().to_internal(c))
            .filter(|c| self.search.sortable_columns().contains(c))
            .ok_or_else(|| invalid(format!("invalid sort column specified in sort entry #{}", number)))?;
        let direction = match entry.get("direction") {
            None | Some(Value::Null) => SortDirection::Asc,
            Some(Value::String(d)) => d
                .parse()
                .map_err(|_| invalid(format!("invalid sort direction specified in sort entry #{}", number)))?,
            Some(_) => return Err(invalid(format!("invalid sort direction specified in sort entry #{}", number))),
        };
        Ok((column, direction))
    }

    fn parse_limit(&self, value: &Value) -> Result<usize, ClientError> {
        let limit_name = self.casing().to_external("limit");
        let limit = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|n| *n > 0)
        .ok_or_else(|| invalid(format!("'{}' must be a positive integer", limit_name)))? as usize;
        if limit > self.search.maximum_limit {
            return Err(invalid(format!(
                "'{}' must be at most {}",
                limit_name, self.search.maximum_limit
            )));
        }
        Ok(limit)
    }

    /// Validate the request body and apply it to the configured models.
    fn build_query(&self, body: Map<String, Value>) -> Result<(Models, usize), AppError> {
        let casing = *self.casing();
        let body = casing.object_to_internal(body);
        let pagination_keys = self.models.backend().allowed_pagination_keys();

        let unknown: Vec<String> = body
            .keys()
            .filter(|k| !["where", "sort", "limit"].contains(&k.as_str()) && !pagination_keys.contains(&k.as_str()))
            .map(|k| format!("'{}'", casing.to_external(k)))
            .collect();
        if !unknown.is_empty() {
            return Err(invalid(format!("invalid request parameter(s) found: {}", unknown.join(", "))).into());
        }

        let mut models = self.models.clone();
        let mut pagination = Map::new();
        let mut limit = self.search.default_limit;
        let mut sorts = Vec::new();
        for (key, value) in body {
            match key.as_str() {
                "where" => {
                    for (i, entry) in entries(value, "where", &casing)?.iter().enumerate() {
                        let parsed = self.parse_where(i, entry)?;
                        tracing::debug!(column = parsed.column.name(), operator = %parsed.operator, "search condition");
                        models = models.where_condition(Condition::new(
                            parsed.column.name(),
                            &parsed.operator,
                            vec![parsed.value],
                        ))?;
                    }
                }
                "sort" => {
                    for (i, entry) in entries(value, "sort", &casing)?.iter().enumerate() {
                        sorts.push(self.parse_sort(i, entry)?);
                    }
                }
                "limit" => limit = self.parse_limit(&value)?,
                _ => {
                    pagination.insert(key, value);
                }
            }
        }

        let error = self.models.backend().validate_pagination_data(&pagination, &casing);
        if !error.is_empty() {
            return Err(invalid(error).into());
        }

        if sorts.is_empty() {
            sorts.push((self.search.default_sort_column.clone(), self.search.default_sort_direction));
        }
        for (i, (column, direction)) in sorts.iter().enumerate() {
            models = if i == 0 {
                models.sort_by(column, *direction)?
            } else {
                models.then_sort_by(column, *direction)?
            };
        }
        Ok((models.limit(limit).pagination(pagination), limit))
    }

    fn readable_data(&self, model: &Model) -> Value {
        let casing = self.casing();
        Value::Object(
            self.search
                .readable_columns
                .iter()
                .map(|name| (casing.to_external(name), model.get(name)))
                .collect(),
        )
    }

    fn documentation_data_item(&self) -> Schema {
        let casing = self.casing();
        let children = self
            .search
            .readable_columns
            .iter()
            .map(|name| {
                let external = casing.to_external(name);
                match self.column(name) {
                    Some(column) => column.documentation(Some(&external)),
                    None => Schema::string(external),
                }
            })
            .collect();
        Schema::object(self.models.schema().name.clone(), children)
    }

    fn documentation_envelope(&self, status: &str, data: Schema, pagination: Schema, error: &str) -> Schema {
        let casing = self.casing();
        let [status_key, _, _, error_key, input_errors_key] = ENVELOPE_KEYS.map(|k| casing.to_external(k));
        Schema::object(
            "body",
            vec![
                Schema::string(status_key).with_example(Value::String(casing.to_external(status))),
                data,
                pagination,
                Schema::string(error_key).with_example(Value::String(error.to_string())),
                Schema::object(input_errors_key, Vec::new()),
            ],
        )
    }

    fn documentation_success(&self) -> Schema {
        let casing = self.casing();
        let backend = self.models.backend();
        let pagination = Schema::object(
            casing.to_external("pagination"),
            vec![
                Schema::integer(casing.to_external("number_results")).with_example(Value::from(1)),
                Schema::object(
                    casing.to_external("next_page"),
                    backend.documentation_pagination_next_page_response(casing),
                ),
                Schema::integer(casing.to_external("limit")).with_example(Value::from(self.search.default_limit)),
            ],
        );
        self.documentation_envelope(
            STATUS_SUCCESS,
            Schema::array(casing.to_external("data"), self.documentation_data_item()),
            pagination,
            "",
        )
    }

    fn documentation_client_error(&self) -> Schema {
        let casing = self.casing();
        self.documentation_envelope(
            STATUS_CLIENT_ERROR,
            Schema::array(casing.to_external("data"), Schema::object("item", Vec::new())),
            Schema::object(casing.to_external("pagination"), Vec::new()),
            "Invalid request: invalid search column specified in where entry #1",
        )
    }

    fn documentation_parameters(&self) -> Vec<Parameter> {
        let casing = self.casing();
        let searchable: Vec<String> = self
            .search
            .searchable_columns
            .iter()
            .map(|c| casing.to_external(c))
            .collect();
        let mut operators: Vec<String> = Vec::new();
        for column in self.search.searchable_columns.iter().filter_map(|c| self.column(c)) {
            for op in column.kind().column_type().allowed_operators() {
                if !operators.iter().any(|o| o == op) {
                    operators.push(op.to_string());
                }
            }
        }
        let sortable: Vec<String> = self
            .search
            .sortable_columns()
            .iter()
            .map(|c| casing.to_external(c))
            .collect();

        let condition = Schema::object(
            "condition",
            vec![
                Schema::enumeration(casing.to_external("column"), searchable),
                Schema::enumeration(casing.to_external("operator"), operators),
                Schema::string(casing.to_external("value")).with_description("Value to compare against"),
            ],
        );
        let sort = Schema::object(
            "sort",
            vec![
                Schema::enumeration(casing.to_external("column"), sortable),
                Schema::enumeration(casing.to_external("direction"), ["ASC", "DESC"]),
            ],
        );

        let mut parameters = vec![
            Parameter::json_body(Schema::array(casing.to_external("where"), condition))
                .with_description("Search conditions, all of which must match"),
            Parameter::json_body(Schema::array(casing.to_external("sort"), sort))
                .with_description("Sort order, highest priority first"),
            Parameter::json_body(Schema::integer(casing.to_external("limit")).with_example(Value::from(self.search.default_limit)))
                .with_description(format!("Number of records per page, at most {}", self.search.maximum_limit)),
        ];
        parameters.extend(
            self.models
                .backend()
                .documentation_pagination_parameters(casing)
                .into_iter()
                .map(|(schema, description)| Parameter::json_body(schema).with_description(description)),
        );
        parameters
    }
}

#[async_trait]
impl Handler for AdvancedSearch {
    fn config(&self) -> &HandlerConfig {
        &self.config
    }

    fn request_methods(&self) -> Vec<Method> {
        vec![Method::POST]
    }

    async fn handle(&self, input_output: &mut InputOutput) -> Result<HandlerResponse, AppError> {
        let body = match input_output.json_body(false)? {
            None => Map::new(),
            Some(Value::Object(body)) => body,
            Some(_) => return Err(invalid("request body must be a JSON object").into()),
        };
        let (models, limit) = self.build_query(body)?;
        let (records, next_page) = models.records_with_next_page().await?;
        let number_results = models.count().await?;

        let casing = self.casing();
        let data: Vec<Value> = records.iter().map(|model| self.readable_data(model)).collect();
        let mut pagination = Map::new();
        pagination.insert(casing.to_external("number_results"), Value::from(number_results));
        pagination.insert(
            casing.to_external("next_page"),
            Value::Object(casing.object_to_external(next_page)),
        );
        pagination.insert(casing.to_external("limit"), Value::from(limit));
        Ok(response::success(Value::Array(data), Value::Object(pagination), casing))
    }

    fn documentation(&self) -> Vec<RequestDoc> {
        let description = if self.search.description.is_empty() {
            format!("Search {} records", self.models.schema().name)
        } else {
            self.search.description.clone()
        };
        vec![RequestDoc {
            description,
            relative_path: String::new(),
            request_methods: vec!["POST".to_string()],
            parameters: self.documentation_parameters(),
            responses: vec![
                ResponseDoc::new(200, self.documentation_success(), "Matching records"),
                ResponseDoc::new(400, self.documentation_client_error(), "Invalid request"),
            ],
        }]
    }
}
