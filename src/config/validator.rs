//! Handler config validation: column references, sort defaults and limits, checked once when
//! a handler is configured.

use crate::error::ConfigError;
use crate::handlers::AdvancedSearchConfig;
use crate::model::ModelSchema;
use crate::query::Condition;
use std::collections::HashSet;

/// Every entry of `columns` must exist on the model and appear only once.
pub fn validate_column_list(
    handler: &str,
    kind: &str,
    columns: &[String],
    model: &ModelSchema,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !(column == &model.id_column_name || model.columns.contains(column)) {
            return Err(ConfigError::Invalid(format!(
                "{} was configured with {} column '{}' but this column doesn't exist for model '{}'",
                handler, kind, column, model.name
            )));
        }
        if !seen.insert(column.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{} was configured with {} column '{}' more than once",
                handler, kind, column
            )));
        }
    }
    Ok(())
}

pub fn validate_advanced_search(config: &AdvancedSearchConfig) -> Result<(), ConfigError> {
    const HANDLER: &str = "AdvancedSearch";
    let model = config.models.schema();

    if config.readable_columns.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "{} requires at least one readable column",
            HANDLER
        )));
    }
    validate_column_list(HANDLER, "readable", &config.readable_columns, model)?;
    validate_column_list(HANDLER, "searchable", &config.searchable_columns, model)?;
    let sortable = config.sortable_columns();
    validate_column_list(HANDLER, "sortable", sortable, model)?;

    if !sortable.contains(&config.default_sort_column) {
        return Err(ConfigError::Invalid(format!(
            "{} default_sort_column '{}' must be one of the sortable columns",
            HANDLER, config.default_sort_column
        )));
    }
    if config.maximum_limit == 0 {
        return Err(ConfigError::Invalid(format!("{} maximum_limit must be positive", HANDLER)));
    }
    if config.default_limit == 0 || config.default_limit > config.maximum_limit {
        return Err(ConfigError::Invalid(format!(
            "{} default_limit must be between 1 and maximum_limit ({})",
            HANDLER, config.maximum_limit
        )));
    }
    for condition in &config.where_ {
        let parsed = Condition::parse(condition)?;
        if !(parsed.column == model.id_column_name || model.columns.contains(&parsed.column)) {
            return Err(ConfigError::UnknownColumn {
                model: model.name.clone(),
                column: parsed.column,
            });
        }
    }
    Ok(())
}
