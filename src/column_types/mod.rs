//! Column types: how a single model attribute is validated, searched, documented and converted
//! between its storage and application representation.

mod boolean;
mod datetime;
mod numeric;
mod string;
mod uuid_column;

pub use boolean::Boolean;
pub use datetime::DateTime;
pub use numeric::{Float, Integer};
pub use string::{Email, StringType};
pub use self::uuid_column::Uuid;

use crate::autodoc::Schema;
use crate::config::ColumnDefinition;
use crate::error::ConfigError;
use crate::input_requirements::InputRequirement;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const EQUALITY_OPERATORS: &[&str] = &["=", "!="];
pub const TEXT_OPERATORS: &[&str] = &["=", "!=", "LIKE"];
pub const ORDERED_OPERATORS: &[&str] = &["=", "!=", "<", ">", "<=", ">="];

/// Behaviour shared by every column of one kind.
pub trait ColumnType: Send + Sync + std::fmt::Debug {
    /// Storage representation -> application representation. Never called with null.
    fn from_backend(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Application representation -> storage representation. Never called with null.
    fn to_backend(&self, value: &Value) -> Value {
        value.clone()
    }

    /// Type check for a non-null input value.
    fn check_input(&self, column_name: &str, value: &Value) -> String;

    fn allowed_operators(&self) -> &'static [&'static str];

    fn check_search_value(&self, value: &Value) -> String;

    fn documentation(&self, name: &str) -> Schema;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Integer,
    Float,
    Boolean,
    Email,
    Uuid,
    #[serde(alias = "date_time")]
    DateTime,
}

impl ColumnKind {
    pub fn column_type(&self) -> &'static dyn ColumnType {
        match self {
            ColumnKind::String => &StringType,
            ColumnKind::Integer => &Integer,
            ColumnKind::Float => &Float,
            ColumnKind::Boolean => &Boolean,
            ColumnKind::Email => &Email,
            ColumnKind::Uuid => &Uuid,
            ColumnKind::DateTime => &DateTime,
        }
    }
}

/// String form of a value as it appears inside a condition, e.g. `age<7` or `name=ronoc`.
pub fn condition_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// A configured column: its name, kind and input requirements.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    input_requirements: Vec<InputRequirement>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Column {
            name: name.into(),
            kind,
            input_requirements: Vec::new(),
        }
    }

    pub fn configure(name: &str, definition: &ColumnDefinition) -> Result<Self, ConfigError> {
        let kind = definition.kind.ok_or_else(|| {
            ConfigError::Invalid(format!("Missing 'class' in configuration for column '{}'", name))
        })?;
        let input_requirements = definition
            .input_requirements
            .iter()
            .map(|spec| InputRequirement::build(spec, name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Column {
            name: name.to_string(),
            kind,
            input_requirements,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn input_requirements(&self) -> &[InputRequirement] {
        &self.input_requirements
    }

    fn column_type(&self) -> &'static dyn ColumnType {
        self.kind.column_type()
    }

    pub fn from_backend(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }
        self.column_type().from_backend(value)
    }

    /// Convert this column's entry in `data`, if it has a non-null one.
    pub fn to_backend(&self, mut data: Map<String, Value>) -> Map<String, Value> {
        if let Some(value) = data.get_mut(&self.name) {
            if !value.is_null() {
                *value = self.column_type().to_backend(value);
            }
        }
        data
    }

    /// At most one error for this column: the type check first, then requirements in order.
    pub fn input_errors(&self, data: &Map<String, Value>, is_update: bool) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        let type_error = match data.get(&self.name) {
            Some(value) if !value.is_null() => self.column_type().check_input(&self.name, value),
            _ => String::new(),
        };
        let error = if type_error.is_empty() {
            self.input_requirements
                .iter()
                .map(|r| r.check(data, is_update))
                .find(|e| !e.is_empty())
                .unwrap_or_default()
        } else {
            type_error
        };
        if !error.is_empty() {
            errors.insert(self.name.clone(), error);
        }
        errors
    }

    pub fn is_allowed_operator(&self, operator: &str) -> bool {
        self.column_type()
            .allowed_operators()
            .iter()
            .any(|op| op.eq_ignore_ascii_case(operator))
    }

    pub fn check_search_value(&self, value: &Value) -> String {
        self.column_type().check_search_value(value)
    }

    pub fn build_condition(&self, value: &Value, operator: &str) -> String {
        let value = condition_value(value);
        if operator.chars().all(|c| c.is_ascii_alphabetic()) {
            format!("{} {} {}", self.name, operator.to_uppercase(), value)
        } else {
            format!("{}{}{}", self.name, operator, value)
        }
    }

    /// Schema for this column, optionally under a different (e.g. re-cased) name.
    pub fn documentation(&self, name: Option<&str>) -> Schema {
        self.column_type().documentation(name.unwrap_or(&self.name))
    }
}
