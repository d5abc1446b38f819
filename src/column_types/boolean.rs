//! Boolean columns.

use super::ColumnType;
use crate::autodoc::Schema;
use serde_json::Value;

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Boolean;

impl ColumnType for Boolean {
    fn from_backend(&self, value: &Value) -> Value {
        as_bool(value).map(Value::Bool).unwrap_or_else(|| value.clone())
    }

    fn to_backend(&self, value: &Value) -> Value {
        self.from_backend(value)
    }

    fn check_input(&self, column_name: &str, value: &Value) -> String {
        if value.is_boolean() {
            String::new()
        } else {
            format!("Invalid input: {} must be a boolean", column_name)
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        &["="]
    }

    fn check_search_value(&self, value: &Value) -> String {
        if value.is_boolean() {
            String::new()
        } else {
            "value should be a boolean".to_string()
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::boolean(name)
    }
}
