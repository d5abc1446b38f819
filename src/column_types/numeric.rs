//! Integer and float columns.

use super::{ColumnType, ORDERED_OPERATORS};
use crate::autodoc::Schema;
use serde_json::{Number, Value};

fn float_value(n: f64) -> Value {
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_integer(value: &Value) -> bool {
    matches!(value, Value::Number(n) if n.is_i64() || n.is_u64())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Integer;

impl ColumnType for Integer {
    fn from_backend(&self, value: &Value) -> Value {
        as_integer(value).map(Value::from).unwrap_or_else(|| value.clone())
    }

    fn to_backend(&self, value: &Value) -> Value {
        self.from_backend(value)
    }

    fn check_input(&self, column_name: &str, value: &Value) -> String {
        if is_integer(value) {
            String::new()
        } else {
            format!("Invalid input: {} must be an integer", column_name)
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        ORDERED_OPERATORS
    }

    fn check_search_value(&self, value: &Value) -> String {
        if is_integer(value) {
            String::new()
        } else {
            "value should be an integer".to_string()
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::integer(name)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Float;

impl ColumnType for Float {
    fn from_backend(&self, value: &Value) -> Value {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.map(float_value).unwrap_or_else(|| value.clone())
    }

    fn to_backend(&self, value: &Value) -> Value {
        self.from_backend(value)
    }

    fn check_input(&self, column_name: &str, value: &Value) -> String {
        if value.is_number() {
            String::new()
        } else {
            format!("Invalid input: {} must be an integer or float", column_name)
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        ORDERED_OPERATORS
    }

    fn check_search_value(&self, value: &Value) -> String {
        if value.is_number() {
            String::new()
        } else {
            "value should be an integer or float".to_string()
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::number(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_conversions() {
        assert_eq!(json!(6), Integer.to_backend(&json!("6")));
        assert_eq!(json!(6), Integer.from_backend(&json!(6.0)));
        assert_eq!(json!("six"), Integer.to_backend(&json!("six")));
        assert_eq!(json!(6.5), Integer.from_backend(&json!(6.5)));
    }

    #[test]
    fn integer_checks() {
        assert_eq!("", Integer.check_input("age", &json!(5)));
        assert_eq!("Invalid input: age must be an integer", Integer.check_input("age", &json!(5.5)));
        assert_eq!("Invalid input: age must be an integer", Integer.check_input("age", &json!("5")));
        assert_eq!("value should be an integer", Integer.check_search_value(&json!("25")));
    }

    #[test]
    fn float_from_integer() {
        assert_eq!(json!(15.0), Float.from_backend(&json!(15)));
    }
}
