//! UUID columns.

use super::{ColumnType, EQUALITY_OPERATORS};
use crate::autodoc::Schema;
use serde_json::Value;

fn parse(value: &Value) -> Option<::uuid::Uuid> {
    value.as_str().and_then(|s| ::uuid::Uuid::parse_str(s).ok())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Uuid;

impl ColumnType for Uuid {
    /// Stored in canonical lowercase hyphenated form.
    fn to_backend(&self, value: &Value) -> Value {
        parse(value)
            .map(|u| Value::String(u.hyphenated().to_string()))
            .unwrap_or_else(|| value.clone())
    }

    fn check_input(&self, column_name: &str, value: &Value) -> String {
        match parse(value) {
            Some(_) => String::new(),
            None => format!("Invalid input: {} must be a valid UUID", column_name),
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        EQUALITY_OPERATORS
    }

    fn check_search_value(&self, value: &Value) -> String {
        match parse(value) {
            Some(_) => String::new(),
            None => "value should be a valid UUID".to_string(),
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::string(name).with_format("uuid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalizes_and_validates() {
        assert_eq!(
            json!("a0b1c2d3-e4f5-4789-8abc-def012345678"),
            Uuid.to_backend(&json!("A0B1C2D3-E4F5-4789-8ABC-DEF012345678"))
        );
        assert_eq!("Invalid input: id must be a valid UUID", Uuid.check_input("id", &json!("nope")));
        assert_eq!("value should be a valid UUID", Uuid.check_search_value(&json!(5)));
    }
}
