//! RFC 3339 date/time columns.

use super::{ColumnType, ORDERED_OPERATORS};
use crate::autodoc::Schema;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

fn parse(value: &Value) -> Option<chrono::DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
}

/// RFC 3339 date/time, stored normalized to UTC so stored values sort chronologically.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTime;

impl ColumnType for DateTime {
    fn to_backend(&self, value: &Value) -> Value {
        parse(value)
            .map(|d| Value::String(d.to_rfc3339_opts(SecondsFormat::Secs, true)))
            .unwrap_or_else(|| value.clone())
    }

    fn check_input(&self, column_name: &str, value: &Value) -> String {
        match parse(value) {
            Some(_) => String::new(),
            None => format!("Invalid input: {} must be a date/time in RFC 3339 format", column_name),
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        ORDERED_OPERATORS
    }

    fn check_search_value(&self, value: &Value) -> String {
        match parse(value) {
            Some(_) => String::new(),
            None => "value should be a date/time in RFC 3339 format".to_string(),
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::string(name).with_format("date-time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_to_utc() {
        assert_eq!(
            json!("2024-01-01T10:00:00Z"),
            DateTime.to_backend(&json!("2024-01-01T12:00:00+02:00"))
        );
        assert_eq!("", DateTime.check_search_value(&json!("2024-01-01T00:00:00Z")));
        assert_eq!(
            "Invalid input: created must be a date/time in RFC 3339 format",
            DateTime.check_input("created", &json!("yesterday"))
        );
    }
}
