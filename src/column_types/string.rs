//! String and email columns.

use super::{ColumnType, TEXT_OPERATORS};
use crate::autodoc::Schema;
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default)]
pub struct StringType;

impl ColumnType for StringType {
    fn check_input(&self, column_name: &str, value: &Value) -> String {
        if value.is_string() {
            String::new()
        } else {
            format!("Invalid input: {} must be a string", column_name)
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        TEXT_OPERATORS
    }

    fn check_search_value(&self, value: &Value) -> String {
        if value.is_string() {
            String::new()
        } else {
            "value should be a string".to_string()
        }
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::string(name)
    }
}

/// Loose structural check: one `@`, a non-empty local part, and a dotted domain.
fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Email;

impl ColumnType for Email {
    fn check_input(&self, column_name: &str, value: &Value) -> String {
        match value.as_str() {
            Some(s) if is_email(s) => String::new(),
            Some(_) => format!("Invalid input: {} must be a valid email address", column_name),
            None => format!("Invalid input: {} must be a string", column_name),
        }
    }

    fn allowed_operators(&self) -> &'static [&'static str] {
        TEXT_OPERATORS
    }

    /// Partial addresses are fine in searches.
    fn check_search_value(&self, value: &Value) -> String {
        StringType.check_search_value(value)
    }

    fn documentation(&self, name: &str) -> Schema {
        Schema::string(name).with_format("email")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_validation() {
        assert_eq!("", Email.check_input("email", &json!("cmancone1@example.com")));
        assert_eq!(
            "Invalid input: email must be a valid email address",
            Email.check_input("email", &json!("not-an-email"))
        );
        assert_eq!(
            "Invalid input: email must be a valid email address",
            Email.check_input("email", &json!("a@b@example.com"))
        );
        assert_eq!("Invalid input: email must be a string", Email.check_input("email", &json!(5)));
        assert_eq!("", Email.check_search_value(&json!("example.com")));
    }

    #[test]
    fn string_checks() {
        assert_eq!("", StringType.check_input("name", &json!("x")));
        assert_eq!("value should be a string", StringType.check_search_value(&json!(1)));
    }
}
