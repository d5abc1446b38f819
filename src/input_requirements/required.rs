//! Required columns: present and non-empty on create, never blanked on update.

use crate::error::ConfigError;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Required {
    pub column_name: String,
}

impl Required {
    pub fn new(column_name: impl Into<String>) -> Self {
        Required {
            column_name: column_name.into(),
        }
    }

    pub fn configure(column_name: &str, args: &[Value]) -> Result<Self, ConfigError> {
        if !args.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Required does not take any arguments for column '{}'",
                column_name
            )));
        }
        Ok(Required::new(column_name))
    }

    /// On update a column that is not being changed keeps its stored value.
    pub fn check(&self, data: &Map<String, Value>, is_update: bool) -> String {
        match data.get(&self.column_name) {
            None if is_update => String::new(),
            None | Some(Value::Null) => self.error(),
            Some(Value::String(s)) if s.is_empty() => self.error(),
            Some(_) => String::new(),
        }
    }

    fn error(&self) -> String {
        format!("'{}' is required.", self.column_name)
    }
}
