//! String length bounds on column input.

use crate::error::ConfigError;
use serde_json::{Map, Value};

fn single_length_arg(
    args: &[Value],
    label: &str,
    class: &str,
    column_name: &str,
) -> Result<usize, ConfigError> {
    let [arg] = args else {
        return Err(ConfigError::Invalid(format!(
            "{} requires exactly one argument ({}) for column '{}'",
            class,
            label.to_lowercase(),
            column_name
        )));
    };
    arg.as_u64().map(|n| n as usize).ok_or_else(|| {
        ConfigError::Invalid(format!(
            "{} must be an int to use the {} class for column '{}'",
            label, class, column_name
        ))
    })
}

fn string_len(data: &Map<String, Value>, column_name: &str) -> Option<usize> {
    data.get(column_name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.chars().count())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinimumLength {
    pub column_name: String,
    pub minimum_length: usize,
}

impl MinimumLength {
    pub fn new(column_name: impl Into<String>, minimum_length: usize) -> Self {
        MinimumLength {
            column_name: column_name.into(),
            minimum_length,
        }
    }

    pub fn configure(column_name: &str, args: &[Value]) -> Result<Self, ConfigError> {
        let n = single_length_arg(args, "Minimum length", "MinimumLength", column_name)?;
        Ok(MinimumLength::new(column_name, n))
    }

    /// Empty values are left to `Required`.
    pub fn check(&self, data: &Map<String, Value>) -> String {
        match string_len(data, &self.column_name) {
            Some(len) if len < self.minimum_length => format!(
                "'{}' must be at least {} characters long.",
                self.column_name, self.minimum_length
            ),
            _ => String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaximumLength {
    pub column_name: String,
    pub maximum_length: usize,
}

impl MaximumLength {
    pub fn new(column_name: impl Into<String>, maximum_length: usize) -> Self {
        MaximumLength {
            column_name: column_name.into(),
            maximum_length,
        }
    }

    pub fn configure(column_name: &str, args: &[Value]) -> Result<Self, ConfigError> {
        let n = single_length_arg(args, "Maximum length", "MaximumLength", column_name)?;
        Ok(MaximumLength::new(column_name, n))
    }

    pub fn check(&self, data: &Map<String, Value>) -> String {
        match string_len(data, &self.column_name) {
            Some(len) if len > self.maximum_length => format!(
                "'{}' must be at most {} characters long.",
                self.column_name, self.maximum_length
            ),
            _ => String::new(),
        }
    }
}
