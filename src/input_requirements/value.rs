//! Numeric bounds on column input.

use crate::error::ConfigError;
use serde_json::{Map, Value};

fn single_number_arg(args: &[Value], label: &str, class: &str, column_name: &str) -> Result<f64, ConfigError> {
    match args {
        [arg] => arg.as_f64().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{} must be a number to use the {} class for column '{}'",
                label, class, column_name
            ))
        }),
        _ => Err(ConfigError::Invalid(format!(
            "{} requires exactly one argument ({}) for column '{}'",
            class,
            label.to_lowercase(),
            column_name
        ))),
    }
}

/// Formats 5.0 as "5" and 2.5 as "2.5".
fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MinimumValue {
    pub column_name: String,
    pub minimum_value: f64,
}

impl MinimumValue {
    pub fn new(column_name: impl Into<String>, minimum_value: f64) -> Self {
        MinimumValue {
            column_name: column_name.into(),
            minimum_value,
        }
    }

    pub fn configure(column_name: &str, args: &[Value]) -> Result<Self, ConfigError> {
        let n = single_number_arg(args, "Minimum value", "MinimumValue", column_name)?;
        Ok(MinimumValue::new(column_name, n))
    }

    pub fn check(&self, data: &Map<String, Value>) -> String {
        match data.get(&self.column_name).and_then(Value::as_f64) {
            Some(n) if n < self.minimum_value => format!(
                "'{}' must be at least {}.",
                self.column_name,
                display_number(self.minimum_value)
            ),
            _ => String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaximumValue {
    pub column_name: String,
    pub maximum_value: f64,
}

impl MaximumValue {
    pub fn new(column_name: impl Into<String>, maximum_value: f64) -> Self {
        MaximumValue {
            column_name: column_name.into(),
            maximum_value,
        }
    }

    pub fn configure(column_name: &str, args: &[Value]) -> Result<Self, ConfigError> {
        let n = single_number_arg(args, "Maximum value", "MaximumValue", column_name)?;
        Ok(MaximumValue::new(column_name, n))
    }

    pub fn check(&self, data: &Map<String, Value>) -> String {
        match data.get(&self.column_name).and_then(Value::as_f64) {
            Some(n) if n > self.maximum_value => format!(
                "'{}' must be at most {}.",
                self.column_name,
                display_number(self.maximum_value)
            ),
            _ => String::new(),
        }
    }
}
