//! Parsing and display of single `column operator value` filters.

use crate::column_types::condition_value;
use crate::error::ConfigError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Operators recognized when parsing a condition string, in lowercase. Word operators carry
/// their surrounding spaces so they are not matched inside column names.
const OPERATORS: &[&str] = &[
    "!=",
    "<=",
    ">=",
    "=",
    "<",
    ">",
    " like ",
    " in ",
    " is not null",
    " is null",
];

/// One filter: `column operator values`. Operators are stored trimmed and uppercased.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: String,
    pub values: Vec<Value>,
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: &str, values: Vec<Value>) -> Self {
        Condition {
            column: column.into(),
            operator: operator.trim().to_uppercase(),
            values,
        }
    }

    /// Parse `age<=25`, `name LIKE 'ron%'`, `id IN (1, 2)` or `email IS NULL`.
    /// The earliest operator in the string wins; ties go to the longest.
    pub fn parse(condition: &str) -> Result<Self, ConfigError> {
        let lowered = condition.to_ascii_lowercase();
        let found = OPERATORS
            .iter()
            .filter_map(|op| lowered.find(op).map(|index| (index, *op)))
            .min_by(|(ia, a), (ib, b)| ia.cmp(ib).then(b.len().cmp(&a.len())));
        let Some((index, operator)) = found else {
            return Err(ConfigError::Invalid(format!(
                "No supported operators found in condition '{}'",
                condition
            )));
        };

        let column = condition[..index].trim();
        if column.is_empty() {
            return Err(ConfigError::Invalid(format!("Missing column name in condition '{}'", condition)));
        }
        let rest = condition[index + operator.len()..].trim();
        let values = match operator {
            " is null" | " is not null" => Vec::new(),
            " in " => rest
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(unquote)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
                .collect(),
            _ => vec![Value::String(unquote(rest).to_string())],
        };
        Ok(Condition::new(unquote(column), operator, values))
    }

    /// First value, for operators that take exactly one.
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }
}

impl FromStr for Condition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(condition_value).collect();
        match self.operator.as_str() {
            "IS NULL" | "IS NOT NULL" => write!(f, "{} {}", self.column, self.operator),
            "IN" => write!(f, "{} IN ({})", self.column, values.join(", ")),
            "LIKE" => write!(f, "{} LIKE {}", self.column, values.join("")),
            op => write!(f, "{}{}{}", self.column, op, values.join("")),
        }
    }
}
