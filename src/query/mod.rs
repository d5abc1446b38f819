//! Backend-agnostic query description built up by [`crate::model::Models`].

mod condition;

pub use condition::Condition;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(ConfigError::Invalid(format!(
                "Invalid sort direction '{}': must be ASC or DESC",
                s
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Sort {
            column: column.into(),
            direction,
        }
    }
}

/// Everything a backend needs to run one records or count request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryConfiguration {
    pub wheres: Vec<Condition>,
    pub sorts: Vec<Sort>,
    pub limit: Option<usize>,
    pub pagination: Map<String, Value>,
    pub group_by_column: Option<String>,
    pub selects: Vec<String>,
    pub joins: Vec<String>,
}

impl QueryConfiguration {
    /// Offset from the `start` pagination key; missing or unparseable means 0.
    pub fn start(&self) -> usize {
        match self.pagination.get("start") {
            Some(Value::Number(n)) => n.as_u64().map(|n| n as usize).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}
