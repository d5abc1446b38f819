//! Columns registry: named column definitions plus per-use overrides, configured into an
//! ordered lookup of [`Column`]s.

use crate::column_types::Column;
use crate::config::ColumnDefinition;
use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Columns {
    columns: Vec<Column>,
}

/// Apply `overrides` to `definitions`. An override for an unknown column appends it. For a
/// known column the override's class (if any) replaces the base class, and its input
/// requirements come first, followed by base requirements it does not repeat by name.
pub fn merge_definitions(
    definitions: &[(String, ColumnDefinition)],
    overrides: &[(String, ColumnDefinition)],
) -> Vec<(String, ColumnDefinition)> {
    let mut merged: Vec<(String, ColumnDefinition)> = definitions.to_vec();
    for (name, over) in overrides {
        let Some((_, base)) = merged.iter_mut().find(|(n, _)| n == name) else {
            merged.push((name.clone(), over.clone()));
            continue;
        };
        let overridden: HashSet<&str> = over.input_requirements.iter().map(|r| r.name.as_str()).collect();
        let mut requirements = over.input_requirements.clone();
        requirements.extend(
            base.input_requirements
                .iter()
                .filter(|r| !overridden.contains(r.name.as_str()))
                .cloned(),
        );
        base.input_requirements = requirements;
        if over.kind.is_some() {
            base.kind = over.kind;
        }
    }
    merged
}

impl Columns {
    pub fn configure(
        definitions: &[(String, ColumnDefinition)],
        overrides: &[(String, ColumnDefinition)],
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for (name, definition) in merge_definitions(definitions, overrides) {
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Invalid(format!("Column '{}' is defined more than once", name)));
            }
            columns.push(Column::configure(&name, &definition)?);
        }
        Ok(Columns { columns })
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Columns { columns }
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn to_backend(&self, data: Map<String, Value>) -> Map<String, Value> {
        self.columns.iter().fold(data, |data, column| column.to_backend(data))
    }

    /// Unknown keys pass through untouched.
    pub fn from_backend(&self, data: Map<String, Value>) -> Map<String, Value> {
        data.into_iter()
            .map(|(key, value)| match self.get(&key) {
                Some(column) => {
                    let converted = column.from_backend(&value);
                    (key, converted)
                }
                None => (key, value),
            })
            .collect()
    }

    pub fn input_errors(&self, data: &Map<String, Value>, is_update: bool) -> HashMap<String, String> {
        self.columns
            .iter()
            .flat_map(|c| c.input_errors(data, is_update))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column_types::ColumnKind;
    use crate::config::{maximum_length, minimum_length, required};
    use crate::input_requirements::{InputRequirement, MaximumLength, MinimumLength};
    use serde_json::json;

    fn base() -> Vec<(String, ColumnDefinition)> {
        vec![
            (
                "first_name".to_string(),
                ColumnDefinition::new(ColumnKind::String).with_requirements(vec![
                    required(),
                    minimum_length(2),
                    maximum_length(15),
                ]),
            ),
            (
                "last_name".to_string(),
                ColumnDefinition::new(ColumnKind::String).with_requirement(required()),
            ),
        ]
    }

    fn requirement_names(columns: &Columns, name: &str) -> Vec<&'static str> {
        columns.get(name).unwrap().input_requirements().iter().map(InputRequirement::name).collect()
    }

    #[test]
    fn configure() {
        let mut definitions = base();
        definitions.push(("age".to_string(), ColumnDefinition::new(ColumnKind::Integer)));
        let columns = Columns::configure(&definitions, &[]).unwrap();

        assert_eq!(3, columns.len());
        assert_eq!(vec!["first_name", "last_name", "age"], columns.names());
        assert_eq!(vec!["required", "minimum_length", "maximum_length"], requirement_names(&columns, "first_name"));
        assert_eq!(vec!["required"], requirement_names(&columns, "last_name"));
        assert!(requirement_names(&columns, "age").is_empty());
        let first_name = columns.get("first_name").unwrap().input_requirements();
        assert_eq!(InputRequirement::MinimumLength(MinimumLength::new("first_name", 2)), first_name[1]);
        assert_eq!(InputRequirement::MaximumLength(MaximumLength::new("first_name", 15)), first_name[2]);
    }

    #[test]
    fn overrides() {
        let overrides = vec![
            (
                "age".to_string(),
                ColumnDefinition::new(ColumnKind::Integer).with_requirement(required()),
            ),
            ("first_name".to_string(), ColumnDefinition::requirements_only(vec![maximum_length(5)])),
            ("last_name".to_string(), ColumnDefinition::requirements_only(vec![maximum_length(25)])),
        ];
        let columns = Columns::configure(&base(), &overrides).unwrap();

        assert_eq!(3, columns.len());
        assert!(columns.contains("age"));
        assert_eq!(vec!["maximum_length", "required", "minimum_length"], requirement_names(&columns, "first_name"));
        assert_eq!(vec!["maximum_length", "required"], requirement_names(&columns, "last_name"));
        assert_eq!(vec!["required"], requirement_names(&columns, "age"));
        let first_name = columns.get("first_name").unwrap().input_requirements();
        assert_eq!(InputRequirement::MaximumLength(MaximumLength::new("first_name", 5)), first_name[0]);
        assert_eq!(InputRequirement::MinimumLength(MinimumLength::new("first_name", 2)), first_name[2]);
        let last_name = columns.get("last_name").unwrap().input_requirements();
        assert_eq!(InputRequirement::MaximumLength(MaximumLength::new("last_name", 25)), last_name[0]);
    }

    #[test]
    fn override_for_new_column_needs_a_class() {
        let overrides = vec![("nickname".to_string(), ColumnDefinition::requirements_only(vec![required()]))];
        let err = Columns::configure(&base(), &overrides).unwrap_err();
        assert_eq!("Missing 'class' in configuration for column 'nickname'", err.to_string());
    }

    #[test]
    fn aggregates_errors_and_conversions() {
        let mut definitions = base();
        definitions.push(("age".to_string(), ColumnDefinition::new(ColumnKind::Integer)));
        let columns = Columns::configure(&definitions, &[]).unwrap();
        let data = json!({"first_name": "a", "age": "x"}).as_object().cloned().unwrap();
        let errors = columns.input_errors(&data, false);
        assert_eq!(3, errors.len());
        assert_eq!("'last_name' is required.", errors["last_name"]);
        assert_eq!("Invalid input: age must be an integer", errors["age"]);

        let stored = columns.to_backend(json!({"age": "6", "extra": 1}).as_object().cloned().unwrap());
        assert_eq!(json!({"age": 6, "extra": 1}), Value::Object(stored));
    }
}
