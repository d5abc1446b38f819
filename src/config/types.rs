//! Raw declarative config types: column definitions and the input requirements attached to them.

use crate::column_types::ColumnKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// One input requirement before it is bound to a column, e.g. `maximum_length(15)`.
#[derive(Clone, Debug, PartialEq)]
pub struct InputRequirementSpec {
    pub name: String,
    pub args: Vec<Value>,
}

impl InputRequirementSpec {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        InputRequirementSpec {
            name: name.into(),
            args,
        }
    }
}

pub fn required() -> InputRequirementSpec {
    InputRequirementSpec::new("required", Vec::new())
}

pub fn minimum_length(length: usize) -> InputRequirementSpec {
    InputRequirementSpec::new("minimum_length", vec![Value::from(length)])
}

pub fn maximum_length(length: usize) -> InputRequirementSpec {
    InputRequirementSpec::new("maximum_length", vec![Value::from(length)])
}

pub fn minimum_value(value: f64) -> InputRequirementSpec {
    InputRequirementSpec::new("minimum_value", vec![Value::from(value)])
}

pub fn maximum_value(value: f64) -> InputRequirementSpec {
    InputRequirementSpec::new("maximum_value", vec![Value::from(value)])
}

impl<'de> Deserialize<'de> for InputRequirementSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        match v {
            Value::String(name) => Ok(InputRequirementSpec::new(name, Vec::new())),
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(serde::de::Error::custom("input requirement list must start with a name"));
                }
                match items.remove(0) {
                    Value::String(name) => Ok(InputRequirementSpec::new(name, items)),
                    other => Err(serde::de::Error::custom(format!(
                        "input requirement name must be a string; got {}",
                        other
                    ))),
                }
            }
            Value::Object(obj) => {
                let keys: Vec<String> = obj.keys().cloned().collect();
                let mut entries = obj.into_iter();
                let (Some((name, args)), None) = (entries.next(), entries.next()) else {
                    return Err(serde::de::Error::custom(format!(
                        "input requirement object must have exactly one key; got keys: {:?}",
                        keys
                    )));
                };
                let args = match args {
                    Value::Array(items) => items,
                    Value::Null => Vec::new(),
                    single => vec![single],
                };
                Ok(InputRequirementSpec::new(name, args))
            }
            other => Err(serde::de::Error::custom(format!(
                "input requirement must be a string, list or object; got {}",
                other
            ))),
        }
    }
}

impl Serialize for InputRequirementSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.args.is_empty() {
            serializer.serialize_str(&self.name)
        } else {
            let mut items = vec![Value::String(self.name.clone())];
            items.extend(self.args.iter().cloned());
            items.serialize(serializer)
        }
    }
}

/// Declarative definition of one column. `class` may be omitted in overrides that only
/// change input requirements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ColumnKind>,
    #[serde(default)]
    pub input_requirements: Vec<InputRequirementSpec>,
}

impl ColumnDefinition {
    pub fn new(kind: ColumnKind) -> Self {
        ColumnDefinition {
            kind: Some(kind),
            input_requirements: Vec::new(),
        }
    }

    /// An override that leaves the column class alone.
    pub fn requirements_only(input_requirements: Vec<InputRequirementSpec>) -> Self {
        ColumnDefinition {
            kind: None,
            input_requirements,
        }
    }

    pub fn with_requirement(mut self, requirement: InputRequirementSpec) -> Self {
        self.input_requirements.push(requirement);
        self
    }

    pub fn with_requirements(mut self, requirements: Vec<InputRequirementSpec>) -> Self {
        self.input_requirements.extend(requirements);
        self
    }
}
