//! Per-column input validators. Each check returns an empty string on success and a
//! human-readable message otherwise.

mod length;
mod required;
mod value;

pub use length::{MaximumLength, MinimumLength};
pub use required::Required;
pub use value::{MaximumValue, MinimumValue};

use crate::config::InputRequirementSpec;
use crate::error::ConfigError;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum InputRequirement {
    Required(Required),
    MinimumLength(MinimumLength),
    MaximumLength(MaximumLength),
    MinimumValue(MinimumValue),
    MaximumValue(MaximumValue),
}

impl InputRequirement {
    /// Bind a spec to a column, validating its arguments.
    pub fn build(spec: &InputRequirementSpec, column_name: &str) -> Result<Self, ConfigError> {
        let args = spec.args.as_slice();
        Ok(match spec.name.as_str() {
            "required" => InputRequirement::Required(Required::configure(column_name, args)?),
            "minimum_length" => InputRequirement::MinimumLength(MinimumLength::configure(column_name, args)?),
            "maximum_length" => InputRequirement::MaximumLength(MaximumLength::configure(column_name, args)?),
            "minimum_value" => InputRequirement::MinimumValue(MinimumValue::configure(column_name, args)?),
            "maximum_value" => InputRequirement::MaximumValue(MaximumValue::configure(column_name, args)?),
            other => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown input requirement '{}' for column '{}'",
                    other, column_name
                )))
            }
        })
    }

    /// Spec name this requirement was built from. Overrides replace requirements by name.
    pub fn name(&self) -> &'static str {
        match self {
            InputRequirement::Required(_) => "required",
            InputRequirement::MinimumLength(_) => "minimum_length",
            InputRequirement::MaximumLength(_) => "maximum_length",
            InputRequirement::MinimumValue(_) => "minimum_value",
            InputRequirement::MaximumValue(_) => "maximum_value",
        }
    }

    pub fn check(&self, data: &Map<String, Value>, is_update: bool) -> String {
        match self {
            InputRequirement::Required(r) => r.check(data, is_update),
            InputRequirement::MinimumLength(r) => r.check(data),
            InputRequirement::MaximumLength(r) => r.check(data),
            InputRequirement::MinimumValue(r) => r.check(data),
            InputRequirement::MaximumValue(r) => r.check(data),
        }
    }
}
