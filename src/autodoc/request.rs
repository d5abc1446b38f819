//! Per-endpoint documentation: parameters, responses and requests.

use super::Schema;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParameterLocation {
    #[default]
    JsonBody,
    Query,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub definition: Schema,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: String,
}

impl Parameter {
    pub fn json_body(definition: Schema) -> Self {
        Parameter {
            definition,
            location: ParameterLocation::JsonBody,
            required: false,
            description: String::new(),
        }
    }

    pub fn query(definition: Schema) -> Self {
        Parameter {
            location: ParameterLocation::Query,
            ..Parameter::json_body(definition)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResponseDoc {
    pub status: u16,
    pub schema: Schema,
    pub description: String,
}

impl ResponseDoc {
    pub fn new(status: u16, schema: Schema, description: impl Into<String>) -> Self {
        ResponseDoc {
            status,
            schema,
            description: description.into(),
        }
    }
}

/// Documentation for one endpoint, relative to wherever its handler is mounted.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDoc {
    pub description: String,
    pub relative_path: String,
    pub request_methods: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<ResponseDoc>,
}

impl RequestDoc {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn response(&self, status: u16) -> Option<&ResponseDoc> {
        self.responses.iter().find(|r| r.status == status)
    }
}
