//! Schema tree describing request and response bodies.

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
        }
    }
}

/// A named node in a documentation tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Allowed values, for enumerations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_definition: Option<Box<Schema>>,
}

impl Schema {
    fn new(name: impl Into<String>, schema_type: SchemaType) -> Self {
        Schema {
            name: name.into(),
            schema_type,
            description: String::new(),
            example: None,
            format: None,
            values: Vec::new(),
            children: Vec::new(),
            item_definition: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Schema::new(name, SchemaType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Schema::new(name, SchemaType::Integer)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Schema::new(name, SchemaType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Schema::new(name, SchemaType::Boolean)
    }

    pub fn object(name: impl Into<String>, children: Vec<Schema>) -> Self {
        Schema {
            children,
            ..Schema::new(name, SchemaType::Object)
        }
    }

    pub fn array(name: impl Into<String>, item_definition: Schema) -> Self {
        Schema {
            item_definition: Some(Box::new(item_definition)),
            ..Schema::new(name, SchemaType::Array)
        }
    }

    /// A string restricted to `values`.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Schema {
            values: values.into_iter().map(Into::into).collect(),
            ..Schema::new(name, SchemaType::String)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.schema_type.as_str()
    }

    pub fn child(&self, name: &str) -> Option<&Schema> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookup() {
        let doc = Schema::object(
            "body",
            vec![Schema::array(
                "where",
                Schema::object("condition", vec![Schema::enumeration("column", ["name", "age"])]),
            )],
        );
        let item = doc.child("where").and_then(|w| w.item_definition.as_deref()).unwrap();
        let column = item.child("column").unwrap();
        assert_eq!("string", column.type_name());
        assert_eq!(vec!["name".to_string(), "age".to_string()], column.values);
        assert!(doc.child("sort").is_none());
    }

    #[test]
    fn serializes_without_empty_fields() {
        let doc = Schema::string("email").with_format("email").with_example(json!("a@example.com"));
        assert_eq!(
            json!({"name": "email", "schema_type": "string", "example": "a@example.com", "format": "email"}),
            serde_json::to_value(doc).unwrap()
        );
    }
}
