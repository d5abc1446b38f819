//! OpenAPI 3 rendering of handler documentation.

use super::{ParameterLocation, RequestDoc, Schema, SchemaType};
use crate::error::ConfigError;
use crate::handlers::Handler;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use utoipa::openapi::{
    path::{OperationBuilder, ParameterBuilder, ParameterIn},
    request_body::RequestBodyBuilder,
    schema::{Array, ObjectBuilder, Schema as OaSchema, SchemaFormat, Type},
    ContentBuilder, InfoBuilder, OpenApiBuilder, PathItem, PathsBuilder, Required, ResponseBuilder,
};

const JSON: &str = "application/json";

#[derive(Clone, Debug)]
struct Endpoint {
    path: String,
    requests: Vec<RequestDoc>,
    security_schemes: Vec<(String, Value)>,
}

/// Collects endpoint documentation and renders it as one OpenAPI document.
#[derive(Clone, Debug)]
pub struct OpenApiDocument {
    title: String,
    version: String,
    endpoints: Vec<Endpoint>,
}

fn join_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    match (base.is_empty(), relative.is_empty()) {
        (_, true) if base.is_empty() => "/".to_string(),
        (_, true) => base.to_string(),
        (true, false) => format!("/{}", relative),
        (false, false) => format!("{}/{}", base, relative),
    }
}

fn optional_text(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

pub fn to_openapi_schema(schema: &Schema) -> OaSchema {
    match schema.schema_type {
        SchemaType::Array => {
            let item = schema
                .item_definition
                .as_deref()
                .map(to_openapi_schema)
                .unwrap_or_else(|| OaSchema::Object(ObjectBuilder::new().build()));
            let mut array = Array::new(item);
            array.description = optional_text(&schema.description);
            OaSchema::Array(array)
        }
        SchemaType::Object => {
            let mut builder = ObjectBuilder::new()
                .schema_type(Type::Object)
                .description(optional_text(&schema.description));
            for child in &schema.children {
                builder = builder.property(child.name.clone(), to_openapi_schema(child));
            }
            OaSchema::Object(builder.build())
        }
        scalar => {
            let schema_type = match scalar {
                SchemaType::Integer => Type::Integer,
                SchemaType::Number => Type::Number,
                SchemaType::Boolean => Type::Boolean,
                _ => Type::String,
            };
            let mut builder = ObjectBuilder::new()
                .schema_type(schema_type)
                .description(optional_text(&schema.description))
                .format(schema.format.clone().map(SchemaFormat::Custom))
                .enum_values((!schema.values.is_empty()).then(|| schema.values.clone()));
            if let Some(example) = &schema.example {
                builder = builder.examples([example.clone()]);
            }
            OaSchema::Object(builder.build())
        }
    }
}

fn operation(request: &RequestDoc) -> utoipa::openapi::path::Operation {
    let mut builder = OperationBuilder::new().description(optional_text(&request.description));

    let mut body = ObjectBuilder::new().schema_type(Type::Object);
    let mut has_body = false;
    for parameter in &request.parameters {
        match parameter.location {
            ParameterLocation::JsonBody => {
                has_body = true;
                body = body.property(parameter.name().to_string(), to_openapi_schema(&parameter.definition));
                if parameter.required {
                    body = body.required(parameter.name().to_string());
                }
            }
            ParameterLocation::Query => {
                let required = if parameter.required { Required::True } else { Required::False };
                builder = builder.parameter(
                    ParameterBuilder::new()
                        .name(parameter.name())
                        .parameter_in(ParameterIn::Query)
                        .required(required)
                        .description(optional_text(&parameter.description))
                        .schema(Some(to_openapi_schema(&parameter.definition)))
                        .build(),
                );
            }
        }
    }
    if has_body {
        builder = builder.request_body(Some(
            RequestBodyBuilder::new()
                .content(JSON, ContentBuilder::new().schema(Some(OaSchema::Object(body.build()))).build())
                .build(),
        ));
    }

    for response in &request.responses {
        builder = builder.response(
            response.status.to_string(),
            ResponseBuilder::new()
                .description(response.description.clone())
                .content(JSON, ContentBuilder::new().schema(Some(to_openapi_schema(&response.schema))).build())
                .build(),
        );
    }
    builder.build()
}

fn set_operation(item: &mut PathItem, method: &str, op: utoipa::openapi::path::Operation) {
    let slot = match method.to_uppercase().as_str() {
        "GET" => &mut item.get,
        "POST" => &mut item.post,
        "PUT" => &mut item.put,
        "PATCH" => &mut item.patch,
        "DELETE" => &mut item.delete,
        "HEAD" => &mut item.head,
        "OPTIONS" => &mut item.options,
        _ => {
            tracing::warn!(method, "skipping undocumentable request method");
            return;
        }
    };
    *slot = Some(op);
}

impl OpenApiDocument {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        OpenApiDocument {
            title: title.into(),
            version: version.into(),
            endpoints: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every documented path with the methods served there, in registration order.
    pub fn endpoint_methods(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for endpoint in &self.endpoints {
            for request in &endpoint.requests {
                let path = join_path(&endpoint.path, &request.relative_path);
                let index = match out.iter().position(|(existing, _)| *existing == path) {
                    Some(index) => index,
                    None => {
                        out.push((path, Vec::new()));
                        out.len() - 1
                    }
                };
                for method in &request.request_methods {
                    let method = method.to_uppercase();
                    if !out[index].1.contains(&method) {
                        out[index].1.push(method);
                    }
                }
            }
        }
        out
    }

    /// Document a handler mounted at `path`.
    pub fn with_handler(self, path: &str, handler: &dyn Handler) -> Self {
        self.with_endpoint(path, handler.documentation(), handler.documentation_security_schemes())
    }

    pub fn with_endpoint(
        mut self,
        path: &str,
        requests: Vec<RequestDoc>,
        security_schemes: Vec<(String, Value)>,
    ) -> Self {
        self.endpoints.push(Endpoint {
            path: path.to_string(),
            requests,
            security_schemes,
        });
        self
    }

    pub fn to_value(&self) -> Result<Value, ConfigError> {
        let mut items: BTreeMap<String, PathItem> = BTreeMap::new();
        for endpoint in &self.endpoints {
            for request in &endpoint.requests {
                let item = items
                    .entry(join_path(&endpoint.path, &request.relative_path))
                    .or_default();
                for method in &request.request_methods {
                    set_operation(item, method, operation(request));
                }
            }
        }
        let mut paths = PathsBuilder::new();
        for (path, item) in items {
            paths = paths.path(path, item);
        }
        let openapi = OpenApiBuilder::new()
            .info(InfoBuilder::new().title(self.title.clone()).version(self.version.clone()).build())
            .paths(paths.build())
            .build();
        let mut doc = serde_json::to_value(&openapi)
            .map_err(|e| ConfigError::Invalid(format!("could not render OpenAPI document: {}", e)))?;
        self.apply_security(&mut doc);
        Ok(doc)
    }

    fn apply_security(&self, doc: &mut Value) {
        let mut schemes = Map::new();
        for endpoint in &self.endpoints {
            if endpoint.security_schemes.is_empty() {
                continue;
            }
            let requirement: Vec<Value> = endpoint
                .security_schemes
                .iter()
                .map(|(name, _)| {
                    let mut requirement = Map::new();
                    requirement.insert(name.clone(), Value::Array(Vec::new()));
                    Value::Object(requirement)
                })
                .collect();
            for (name, scheme) in &endpoint.security_schemes {
                schemes.insert(name.clone(), scheme.clone());
            }
            for request in &endpoint.requests {
                let path = join_path(&endpoint.path, &request.relative_path);
                for method in &request.request_methods {
                    if let Some(op) = doc
                        .pointer_mut(&format!("/paths/{}/{}", escape_pointer(&path), method.to_lowercase()))
                        .and_then(Value::as_object_mut)
                    {
                        op.insert("security".to_string(), Value::Array(requirement.clone()));
                    }
                }
            }
        }
        if schemes.is_empty() {
            return;
        }
        if let Some(root) = doc.as_object_mut() {
            let components = root
                .entry("components")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(components) = components.as_object_mut() {
                components.insert("securitySchemes".to_string(), Value::Object(schemes));
            }
        }
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
