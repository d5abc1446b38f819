//! Standard response envelope helpers.
//!
//! Every handler response has the same five keys: `status`, `data`, `pagination`, `error`
//! and `input_errors`. Keys and the status value follow the handler's external casing.

use crate::case::{CaseMapping, Casing};
use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_CLIENT_ERROR: &str = "client_error";
pub const STATUS_FAILURE: &str = "failure";

/// Names of the envelope keys, in the order they are documented.
pub const ENVELOPE_KEYS: [&str; 5] = ["status", "data", "pagination", "error", "input_errors"];

/// Outcome of one handler invocation, ready to be turned into an HTTP response.
#[derive(Clone, Debug)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: Value,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl HandlerResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        HandlerResponse {
            status,
            body,
            headers: Vec::new(),
        }
    }

    pub fn with_headers(mut self, headers: &[(HeaderName, HeaderValue)]) -> Self {
        self.headers.extend(headers.iter().cloned());
        self
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        (self.status, headers, Json(self.body)).into_response()
    }
}

fn status_value(status: &str, casing: &CaseMapping) -> Value {
    Value::String(crate::case::swap_casing(status, Casing::Snake, casing.external))
}

/// Full envelope with empty data, used for errors.
pub fn envelope(status: &str, error: &str, casing: &CaseMapping) -> Value {
    let mut body = Map::new();
    body.insert(casing.to_external("status"), status_value(status, casing));
    body.insert(casing.to_external("data"), Value::Array(Vec::new()));
    body.insert(casing.to_external("pagination"), Value::Object(Map::new()));
    body.insert(casing.to_external("error"), Value::String(error.to_string()));
    body.insert(casing.to_external("input_errors"), Value::Object(Map::new()));
    Value::Object(body)
}

/// Successful envelope. `data` and `pagination` must already be externally cased.
pub fn success_body(data: Value, pagination: Value, casing: &CaseMapping) -> Value {
    let mut body = Map::new();
    body.insert(casing.to_external("status"), status_value(STATUS_SUCCESS, casing));
    body.insert(casing.to_external("data"), data);
    body.insert(casing.to_external("pagination"), pagination);
    body.insert(casing.to_external("error"), Value::String(String::new()));
    body.insert(casing.to_external("input_errors"), Value::Object(Map::new()));
    Value::Object(body)
}

pub fn success(data: Value, pagination: Value, casing: &CaseMapping) -> HandlerResponse {
    HandlerResponse::new(StatusCode::OK, success_body(data, pagination, casing))
}

pub fn client_error(message: &str, status: StatusCode, casing: &CaseMapping) -> HandlerResponse {
    HandlerResponse::new(status, envelope(STATUS_CLIENT_ERROR, message, casing))
}

pub fn failure(casing: &CaseMapping) -> HandlerResponse {
    HandlerResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        envelope(STATUS_FAILURE, "Internal server error", casing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_is_cased() {
        let casing = CaseMapping::new(Casing::Snake, Casing::Title);
        let body = envelope(STATUS_CLIENT_ERROR, "Not Authenticated", &casing);
        assert_eq!(
            json!({
                "Status": "ClientError",
                "Data": [],
                "Pagination": {},
                "Error": "Not Authenticated",
                "InputErrors": {}
            }),
            body
        );
    }

    #[test]
    fn success_envelope_defaults_to_snake_case() {
        let body = success_body(json!([]), json!({"limit": 100}), &CaseMapping::default());
        assert_eq!("success", body["status"]);
        assert_eq!(json!({"limit": 100}), body["pagination"]);
        assert_eq!("", body["error"]);
    }
}
