use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deprecation::{DeprecationState, SUNSET_EXTENSION};
use crate::endpoint::ParameterLocation;
use crate::schema::Schema;

/// One alternative of a security requirement list: scheme name to scopes.
///
/// A list of requirements is satisfied when any one of them is.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// A single API operation (one method on one path).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// `None` inherits the document-level requirements; `Some(vec![])`
    /// explicitly removes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
    /// Document this operation was taken from, when documents were merged
    /// before comparison. Falls back to the document source when unset.
    #[serde(skip)]
    pub origin: Option<String>,
}

impl Operation {
    pub fn sunset(&self) -> Option<&Value> {
        self.extensions.get(SUNSET_EXTENSION)
    }

    pub fn deprecation(&self) -> DeprecationState {
        DeprecationState::of(self.deprecated, self.sunset())
    }
}

/// A request parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(location: ParameterLocation, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location,
            required: location == ParameterLocation::Path,
            deprecated: false,
            style: None,
            explode: None,
            schema: None,
            description: None,
        }
    }
}

/// Request body of an operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: BTreeMap<String, MediaType>,
    pub required: bool,
}

/// A response for one status code (or `default`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

/// Payload description for one media type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl MediaType {
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
        }
    }
}

/// Classification of a response status key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// `1xx`, `2xx` and `3xx` codes (and their `2XX` style ranges).
    Success,
    /// `4xx`, `5xx` and `default`.
    NonSuccess,
}

impl StatusClass {
    pub fn of(status: &str) -> Self {
        match status.as_bytes().first() {
            Some(b'1' | b'2' | b'3') => Self::Success,
            _ => Self::NonSuccess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_operation() {
        let op: Operation = serde_json::from_value(json!({
            "operationId": "listPets",
            "tags": ["pets"],
            "deprecated": true,
            "x-sunset": "2031-01-01",
            "parameters": [
                {"name": "limit", "in": "query", "schema": {"type": "integer"}}
            ],
            "responses": {
                "200": {"content": {"application/json": {"schema": {"type": "array"}}}}
            },
            "security": [{"oauth": ["read"]}]
        }))
        .unwrap();

        assert_eq!(op.operation_id.as_deref(), Some("listPets"));
        assert_eq!(op.parameters[0].location, ParameterLocation::Query);
        assert_eq!(op.parameters[0].name, "limit");
        assert!(op.deprecation().is_deprecated());
        assert_eq!(op.security.as_ref().map(Vec::len), Some(1));
        assert!(op.origin.is_none());
    }

    #[test]
    fn path_parameters_default_to_required() {
        assert!(Parameter::new(ParameterLocation::Path, "id").required);
        assert!(!Parameter::new(ParameterLocation::Query, "q").required);
    }

    #[test]
    fn status_classes() {
        assert_eq!(StatusClass::of("200"), StatusClass::Success);
        assert_eq!(StatusClass::of("3XX"), StatusClass::Success);
        assert_eq!(StatusClass::of("404"), StatusClass::NonSuccess);
        assert_eq!(StatusClass::of("default"), StatusClass::NonSuccess);
    }
}
