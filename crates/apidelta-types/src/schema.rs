use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deprecation::{DeprecationState, SUNSET_EXTENSION};

/// A data-shape node.
///
/// References are expected to be resolved by the loader. When a schema was
/// reached through `$ref`, the reference is kept in [`Schema::reference`] next
/// to the resolved content; it is the subschema's identity inside
/// `allOf`/`oneOf`/`anyOf` lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub write_only: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
    /// Every key not modelled above. Only `x-` keys take part in diffs.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    /// Shorthand for a schema with only a type.
    pub fn of_type(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }

    /// Returns `true` if `name` is listed in the required set.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Raw `x-sunset` value, if declared.
    pub fn sunset(&self) -> Option<&Value> {
        self.extensions.get(SUNSET_EXTENSION)
    }

    pub fn deprecation(&self) -> DeprecationState {
        DeprecationState::of(self.deprecated, self.sunset())
    }

    /// Vendor extensions (keys starting with `x-`).
    pub fn vendor_extensions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.extensions.iter().filter(|(k, _)| k.starts_with("x-"))
    }

    /// Iterate over every composition list with its keyword.
    pub fn compositions(&self) -> [(&'static str, &[Schema]); 3] {
        [
            ("allOf", self.all_of.as_slice()),
            ("oneOf", self.one_of.as_slice()),
            ("anyOf", self.any_of.as_slice()),
        ]
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_openapi_keywords() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "string", "readOnly": true},
                "kind": {"type": "string", "enum": ["a", "b"]}
            },
            "x-sunset": "2030-01-01",
            "example": {"id": "1"}
        }))
        .unwrap();

        assert_eq!(schema.kind.as_deref(), Some("object"));
        assert!(schema.is_required("id"));
        assert!(schema.properties["id"].read_only);
        assert_eq!(schema.properties["kind"].enum_values.len(), 2);
        assert_eq!(schema.sunset(), Some(&json!("2030-01-01")));
        assert_eq!(schema.vendor_extensions().count(), 1);
        assert!(schema.extensions.contains_key("example"));
    }

    #[test]
    fn keeps_reference_identity() {
        let schema: Schema = serde_json::from_value(json!({
            "allOf": [
                {"$ref": "#/components/schemas/Base", "type": "object"},
                {"type": "object", "properties": {"extra": {"type": "integer"}}}
            ]
        }))
        .unwrap();
        assert_eq!(
            schema.all_of[0].reference.as_deref(),
            Some("#/components/schemas/Base")
        );
        assert!(schema.all_of[1].reference.is_none());
    }

    #[test]
    fn serialization_omits_defaults() {
        let value = serde_json::to_value(Schema::of_type("string")).unwrap();
        assert_eq!(value, json!({"type": "string"}));
    }
}
