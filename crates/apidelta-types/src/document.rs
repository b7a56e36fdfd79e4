use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::endpoint::{Method, ParameterLocation};
use crate::operation::{Operation, Parameter, SecurityRequirement};
use crate::schema::Schema;

/// A parsed API description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    pub paths: Paths,
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Where the document was loaded from. Recorded in findings.
    #[serde(skip)]
    pub source: String,
}

impl Document {
    /// Attach the origin of this document (usually its file name).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Iterate over every operation as `(path, method, path item, operation)`.
    pub fn operations(&self) -> impl Iterator<Item = (&str, Method, &PathItem, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, op)| (path.as_str(), method, item, op))
        })
    }

    /// Security requirements in force for `op`.
    pub fn effective_security<'a>(&'a self, op: &'a Operation) -> &'a [SecurityRequirement] {
        op.security.as_deref().unwrap_or(&self.security)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Path templates mapped to their path items.
///
/// Deserialization rejects a template that appears twice; a plain map would
/// keep the last occurrence and silently drop the first.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Paths(BTreeMap<String, PathItem>);

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: impl Into<String>, item: PathItem) -> Option<PathItem> {
        self.0.insert(template.into(), item)
    }

    pub fn get(&self, template: &str) -> Option<&PathItem> {
        self.0.get(template)
    }

    pub fn get_mut(&mut self, template: &str) -> Option<&mut PathItem> {
        self.0.get_mut(template)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, PathItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Paths {
    type Item = (&'a String, &'a PathItem);
    type IntoIter = btree_map::Iter<'a, String, PathItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, PathItem)> for Paths {
    fn from_iter<I: IntoIterator<Item = (String, PathItem)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Paths {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathsVisitor;

        impl<'de> Visitor<'de> for PathsVisitor {
            type Value = Paths;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path templates to path items")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Paths, A::Error> {
                let mut map = BTreeMap::new();
                while let Some((template, item)) = access.next_entry::<String, PathItem>()? {
                    if map.contains_key(&template) {
                        return Err(serde::de::Error::custom(
                            crate::TypeError::DuplicatePath(template),
                        ));
                    }
                    map.insert(template, item);
                }
                Ok(Paths(map))
            }
        }

        deserializer.deserialize_map(PathsVisitor)
    }
}

// ---------------------------------------------------------------------------
// PathItem
// ---------------------------------------------------------------------------

/// Operations available on one path template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Patch => self.patch.as_ref(),
            Method::Trace => self.trace.as_ref(),
        }
    }

    /// Defined operations in method order.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        Method::ALL
            .into_iter()
            .filter_map(|m| self.operation(m).map(|op| (m, op)))
    }

    /// Path-level parameters merged with the operation's own; an
    /// operation parameter with the same location and name wins.
    pub fn effective_parameters<'a>(&'a self, op: &'a Operation) -> Vec<&'a Parameter> {
        let mut merged: BTreeMap<(ParameterLocation, &str), &'a Parameter> = BTreeMap::new();
        for param in self.parameters.iter().chain(op.parameters.iter()) {
            merged.insert((param.location, param.name.as_str()), param);
        }
        merged.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn petstore() -> Document {
        serde_json::from_value(json!({
            "openapi": "3.0.3",
            "info": {"title": "pets", "version": "1"},
            "security": [{"apiKey": []}],
            "paths": {
                "/pets/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "trace", "in": "header", "schema": {"type": "string"}}
                    ],
                    "get": {
                        "parameters": [
                            {"name": "trace", "in": "header", "required": true, "schema": {"type": "string"}}
                        ],
                        "responses": {"200": {}}
                    },
                    "delete": {"security": [], "responses": {"204": {}}}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn iterates_operations_in_method_order() {
        let doc = petstore();
        let methods: Vec<_> = doc.operations().map(|(_, m, _, _)| m).collect();
        assert_eq!(methods, vec![Method::Get, Method::Delete]);
    }

    #[test]
    fn operation_parameters_override_path_parameters() {
        let doc = petstore();
        let item = doc.paths.get("/pets/{id}").unwrap();
        let get = item.get.as_ref().unwrap();
        let params = item.effective_parameters(get);
        assert_eq!(params.len(), 2);
        let trace = params.iter().find(|p| p.name == "trace").unwrap();
        assert!(trace.required);
    }

    #[test]
    fn operation_security_overrides_document_security() {
        let doc = petstore();
        let item = doc.paths.get("/pets/{id}").unwrap();
        assert_eq!(doc.effective_security(item.get.as_ref().unwrap()).len(), 1);
        assert!(doc.effective_security(item.delete.as_ref().unwrap()).is_empty());
    }

    #[test]
    fn duplicate_path_templates_are_rejected() {
        let raw = r#"{"paths": {"/a": {}, "/b": {}, "/a": {}}}"#;
        let err = serde_json::from_str::<Document>(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate path template: /a"));
    }

    #[test]
    fn source_is_not_serialized() {
        let doc = Document::default().with_source("base.json");
        assert_eq!(doc.source, "base.json");
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("source").is_none());
    }
}
