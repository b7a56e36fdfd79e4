//! Endpoint matching across documents.
//!
//! Each document's path templates are reduced to a match key: a configured
//! prefix is stripped, then, when path parameters are matched by position,
//! every `{name}` segment becomes `{}`. Templates sharing a match key are
//! the same endpoint. Two templates of one document sharing a key make the
//! match ambiguous and abort the comparison.

use std::collections::BTreeMap;

use apidelta_types::{normalize_template, template_params, Document, PathItem};
use serde::Serialize;

use crate::config::DiffConfig;
use crate::error::{DiffError, DiffResult};
use crate::operation_diff::{diff_operations, EndpointPair, OperationsDiff};
use crate::value::ValueDiff;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsDiff<'a> {
    /// Revision templates with no base counterpart.
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "crate::value::serialize_keys"
    )]
    pub added: BTreeMap<String, &'a PathItem>,
    /// Base templates with no revision counterpart.
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "crate::value::serialize_keys"
    )]
    pub deleted: BTreeMap<String, &'a PathItem>,
    /// Matched endpoints keyed by revision template.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<String, PathDiff<'a>>,
}

impl PathsDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDiff<'a> {
    #[serde(skip)]
    pub base: &'a PathItem,
    #[serde(skip)]
    pub revision: &'a PathItem,
    /// Base template, when it is spelled differently from the revision's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_diff: Option<OperationsDiff<'a>>,
}

impl PathDiff<'_> {
    /// Template on the base side, given the revision template this diff is
    /// keyed under.
    pub fn base_path<'s>(&'s self, revision_template: &'s str) -> &'s str {
        self.base_template.as_deref().unwrap_or(revision_template)
    }
}

/// Match key to `(template, path item)` for one document.
pub(crate) type PathIndex<'a> = BTreeMap<String, (&'a str, &'a PathItem)>;

/// Reduce a template to the key it is matched under.
pub fn match_key(template: &str, strip_prefix: &str, path_param_aware: bool) -> String {
    let stripped = match template.strip_prefix(strip_prefix) {
        Some(rest) if !strip_prefix.is_empty() => {
            if rest.is_empty() {
                "/"
            } else {
                rest
            }
        }
        _ => template,
    };
    if path_param_aware {
        normalize_template(stripped)
    } else {
        stripped.to_string()
    }
}

pub(crate) fn index_paths<'a>(
    doc: &'a Document,
    strip_prefix: &str,
    path_param_aware: bool,
) -> DiffResult<PathIndex<'a>> {
    let mut index = PathIndex::new();
    for (template, item) in &doc.paths {
        let key = match_key(template, strip_prefix, path_param_aware);
        if let Some((first, _)) = index.get(&key) {
            return Err(DiffError::AmbiguousEndpoint {
                document: doc.source.clone(),
                key,
                first: first.to_string(),
                second: template.clone(),
            });
        }
        index.insert(key, (template.as_str(), item));
    }
    Ok(index)
}

pub(crate) fn diff_paths<'a>(
    config: &DiffConfig,
    base_doc: &'a Document,
    revision_doc: &'a Document,
) -> DiffResult<Option<PathsDiff<'a>>> {
    let aware = config.path_param_aware;
    let base = index_paths(base_doc, &config.strip_prefix_base, aware)?;
    let revision = index_paths(revision_doc, &config.strip_prefix_revision, aware)?;

    let mut result = PathsDiff::default();
    for (key, (base_template, base_item)) in &base {
        let Some((revision_template, revision_item)) = revision.get(key) else {
            result.deleted.insert(base_template.to_string(), *base_item);
            continue;
        };

        let renames = if aware {
            rename_map(base_template, revision_template)
        } else {
            BTreeMap::new()
        };
        let pair = EndpointPair {
            base_doc,
            revision_doc,
            base_item: *base_item,
            revision_item: *revision_item,
            renames,
        };
        let summary_diff = ValueDiff::between(&base_item.summary, &revision_item.summary);
        let operations_diff = diff_operations(&pair);
        if summary_diff.is_some() || operations_diff.is_some() {
            let diff = PathDiff {
                base: *base_item,
                revision: *revision_item,
                base_template: (base_template != revision_template)
                    .then(|| base_template.to_string()),
                summary_diff,
                operations_diff,
            };
            result.modified.insert(revision_template.to_string(), diff);
        }
    }
    for (key, (revision_template, revision_item)) in &revision {
        if !base.contains_key(key) {
            result.added.insert(revision_template.to_string(), *revision_item);
        }
    }

    tracing::debug!(
        added = result.added.len(),
        deleted = result.deleted.len(),
        modified = result.modified.len(),
        "paths compared"
    );
    Ok((!result.is_empty()).then_some(result))
}

/// Revision path-parameter name to base name, position by position.
fn rename_map(base_template: &str, revision_template: &str) -> BTreeMap<String, String> {
    template_params(revision_template)
        .into_iter()
        .zip(template_params(base_template))
        .filter(|(r, b)| r != b)
        .map(|(r, b)| (r.to_string(), b.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn match_key_strips_prefix_then_normalizes() {
        assert_eq!(match_key("/api/v1/users/{id}", "/api/v1", true), "/users/{}");
        assert_eq!(match_key("/api/v1", "/api/v1", false), "/");
        assert_eq!(match_key("/other", "/api/v1", false), "/other");
        assert_eq!(match_key("/users/{id}", "", false), "/users/{id}");
    }

    #[test]
    fn renamed_path_parameter_is_add_and_delete_by_default() {
        let base = doc(json!({"paths": {"/users/{id}": {"get": {"responses": {}}}}}));
        let revision = doc(json!({"paths": {"/users/{userId}": {"get": {"responses": {}}}}}));
        let d = diff_paths(&DiffConfig::default(), &base, &revision).unwrap().unwrap();
        assert!(d.added.contains_key("/users/{userId}"));
        assert!(d.deleted.contains_key("/users/{id}"));
    }

    #[test]
    fn renamed_path_parameter_matches_when_aware() {
        let get = json!({"parameters": [{"name": "id", "in": "path", "required": true}], "responses": {}});
        let get_renamed = json!({"parameters": [{"name": "userId", "in": "path", "required": true}], "responses": {}});
        let base = doc(json!({"paths": {"/users/{id}": {"get": get}}}));
        let revision = doc(json!({"paths": {"/users/{userId}": {"get": get_renamed}}}));
        let config = DiffConfig {
            path_param_aware: true,
            ..DiffConfig::default()
        };

        let d = diff_paths(&config, &base, &revision).unwrap().unwrap();
        assert!(d.added.is_empty() && d.deleted.is_empty());
        let path = &d.modified["/users/{userId}"];
        assert_eq!(path.base_path("/users/{userId}"), "/users/{id}");
        let ops = path.operations_diff.as_ref().unwrap();
        let params = ops.modified[&apidelta_types::Method::Get].parameters_diff.as_ref().unwrap();
        assert!(params.added.is_empty() && params.deleted.is_empty());
    }

    #[test]
    fn colliding_templates_are_rejected() {
        let base = doc(json!({"paths": {"/a/{x}": {}, "/a/{y}": {}}})).with_source("base.json");
        let config = DiffConfig {
            path_param_aware: true,
            ..DiffConfig::default()
        };
        let err = diff_paths(&config, &base, &Document::default()).unwrap_err();
        match err {
            DiffError::AmbiguousEndpoint { document, first, second, .. } => {
                assert_eq!(document, "base.json");
                assert_eq!(first, "/a/{x}");
                assert_eq!(second, "/a/{y}");
            }
            other => panic!("expected AmbiguousEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn prefix_stripping_matches_moved_paths() {
        let base = doc(json!({"paths": {"/v1/pets": {"get": {"responses": {}}}}}));
        let revision = doc(json!({"paths": {"/v2/pets": {"get": {"responses": {}}}}}));
        let config = DiffConfig {
            strip_prefix_base: "/v1".into(),
            strip_prefix_revision: "/v2".into(),
            ..DiffConfig::default()
        };
        assert!(diff_paths(&config, &base, &revision).unwrap().is_none());
    }
}
