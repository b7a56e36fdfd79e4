//! Operation-level diff for one matched endpoint.

use std::collections::BTreeMap;

use apidelta_types::{Document, Method, Operation, PathItem};
use serde::Serialize;
use serde_json::Value;

use crate::content_diff::{diff_request_body, diff_responses, RequestBodyChange, ResponsesDiff};
use crate::parameter_diff::{diff_parameters, ParametersDiff};
use crate::security_diff::{diff_security, SecurityDiff};
use crate::value::{Change, StringsDiff, ValueDiff};

/// Operations of one matched path, keyed by method.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsDiff<'a> {
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "crate::value::serialize_keys"
    )]
    pub added: BTreeMap<Method, &'a Operation>,
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "crate::value::serialize_keys"
    )]
    pub deleted: BTreeMap<Method, &'a Operation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<Method, OperationDiff<'a>>,
}

impl OperationsDiff<'_> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

/// Differences between two versions of one operation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDiff<'a> {
    #[serde(skip)]
    pub base: &'a Operation,
    #[serde(skip)]
    pub revision: &'a Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_diff: Option<ValueDiff<Option<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_diff: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_diff: Option<ValueDiff<bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset_diff: Option<ValueDiff<Option<Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters_diff: Option<ParametersDiff<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_diff: Option<RequestBodyChange<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_diff: Option<ResponsesDiff<'a>>,
    /// Compares the requirements in force, document-level ones included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_diff: Option<SecurityDiff>,
}

impl OperationDiff<'_> {
    fn is_empty(&self) -> bool {
        self.operation_id_diff.is_none()
            && self.summary_diff.is_none()
            && self.tags_diff.is_none()
            && self.deprecated_diff.is_none()
            && self.sunset_diff.is_none()
            && self.parameters_diff.is_none()
            && self.request_body_diff.is_none()
            && self.responses_diff.is_none()
            && self.security_diff.is_none()
    }
}

/// Both sides of a matched endpoint, with the documents they belong to.
pub(crate) struct EndpointPair<'a> {
    pub base_doc: &'a Document,
    pub revision_doc: &'a Document,
    pub base_item: &'a PathItem,
    pub revision_item: &'a PathItem,
    /// Revision path-parameter name to base name.
    pub renames: BTreeMap<String, String>,
}

pub(crate) fn diff_operations<'a>(pair: &EndpointPair<'a>) -> Option<OperationsDiff<'a>> {
    let mut result = OperationsDiff::default();
    for method in Method::ALL {
        let base = pair.base_item.operation(method);
        let revision = pair.revision_item.operation(method);
        match Change::compare(base, revision, |b, r| diff_operation(pair, b, r)) {
            Some(Change::Added(op)) => {
                result.added.insert(method, op);
            }
            Some(Change::Deleted(op)) => {
                result.deleted.insert(method, op);
            }
            Some(Change::Modified(d)) => {
                result.modified.insert(method, d);
            }
            None => {}
        }
    }
    (!result.is_empty()).then_some(result)
}

fn diff_operation<'a>(
    pair: &EndpointPair<'a>,
    base: &'a Operation,
    revision: &'a Operation,
) -> Option<OperationDiff<'a>> {
    let base_params = pair.base_item.effective_parameters(base);
    let revision_params = pair.revision_item.effective_parameters(revision);

    let diff = OperationDiff {
        base,
        revision,
        operation_id_diff: ValueDiff::between(&base.operation_id, &revision.operation_id),
        summary_diff: ValueDiff::between(&base.summary, &revision.summary),
        tags_diff: StringsDiff::between(&base.tags, &revision.tags),
        deprecated_diff: ValueDiff::between(&base.deprecated, &revision.deprecated),
        sunset_diff: ValueDiff::between(&base.sunset().cloned(), &revision.sunset().cloned()),
        parameters_diff: diff_parameters(&base_params, &revision_params, &pair.renames),
        request_body_diff: Change::compare(
            base.request_body.as_ref(),
            revision.request_body.as_ref(),
            diff_request_body,
        ),
        responses_diff: diff_responses(&base.responses, &revision.responses),
        security_diff: diff_security(
            pair.base_doc.effective_security(base),
            pair.revision_doc.effective_security(revision),
        ),
    };

    (!diff.is_empty()).then_some(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> PathItem {
        serde_json::from_value(value).unwrap()
    }

    fn pair<'a>(doc: &'a Document, base: &'a PathItem, revision: &'a PathItem) -> EndpointPair<'a> {
        EndpointPair {
            base_doc: doc,
            revision_doc: doc,
            base_item: base,
            revision_item: revision,
            renames: BTreeMap::new(),
        }
    }

    #[test]
    fn methods_added_and_removed() {
        let doc = Document::default();
        let base = item(json!({"get": {"responses": {}}, "delete": {"responses": {}}}));
        let revision = item(json!({"get": {"responses": {}}, "post": {"responses": {}}}));
        let d = diff_operations(&pair(&doc, &base, &revision)).unwrap();
        assert!(d.added.contains_key(&Method::Post));
        assert!(d.deleted.contains_key(&Method::Delete));
        assert!(d.modified.is_empty());
    }

    #[test]
    fn path_level_parameter_change_reaches_each_operation() {
        let doc = Document::default();
        let base = item(json!({
            "parameters": [{"name": "v", "in": "query"}],
            "get": {"responses": {}},
            "put": {"responses": {}}
        }));
        let revision = item(json!({
            "parameters": [{"name": "v", "in": "query", "required": true}],
            "get": {"responses": {}},
            "put": {"responses": {}}
        }));
        let d = diff_operations(&pair(&doc, &base, &revision)).unwrap();
        assert_eq!(d.modified.len(), 2);
        assert!(d.modified[&Method::Get].parameters_diff.is_some());
    }

    #[test]
    fn inherited_security_is_compared() {
        let base_doc: Document = serde_json::from_value(json!({"security": [{"apiKey": []}]})).unwrap();
        let revision_doc = Document::default();
        let base = item(json!({"get": {"responses": {}}}));
        let p = EndpointPair {
            base_doc: &base_doc,
            revision_doc: &revision_doc,
            base_item: &base,
            revision_item: &base,
            renames: BTreeMap::new(),
        };
        let d = diff_operations(&p).unwrap();
        let security = d.modified[&Method::Get].security_diff.as_ref().unwrap();
        assert_eq!(security.deleted, vec!["apiKey".to_string()]);
    }

    #[test]
    fn request_body_added() {
        let doc = Document::default();
        let base = item(json!({"post": {"responses": {}}}));
        let revision = item(json!({"post": {"requestBody": {"required": true, "content": {}}, "responses": {}}}));
        let d = diff_operations(&pair(&doc, &base, &revision)).unwrap();
        let body = d.modified[&Method::Post].request_body_diff.as_ref().unwrap();
        assert!(body.added().unwrap().required);
    }
}
