//! Traversal helpers shared by rules.

use apidelta_diff::{CompositionDiff, DiffTree, OperationDiff, SchemaDiff};
use apidelta_types::{Method, Operation};

use crate::finding::Finding;
use crate::rule::{CheckContext, Site};

/// A method present on both sides of a matched path.
pub(crate) struct ModifiedOperation<'t, 'a> {
    /// Revision template.
    pub path: &'t str,
    pub method: Method,
    pub diff: &'t OperationDiff<'a>,
}

impl<'a> ModifiedOperation<'_, 'a> {
    pub fn revision(&self) -> &'a Operation {
        self.diff.revision
    }
}

/// Every modified operation, in path then method order.
pub(crate) fn modified_operations<'t, 'a>(tree: &'t DiffTree<'a>) -> Vec<ModifiedOperation<'t, 'a>> {
    let Some(paths) = &tree.paths_diff else {
        return Vec::new();
    };
    paths
        .modified
        .iter()
        .filter_map(|(path, path_diff)| path_diff.operations_diff.as_ref().map(|ops| (path, ops)))
        .flat_map(|(path, ops)| {
            ops.modified.iter().map(move |(method, diff)| ModifiedOperation {
                path: path.as_str(),
                method: *method,
                diff,
            })
        })
        .collect()
}

/// A request or response payload schema that changed.
pub(crate) struct PayloadSchema<'t, 'a> {
    /// Human description, e.g. `request body (application/json)`.
    pub label: String,
    pub diff: &'t SchemaDiff<'a>,
}

/// Changed request body schemas of one operation.
pub(crate) fn request_body_schemas<'t, 'a>(op: &'t OperationDiff<'a>) -> Vec<PayloadSchema<'t, 'a>> {
    let Some(content) = op
        .request_body_diff
        .as_ref()
        .and_then(|body| body.modified())
        .and_then(|body| body.content_diff.as_ref())
    else {
        return Vec::new();
    };
    content
        .modified
        .iter()
        .filter_map(|(media, entry)| {
            let diff: &SchemaDiff<'a> = entry.schema_diff.as_ref()?.modified()?;
            Some(PayloadSchema {
                label: format!("request body ({media})"),
                diff,
            })
        })
        .collect()
}

/// Changed parameter schemas of one operation.
pub(crate) fn parameter_schemas<'t, 'a>(op: &'t OperationDiff<'a>) -> Vec<PayloadSchema<'t, 'a>> {
    let Some(params) = &op.parameters_diff else {
        return Vec::new();
    };
    params
        .modified_iter()
        .filter_map(|param| {
            let diff: &SchemaDiff<'a> = param.schema_diff.as_ref()?.modified()?;
            Some(PayloadSchema {
                label: format!("{} parameter '{}'", param.location(), param.name()),
                diff,
            })
        })
        .collect()
}

/// Request body and parameter schemas together.
pub(crate) fn request_schemas<'t, 'a>(op: &'t OperationDiff<'a>) -> Vec<PayloadSchema<'t, 'a>> {
    let mut schemas = request_body_schemas(op);
    schemas.extend(parameter_schemas(op));
    schemas
}

/// Changed response schemas of one operation.
pub(crate) fn response_schemas<'t, 'a>(op: &'t OperationDiff<'a>) -> Vec<PayloadSchema<'t, 'a>> {
    let Some(responses) = &op.responses_diff else {
        return Vec::new();
    };
    responses
        .modified
        .iter()
        .filter_map(|(status, response)| response.content_diff.as_ref().map(|c| (status, c)))
        .flat_map(|(status, content)| {
            content.modified.iter().filter_map(move |(media, entry)| {
                let diff: &SchemaDiff<'a> = entry.schema_diff.as_ref()?.modified()?;
                Some(PayloadSchema {
                    label: format!("response with status '{status}' ({media})"),
                    diff,
                })
            })
        })
        .collect()
}

/// Visit `diff` and every nested schema diff that is compared in place:
/// modified properties, modified items, and correlated composition branches.
///
/// The visitor gets the property path of the node (`""` at the root,
/// `a/b` below) and the node itself.
pub(crate) fn walk_schema<'t, 'a>(
    diff: &'t SchemaDiff<'a>,
    visit: &mut dyn FnMut(&str, &'t SchemaDiff<'a>),
) {
    walk_at(String::new(), diff, visit);
}

fn walk_at<'t, 'a>(
    path: String,
    diff: &'t SchemaDiff<'a>,
    visit: &mut dyn FnMut(&str, &'t SchemaDiff<'a>),
) {
    visit(&path, diff);

    if let Some(properties) = &diff.properties_diff {
        for (name, property) in &properties.modified {
            walk_at(property_path(&path, name), property, visit);
        }
    }
    if let Some(items) = diff.items_diff.as_ref().and_then(|c| c.modified()) {
        walk_at(path.clone(), items, visit);
    }
    for (_, composition) in diff.compositions() {
        if let CompositionDiff::Correlated { modified, .. } = composition {
            for branch in modified.values() {
                walk_at(path.clone(), branch, visit);
            }
        }
    }
}

/// Join a property path and a property name.
pub(crate) fn property_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Composition keywords of `diff` whose correlation was abandoned.
pub(crate) fn ambiguous_compositions(diff: &SchemaDiff<'_>) -> Vec<&'static str> {
    diff.compositions()
        .filter(|(_, c)| c.is_ambiguous())
        .map(|(keyword, _)| keyword)
        .collect()
}

/// Run `visit` on every schema node of one payload side, for every
/// modified operation.
pub(crate) fn for_each_node<'c>(
    ctx: &CheckContext<'c>,
    payloads: fn(&'c OperationDiff<'c>) -> Vec<PayloadSchema<'c, 'c>>,
    visit: &mut dyn FnMut(&Site, &PayloadSchema<'c, 'c>, &str, &'c SchemaDiff<'c>),
) {
    for op in modified_operations(ctx.tree) {
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for payload in payloads(op.diff) {
            walk_schema(payload.diff, &mut |path, node| visit(&site, &payload, path, node));
        }
    }
}

/// One finding per composition list of `node` whose correlation was
/// abandoned.
pub(crate) fn ambiguity_findings(
    ctx: &CheckContext<'_>,
    site: &Site,
    payload: &PayloadSchema<'_, '_>,
    path: &str,
    node: &SchemaDiff<'_>,
) -> Vec<Finding> {
    let at = if path.is_empty() {
        String::new()
    } else {
        format!(" at '{path}'")
    };
    ambiguous_compositions(node)
        .into_iter()
        .map(|keyword| {
            ctx.finding(
                site,
                format!(
                    "several '{keyword}' subschemas of the {}{at} changed at once; the change is treated as breaking",
                    payload.label
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidelta_diff::diff_schema;
    use apidelta_types::Schema;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn walks_properties_items_and_correlated_branches() {
        let base = schema(json!({"properties": {
            "a": {"properties": {"b": {"type": "string"}}},
            "list": {"type": "array", "items": {"properties": {"c": {"type": "string"}}}},
            "mix": {"allOf": [{"$ref": "#/X", "properties": {"d": {"type": "string"}}}]}
        }}));
        let revision = schema(json!({"properties": {
            "a": {"properties": {"b": {"type": "integer"}}},
            "list": {"type": "array", "items": {"properties": {"c": {"type": "integer"}}}},
            "mix": {"allOf": [{"$ref": "#/X", "properties": {"d": {"type": "integer"}}}]}
        }}));
        let diff = diff_schema(&base, &revision).unwrap();

        let mut seen = Vec::new();
        walk_schema(&diff, &mut |path, _| seen.push(path.to_string()));
        seen.sort();
        assert!(seen.contains(&String::new()));
        assert!(seen.contains(&"a/b".to_string()));
        assert!(seen.contains(&"list/c".to_string()));
        assert!(seen.contains(&"mix/d".to_string()));
    }

    #[test]
    fn property_paths_join_with_slash() {
        assert_eq!(property_path("", "a"), "a");
        assert_eq!(property_path("a", "b"), "a/b");
    }
}
