use apidelta_diff::{ParameterDiff, SchemaDiff};
use apidelta_types::ParameterLocation;
use serde_json::Value;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule, Site};
use crate::walk::{
    ambiguity_findings, for_each_node, modified_operations, request_body_schemas,
    response_schemas, walk_schema,
};

pub const REQUEST_PARAMETER_ENUM_VALUE_ADDED: Rule = Rule {
    id: "request-parameter-enum-value-added",
    level: Level::Info,
    optional: false,
    description: "a request parameter accepts a new enum value",
    check: request_parameter_enum_value_added,
};

pub const REQUEST_PARAMETER_ENUM_VALUE_REMOVED: Rule = Rule {
    id: "request-parameter-enum-value-removed",
    level: Level::Error,
    optional: false,
    description: "a request parameter no longer accepts an enum value",
    check: request_parameter_enum_value_removed,
};

pub const REQUEST_HEADER_PROPERTY_BECAME_ENUM: Rule = Rule {
    id: "request-header-property-became-enum",
    level: Level::Error,
    optional: false,
    description: "a header parameter was restricted to a list of values",
    check: request_header_property_became_enum,
};

pub const REQUEST_PROPERTY_ENUM_VALUE_REMOVED: Rule = Rule {
    id: "request-property-enum-value-removed",
    level: Level::Error,
    optional: false,
    description: "a request body property no longer accepts an enum value",
    check: request_property_enum_value_removed,
};

pub const RESPONSE_PROPERTY_ENUM_VALUE_ADDED: Rule = Rule {
    id: "response-property-enum-value-added",
    level: Level::Warn,
    optional: false,
    description: "a response property may return a new enum value",
    check: response_property_enum_value_added,
};

/// Render an enum value the way it appears in the document.
fn show(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn where_in(label: &str, path: &str) -> String {
    if path.is_empty() {
        format!("the {label}")
    } else {
        format!("the {label} property '{path}'")
    }
}

/// Modified parameters whose own schema changed, with that schema diff.
fn parameter_schema_changes<'c>(
    ctx: &CheckContext<'c>,
) -> Vec<(Site, &'c ParameterDiff<'c>, &'c SchemaDiff<'c>)> {
    let mut out = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        for param in params.modified_iter() {
            if let Some(schema) = param.schema_diff.as_ref().and_then(|c| c.modified()) {
                let site = ctx.revision_site(op.path, op.method, op.revision());
                out.push((site, param, &**schema));
            }
        }
    }
    out
}

fn request_parameter_enum_value_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, param, schema) in parameter_schema_changes(ctx) {
        let Some(enum_diff) = &schema.enum_diff else {
            continue;
        };
        for value in enum_diff.values_added() {
            findings.push(ctx.finding(
                &site,
                format!(
                    "added the new enum value '{}' to the {} request parameter '{}'",
                    show(value),
                    param.location(),
                    param.name()
                ),
            ));
        }
    }
    findings
}

fn request_parameter_enum_value_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, param, schema) in parameter_schema_changes(ctx) {
        let Some(enum_diff) = &schema.enum_diff else {
            continue;
        };
        for value in enum_diff.values_deleted() {
            findings.push(ctx.finding(
                &site,
                format!(
                    "removed the enum value '{}' from the {} request parameter '{}'",
                    show(value),
                    param.location(),
                    param.name()
                ),
            ));
        }
    }
    findings
}

fn request_header_property_became_enum(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, param, schema) in parameter_schema_changes(ctx) {
        if param.location() != ParameterLocation::Header {
            continue;
        }
        walk_schema(schema, &mut |path, node| {
            if !node.enum_diff.as_ref().is_some_and(|e| e.became_enum) {
                return;
            }
            let text = if path.is_empty() {
                format!("the request header '{}' was restricted to a list of enum values", param.name())
            } else {
                format!(
                    "the property '{path}' of the request header '{}' was restricted to a list of enum values",
                    param.name()
                )
            };
            findings.push(ctx.finding(&site, text));
        });
    }
    findings
}

fn request_property_enum_value_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, request_body_schemas, &mut |site, payload, path, node| {
        findings.extend(ambiguity_findings(ctx, site, payload, path, node));
        let Some(enum_diff) = &node.enum_diff else {
            return;
        };
        for value in enum_diff.values_deleted() {
            findings.push(ctx.finding(
                site,
                format!(
                    "removed the enum value '{}' from {}",
                    show(value),
                    where_in(&payload.label, path)
                ),
            ));
        }
    });
    findings
}

fn response_property_enum_value_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for_each_node(ctx, response_schemas, &mut |site, payload, path, node| {
        findings.extend(ambiguity_findings(ctx, site, payload, path, node));
        let Some(enum_diff) = &node.enum_diff else {
            return;
        };
        for value in enum_diff.values_added() {
            findings.push(ctx.finding(
                site,
                format!(
                    "added the new enum value '{}' to {}",
                    show(value),
                    where_in(&payload.label, path)
                ),
            ));
        }
    });
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shows_strings_unquoted() {
        assert_eq!(show(&json!("a")), "a");
        assert_eq!(show(&json!(3)), "3");
    }

    #[test]
    fn describes_property_location() {
        assert_eq!(where_in("request body (application/json)", ""), "the request body (application/json)");
        assert_eq!(where_in("response", "a/b"), "the response property 'a/b'");
    }
}
