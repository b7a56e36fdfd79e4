use apidelta_types::Parameter;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::walk::modified_operations;

pub const REQUEST_PARAMETER_MIN_ITEMS_SET: Rule = Rule {
    id: "request-parameter-min-items-set",
    level: Level::Warn,
    optional: false,
    description: "a request parameter gained a minItems restriction",
    check: request_parameter_min_items_set,
};

pub const NEW_REQUIRED_REQUEST_PARAMETER: Rule = Rule {
    id: "new-required-request-parameter",
    level: Level::Error,
    optional: false,
    description: "a new required request parameter was added",
    check: new_required_request_parameter,
};

pub const REQUEST_PARAMETER_BECAME_REQUIRED: Rule = Rule {
    id: "request-parameter-became-required",
    level: Level::Error,
    optional: false,
    description: "an existing request parameter became required",
    check: request_parameter_became_required,
};

pub const REQUEST_PARAMETER_REMOVED: Rule = Rule {
    id: "request-parameter-removed",
    level: Level::Warn,
    optional: false,
    description: "a request parameter was removed",
    check: request_parameter_removed,
};

pub const REQUEST_PARAMETER_TYPE_CHANGED: Rule = Rule {
    id: "request-parameter-type-changed",
    level: Level::Error,
    optional: false,
    description: "the type or format of a request parameter changed",
    check: request_parameter_type_changed,
};

const MIN_ITEMS_COMMENT: &str = "Setting minItems can be needed for security reasons or to fix the \
     document; check that clients already respect the restriction.";
const MIN_ITEMS_TODO: &str = "Add to the exceptions list";

fn describe(param: &Parameter) -> String {
    format!("{} request parameter '{}'", param.location, param.name)
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("none")
}

fn request_parameter_min_items_set(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        for param in params.modified_iter() {
            let Some(schema) = param.schema_diff.as_ref().and_then(|c| c.modified()) else {
                continue;
            };
            let Some(min_items) = schema.min_items_diff.as_ref().filter(|d| d.set()) else {
                continue;
            };
            let site = ctx.revision_site(op.path, op.method, op.revision());
            let mut finding = ctx.finding(
                &site,
                format!(
                    "the {} now requires at least {} items",
                    describe(param.revision),
                    min_items.to.unwrap_or_default()
                ),
            );
            finding.comment = Some(MIN_ITEMS_COMMENT.to_string());
            finding.todo = Some(MIN_ITEMS_TODO.to_string());
            findings.push(finding);
        }
    }
    findings
}

fn new_required_request_parameter(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for param in params.added.iter().filter(|p| p.required) {
            findings.push(ctx.finding(&site, format!("added the new required {}", describe(param))));
        }
    }
    findings
}

fn request_parameter_became_required(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for param in params.modified_iter() {
            if param.required_diff.as_ref().is_some_and(|d| d.enabled()) {
                findings.push(ctx.finding(
                    &site,
                    format!("the {} became required", describe(param.revision)),
                ));
            }
        }
    }
    findings
}

fn request_parameter_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for param in &params.deleted {
            findings.push(ctx.finding(&site, format!("deleted the {}", describe(param))));
        }
    }
    findings
}

fn request_parameter_type_changed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(params) = &op.diff.parameters_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for param in params.modified_iter() {
            let Some(schema) = param.schema_diff.as_ref().and_then(|c| c.modified()) else {
                continue;
            };
            if schema.type_diff.is_none() && schema.format_diff.is_none() {
                continue;
            }
            let (base, revision) = (schema.base, schema.revision);
            findings.push(ctx.finding(
                &site,
                format!(
                    "changed the type of the {} from '{}/{}' to '{}/{}'",
                    describe(param.revision),
                    show(&base.kind),
                    show(&base.format),
                    show(&revision.kind),
                    show(&revision.format)
                ),
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidelta_types::ParameterLocation;

    #[test]
    fn describes_parameters_by_location() {
        let param = Parameter::new(ParameterLocation::Query, "limit");
        assert_eq!(describe(&param), "query request parameter 'limit'");
    }

    #[test]
    fn missing_type_reads_as_none() {
        assert_eq!(show(&None), "none");
        assert_eq!(show(&Some("integer".into())), "integer");
    }
}
