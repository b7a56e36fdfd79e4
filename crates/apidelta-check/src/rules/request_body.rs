use apidelta_diff::Change;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::walk::modified_operations;

pub const REQUEST_BODY_BECAME_REQUIRED: Rule = Rule {
    id: "request-body-became-required",
    level: Level::Error,
    optional: false,
    description: "a request body became required, or a required one was added",
    check: request_body_became_required,
};

fn request_body_became_required(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let text = match &op.diff.request_body_diff {
            Some(Change::Added(body)) if body.required => "added a required request body",
            Some(Change::Modified(body)) if body.required_diff.as_ref().is_some_and(|d| d.enabled()) => {
                "the request body became required"
            }
            _ => continue,
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        findings.push(ctx.finding(&site, text));
    }
    findings
}
