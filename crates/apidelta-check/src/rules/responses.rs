use apidelta_types::StatusClass;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule};
use crate::walk::modified_operations;

pub const RESPONSE_SUCCESS_STATUS_REMOVED: Rule = Rule {
    id: "response-success-status-removed",
    level: Level::Error,
    optional: false,
    description: "a successful response status was removed",
    check: response_success_status_removed,
};

pub const RESPONSE_NON_SUCCESS_STATUS_REMOVED: Rule = Rule {
    id: "response-non-success-status-removed",
    level: Level::Error,
    optional: true,
    description: "an error response status was removed",
    check: response_non_success_status_removed,
};

pub const RESPONSE_MEDIA_TYPE_REMOVED: Rule = Rule {
    id: "response-media-type-removed",
    level: Level::Error,
    optional: false,
    description: "a media type was removed from a response",
    check: response_media_type_removed,
};

fn removed_statuses(ctx: &CheckContext<'_>, class: StatusClass) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(responses) = &op.diff.responses_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for status in responses.deleted.iter().filter(|s| StatusClass::of(s) == class) {
            findings.push(ctx.finding(&site, format!("removed the response with status '{status}'")));
        }
    }
    findings
}

fn response_success_status_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    removed_statuses(ctx, StatusClass::Success)
}

fn response_non_success_status_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    removed_statuses(ctx, StatusClass::NonSuccess)
}

fn response_media_type_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(responses) = &op.diff.responses_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for (status, response) in &responses.modified {
            let Some(content) = &response.content_diff else {
                continue;
            };
            for media in &content.deleted {
                findings.push(ctx.finding(
                    &site,
                    format!("removed the media type '{media}' from the response with status '{status}'"),
                ));
            }
        }
    }
    findings
}
