//! Security requirement and tag rules.
//!
//! Operation findings compare the requirements in force for each operation,
//! so a changed document-level requirement shows up on every operation that
//! inherits it as well as once at the document.

use apidelta_diff::SecurityDiff;

use crate::finding::Finding;
use crate::level::Level;
use crate::rule::{CheckContext, Rule, Site};
use crate::walk::modified_operations;

pub const API_SECURITY_REMOVED: Rule = Rule {
    id: "api-security-removed",
    level: Level::Error,
    optional: false,
    description: "a security requirement was removed",
    check: api_security_removed,
};

pub const API_SECURITY_ADDED: Rule = Rule {
    id: "api-security-added",
    level: Level::Info,
    optional: false,
    description: "a security requirement was added",
    check: api_security_added,
};

pub const API_SECURITY_SCOPE_ADDED: Rule = Rule {
    id: "api-security-scope-added",
    level: Level::Error,
    optional: false,
    description: "a scope was added to a security scheme of a requirement",
    check: api_security_scope_added,
};

pub const API_TAG_REMOVED: Rule = Rule {
    id: "api-tag-removed",
    level: Level::Error,
    optional: true,
    description: "a tag was removed from an operation",
    check: api_tag_removed,
};

/// Every security diff with the site it belongs to and a scope word for
/// messages.
fn security_sites<'c>(ctx: &CheckContext<'c>) -> Vec<(Site, &'static str, &'c SecurityDiff)> {
    let mut out = Vec::new();
    if let Some(global) = &ctx.tree.security_diff {
        let source = if ctx.tree.revision.source.is_empty() {
            &ctx.tree.base.source
        } else {
            &ctx.tree.revision.source
        };
        out.push((Site::document(source), "global", global));
    }
    for op in modified_operations(ctx.tree) {
        if let Some(security) = &op.diff.security_diff {
            let site = ctx.revision_site(op.path, op.method, op.revision());
            out.push((site, "endpoint", security));
        }
    }
    out
}

fn api_security_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, scope, diff) in security_sites(ctx) {
        for requirement in &diff.deleted {
            findings.push(ctx.finding(
                &site,
                format!("removed the {scope} security requirement '{requirement}'"),
            ));
        }
    }
    findings
}

fn api_security_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, scope, diff) in security_sites(ctx) {
        for requirement in &diff.added {
            findings.push(ctx.finding(
                &site,
                format!("added the {scope} security requirement '{requirement}'"),
            ));
        }
    }
    findings
}

fn api_security_scope_added(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (site, scope, diff) in security_sites(ctx) {
        for (requirement, schemes) in &diff.modified {
            for (scheme, scopes) in schemes {
                for added in &scopes.added {
                    findings.push(ctx.finding(
                        &site,
                        format!(
                            "added the scope '{added}' to the scheme '{scheme}' of the {scope} security requirement '{requirement}'"
                        ),
                    ));
                }
            }
        }
    }
    findings
}

fn api_tag_removed(ctx: &CheckContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    for op in modified_operations(ctx.tree) {
        let Some(tags) = &op.diff.tags_diff else {
            continue;
        };
        let site = ctx.revision_site(op.path, op.method, op.revision());
        for tag in &tags.deleted {
            findings.push(ctx.finding(&site, format!("removed the tag '{tag}'")));
        }
    }
    findings
}
